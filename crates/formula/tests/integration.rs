//! Integration tests for formula loading

#[cfg(test)]
mod tests {
    use keg_errors::{Error, FormulaError};
    use keg_formula::*;
    use keg_types::{PlatformTag, Version};
    use std::path::Path;

    fn oxidux(version: &str, osx_sum: char, linux_sum: char) -> String {
        format!(
            r#"
name = "oxidux"
desc = "Reverse proxy and process manager for web app development."
homepage = "https://github.com/jonmast/oxidux"
version = "{version}"

[platforms.osx]
url = "https://github.com/jonmast/oxidux/releases/download/v{{version}}/oxidux-v{{version}}-osx"
sha256 = "{osx}"

[platforms.linux]
url = "https://github.com/jonmast/oxidux/releases/download/v{{version}}/oxidux-v{{version}}-linux"
sha256 = "{linux}"
"#,
            osx = osx_sum.to_string().repeat(64),
            linux = linux_sum.to_string().repeat(64),
        )
    }

    async fn write(dir: &Path, file: &str, contents: &str) {
        tokio::fs::write(dir.join(file), contents).await.unwrap();
    }

    #[tokio::test]
    async fn test_newest_release_supersedes_older() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "oxidux-0.3.0.toml", &oxidux("0.3.0", 'a', 'b')).await;
        write(dir.path(), "oxidux-0.4.0.toml", &oxidux("0.4.0", 'c', 'd')).await;

        let tap = FormulaDirectory::load(dir.path()).await.unwrap();
        assert_eq!(
            tap.versions("oxidux"),
            vec![Version::new(0, 3, 0), Version::new(0, 4, 0)]
        );

        let latest = tap.find("oxidux", None).unwrap();
        assert_eq!(latest.version, Version::new(0, 4, 0));

        let resolved = latest.resolve(PlatformTag::Osx).unwrap();
        assert_eq!(resolved.sha256.to_hex(), "c".repeat(64));
        assert!(resolved.url.as_str().ends_with("/v0.4.0/oxidux-v0.4.0-osx"));
        assert!(!resolved.url.as_str().contains("0.3.0"));

        let older = tap.find("oxidux", Some(&Version::new(0, 3, 0))).unwrap();
        assert_eq!(
            older.resolve(PlatformTag::Linux).unwrap().sha256.to_hex(),
            "b".repeat(64)
        );
    }

    #[tokio::test]
    async fn test_bad_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "oxidux.toml", &oxidux("0.4.0", 'c', 'd')).await;
        write(dir.path(), "broken.toml", "name = ").await;
        write(
            dir.path(),
            "invalid.toml",
            &oxidux("0.1.0", 'c', 'd').replace("oxidux\"", "tool\"").replace(&"d".repeat(64), "xyz"),
        )
        .await;
        write(dir.path(), "README.md", "not a formula").await;

        let tap = FormulaDirectory::load(dir.path()).await.unwrap();
        assert_eq!(tap.names().collect::<Vec<_>>(), vec!["oxidux"]);
        assert_eq!(tap.skipped().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let tap = FormulaDirectory::load(&dir.path().join("nope")).await.unwrap();
        assert!(tap.is_empty());

        let err = tap.find("oxidux", None).unwrap_err();
        assert!(matches!(err, Error::Formula(FormulaError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_unknown_version() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "oxidux.toml", &oxidux("0.4.0", 'c', 'd')).await;
        let tap = FormulaDirectory::load(dir.path()).await.unwrap();

        let err = tap
            .find("oxidux", Some(&Version::new(9, 9, 9)))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Formula(FormulaError::VersionNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_single_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "oxidux.toml", &oxidux("0.3.0", 'a', 'b')).await;

        let formula = Formula::load(&dir.path().join("oxidux.toml")).await.unwrap();
        formula.validate().unwrap();
        assert_eq!(formula.artifact_name(PlatformTag::Linux), "oxidux-v0.3.0-linux");
    }
}
