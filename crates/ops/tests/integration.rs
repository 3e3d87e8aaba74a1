//! Integration tests for ops crate

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use keg_config::Config;
    use keg_errors::{Error, FormulaError, InstallError, OpsError, PlatformError};
    use keg_events::{channel, EventReceiver};
    use keg_hash::Checksum;
    use keg_net::{NetClient, NetConfig};
    use keg_ops::*;
    use keg_state::{HistoryOperation, StateManager};
    use keg_types::{HostOs, PlatformTag, Version};
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tempfile::TempDir;

    const BINARY_V3: &[u8] = b"oxidux 0.3.0 linux build";
    const BINARY_V4: &[u8] = b"oxidux 0.4.0 linux build";

    struct TestEnv {
        temp: TempDir,
        ctx: OpsCtx,
        _rx: EventReceiver,
    }

    impl TestEnv {
        fn formula_dir(&self) -> PathBuf {
            self.temp.path().join("formula")
        }

        fn bin_dir(&self) -> PathBuf {
            self.temp.path().join("bin")
        }

        fn staging(&self) -> PathBuf {
            self.temp.path().join("staging")
        }
    }

    async fn create_test_context(host: HostOs) -> TestEnv {
        let temp = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.paths.prefix = Some(temp.path().to_path_buf());
        tokio::fs::create_dir_all(temp.path().join("staging"))
            .await
            .unwrap();
        tokio::fs::create_dir_all(temp.path().join("formula"))
            .await
            .unwrap();

        let state = StateManager::open(&config.db_path()).await.unwrap();
        let net = NetClient::new(NetConfig {
            retry_count: 0,
            retry_delay: Duration::from_millis(10),
            ..NetConfig::default()
        })
        .unwrap();
        let (tx, rx) = channel();

        let ctx = OpsContextBuilder::new()
            .with_state(state)
            .with_net(net)
            .with_host(host)
            .with_event_sender(tx)
            .with_config(config)
            .build()
            .unwrap();

        TestEnv {
            temp,
            ctx,
            _rx: rx,
        }
    }

    fn formula_toml(version: &str, url_base: &str, content: &[u8]) -> String {
        format!(
            r#"
name = "oxidux"
desc = "Reverse proxy and process manager for web app development."
homepage = "https://github.com/jonmast/oxidux"
version = "{version}"

[platforms.linux]
url = "{url_base}/v{{version}}/oxidux-v{{version}}-linux"
sha256 = "{sha}"
"#,
            sha = Checksum::from_data(content).to_hex(),
        )
    }

    async fn write_formula(dir: &Path, version: &str, content: &[u8]) {
        tokio::fs::write(
            dir.join(format!("oxidux-{version}.toml")),
            formula_toml(version, "https://example.invalid/releases", content),
        )
        .await
        .unwrap();
    }

    async fn stage(env: &TestEnv, version: &str, content: &[u8]) {
        tokio::fs::write(
            env.staging().join(format!("oxidux-v{version}-linux")),
            content,
        )
        .await
        .unwrap();
    }

    fn staged_request(env: &TestEnv) -> InstallRequest {
        InstallRequest {
            from: Some(env.staging()),
            ..InstallRequest::new("oxidux")
        }
    }

    #[tokio::test]
    async fn test_context_builder_requires_components() {
        let err = OpsContextBuilder::new().build().err().unwrap();
        assert!(matches!(
            err,
            Error::Ops(OpsError::MissingComponent { .. })
        ));
    }

    #[tokio::test]
    async fn test_install_from_staging_uses_newest_formula() {
        let env = create_test_context(HostOs::Linux).await;
        write_formula(&env.formula_dir(), "0.3.0", BINARY_V3).await;
        write_formula(&env.formula_dir(), "0.4.0", BINARY_V4).await;
        stage(&env, "0.4.0", BINARY_V4).await;

        let report = install(&env.ctx, &staged_request(&env)).await.unwrap();
        assert_eq!(report.installed.len(), 1);
        assert_eq!(
            report.installed[0].to_version,
            Some(Version::new(0, 4, 0))
        );

        let installed = tokio::fs::read(env.bin_dir().join("oxidux")).await.unwrap();
        assert_eq!(installed, BINARY_V4);
    }

    #[tokio::test]
    async fn test_version_bump_supersedes_receipt() {
        let env = create_test_context(HostOs::Linux).await;
        write_formula(&env.formula_dir(), "0.3.0", BINARY_V3).await;
        write_formula(&env.formula_dir(), "0.4.0", BINARY_V4).await;
        stage(&env, "0.3.0", BINARY_V3).await;
        stage(&env, "0.4.0", BINARY_V4).await;

        let old = InstallRequest {
            version: Some(Version::new(0, 3, 0)),
            ..staged_request(&env)
        };
        install(&env.ctx, &old).await.unwrap();

        let report = install(&env.ctx, &staged_request(&env)).await.unwrap();
        assert_eq!(report.updated.len(), 1);
        assert_eq!(report.updated[0].from_version, Some(Version::new(0, 3, 0)));

        let installed = list_installed(&env.ctx).await.unwrap();
        assert_eq!(installed.len(), 1);
        assert_eq!(installed[0].version, Version::new(0, 4, 0));
        assert_eq!(installed[0].sha256, Checksum::from_data(BINARY_V4).to_hex());

        let entries = history(&env.ctx, Some("oxidux"), None).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries
            .iter()
            .all(|e| e.operation == HistoryOperation::Install));
    }

    #[tokio::test]
    async fn test_install_from_formula_file_path() {
        let env = create_test_context(HostOs::Linux).await;
        let path = env.temp.path().join("oxidux.toml");
        tokio::fs::write(
            &path,
            formula_toml("0.4.0", "https://example.invalid/releases", BINARY_V4),
        )
        .await
        .unwrap();
        stage(&env, "0.4.0", BINARY_V4).await;

        let request = InstallRequest {
            from: Some(env.staging()),
            ..InstallRequest::new(path.to_string_lossy())
        };
        install(&env.ctx, &request).await.unwrap();
        assert!(env.bin_dir().join("oxidux").is_file());

        let wrong_version = InstallRequest {
            version: Some(Version::new(0, 3, 0)),
            ..request
        };
        let err = install(&env.ctx, &wrong_version).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Formula(FormulaError::VersionNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_install_unknown_formula() {
        let env = create_test_context(HostOs::Linux).await;
        let err = install(&env.ctx, &InstallRequest::new("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Formula(FormulaError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_install_on_unsupported_host_fails() {
        let env = create_test_context(HostOs::Other("windows".to_string())).await;
        write_formula(&env.formula_dir(), "0.4.0", BINARY_V4).await;
        stage(&env, "0.4.0", BINARY_V4).await;

        let err = install(&env.ctx, &staged_request(&env)).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Platform(PlatformError::UnsupportedPlatform { .. })
        ));
        assert!(!env.bin_dir().join("oxidux").exists());
    }

    #[tokio::test]
    async fn test_install_missing_platform_entry() {
        let env = create_test_context(HostOs::MacOs).await;
        write_formula(&env.formula_dir(), "0.4.0", BINARY_V4).await;

        let err = install(&env.ctx, &staged_request(&env)).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Formula(FormulaError::PlatformNotSupported { .. })
        ));
    }

    #[tokio::test]
    async fn test_install_missing_artifact() {
        let env = create_test_context(HostOs::Linux).await;
        write_formula(&env.formula_dir(), "0.4.0", BINARY_V4).await;

        let err = install(&env.ctx, &staged_request(&env)).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Install(InstallError::ArtifactMissing { .. })
        ));
    }

    #[tokio::test]
    async fn test_uninstall_and_history() {
        let env = create_test_context(HostOs::Linux).await;
        write_formula(&env.formula_dir(), "0.4.0", BINARY_V4).await;
        stage(&env, "0.4.0", BINARY_V4).await;
        install(&env.ctx, &staged_request(&env)).await.unwrap();

        let report = uninstall(&env.ctx, "oxidux").await.unwrap();
        assert_eq!(report.removed.len(), 1);
        assert!(!env.bin_dir().join("oxidux").exists());
        assert!(list_installed(&env.ctx).await.unwrap().is_empty());

        let entries = history(&env.ctx, None, Some(1)).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, HistoryOperation::Uninstall);

        let err = uninstall(&env.ctx, "oxidux").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Install(InstallError::NotInstalled { .. })
        ));
    }

    #[tokio::test]
    async fn test_formula_info() {
        let env = create_test_context(HostOs::Linux).await;
        write_formula(&env.formula_dir(), "0.3.0", BINARY_V3).await;
        write_formula(&env.formula_dir(), "0.4.0", BINARY_V4).await;

        let info = formula_info(&env.ctx, "oxidux").await.unwrap();
        assert_eq!(info.latest_version, Version::new(0, 4, 0));
        assert_eq!(
            info.available_versions,
            vec![Version::new(0, 4, 0), Version::new(0, 3, 0)]
        );
        assert_eq!(info.platforms, vec![PlatformTag::Linux]);
        assert!(info.installed.is_none());
    }

    #[tokio::test]
    async fn test_verify_detects_modified_binary() {
        let env = create_test_context(HostOs::Linux).await;
        write_formula(&env.formula_dir(), "0.4.0", BINARY_V4).await;
        stage(&env, "0.4.0", BINARY_V4).await;
        install(&env.ctx, &staged_request(&env)).await.unwrap();

        let entries = verify(&env.ctx, None).await.unwrap();
        assert!(verification_error(&entries).is_none());

        tokio::fs::write(env.bin_dir().join("oxidux"), b"tampered")
            .await
            .unwrap();
        let entries = verify(&env.ctx, Some("oxidux")).await.unwrap();
        assert!(!entries[0].ok);
        assert!(matches!(
            verification_error(&entries),
            Some(Error::Ops(OpsError::VerificationFailed {
                checked: 1,
                failures: 1
            }))
        ));
        assert!(!OperationResult::VerifyReport(entries).is_success());
    }

    #[tokio::test]
    async fn test_platform_report() {
        let env = create_test_context(HostOs::MacOs).await;
        let report = platform(&env.ctx).unwrap();
        assert_eq!(report.tag, PlatformTag::Osx);
        assert_eq!(report.os, "macos");
        assert_eq!(report.bin_dir, env.bin_dir());

        let env = create_test_context(HostOs::Other("freebsd".to_string())).await;
        assert!(platform(&env.ctx).is_err());
    }

    #[tokio::test]
    async fn test_lint_reports_artifacts() {
        let env = create_test_context(HostOs::Linux).await;
        let path = env.temp.path().join("oxidux.toml");
        tokio::fs::write(
            &path,
            formula_toml("0.4.0", "https://github.com/jonmast/oxidux/releases/download", BINARY_V4),
        )
        .await
        .unwrap();

        let report = lint(&env.ctx, &path).await.unwrap();
        assert_eq!(report.binary, "oxidux");
        assert_eq!(report.artifacts.len(), 1);
        assert_eq!(report.artifacts[0].artifact_name, "oxidux-v0.4.0-linux");
        assert_eq!(
            report.artifacts[0].url,
            "https://github.com/jonmast/oxidux/releases/download/v0.4.0/oxidux-v0.4.0-linux"
        );

        let bad = env.temp.path().join("bad.toml");
        tokio::fs::write(&bad, "name = \"oxidux\"\n").await.unwrap();
        assert!(lint(&env.ctx, &bad).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_downloads_then_reuses_cache() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/v0.4.0/oxidux-v0.4.0-linux");
            then.status(200).body(BINARY_V4);
        });

        let env = create_test_context(HostOs::Linux).await;
        tokio::fs::write(
            env.formula_dir().join("oxidux.toml"),
            formula_toml("0.4.0", &server.base_url(), BINARY_V4),
        )
        .await
        .unwrap();

        let first = fetch(&env.ctx, "oxidux", None, None).await.unwrap();
        assert!(!first.cached);
        assert_eq!(first.size, BINARY_V4.len() as u64);
        assert!(first.path.ends_with("cache/oxidux-v0.4.0-linux"));

        let second = fetch(&env.ctx, "oxidux", None, None).await.unwrap();
        assert!(second.cached);
        mock.assert_hits(1);

        // The cached artifact is used without another download.
        install(&env.ctx, &InstallRequest::new("oxidux")).await.unwrap();
        assert_eq!(
            tokio::fs::read(env.bin_dir().join("oxidux")).await.unwrap(),
            BINARY_V4
        );
        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn test_fetch_checksum_mismatch_leaves_no_file() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v0.4.0/oxidux-v0.4.0-linux");
            then.status(200).body(b"not the release");
        });

        let env = create_test_context(HostOs::Linux).await;
        tokio::fs::write(
            env.formula_dir().join("oxidux.toml"),
            formula_toml("0.4.0", &server.base_url(), BINARY_V4),
        )
        .await
        .unwrap();

        let err = fetch(&env.ctx, "oxidux", None, Some(PlatformTag::Linux))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Network(keg_errors::NetworkError::ChecksumMismatch { .. })
        ));
        assert!(!env
            .temp
            .path()
            .join("cache/oxidux-v0.4.0-linux")
            .exists());
    }
}
