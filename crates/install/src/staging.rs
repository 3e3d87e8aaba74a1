//! Locating staged artifacts and copying them next to their install target

use keg_errors::{Error, InstallError};
use keg_hash::Checksum;
use std::path::{Path, PathBuf};
use tokio::fs::File;

/// Find `<dir>/<artifact_name>`.
///
/// # Errors
///
/// Returns `InstallError::ArtifactMissing` if no regular file with that
/// name exists in `dir`.
pub async fn locate_artifact(dir: &Path, artifact_name: &str) -> Result<PathBuf, Error> {
    let path = dir.join(artifact_name);
    match tokio::fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => Ok(path),
        _ => Err(InstallError::ArtifactMissing {
            artifact: artifact_name.to_string(),
            directory: dir.display().to_string(),
        }
        .into()),
    }
}

/// Hidden sibling of the install target used while the new binary is written
#[must_use]
pub fn temp_binary_path(bin_dir: &Path, binary_name: &str) -> PathBuf {
    bin_dir.join(format!(".{binary_name}.keg-new"))
}

/// Copy `src` to `dst`, hashing the bytes as they are written.
pub(crate) async fn copy_hashed(src: &Path, dst: &Path) -> Result<(Checksum, u64), Error> {
    let reader = File::open(src)
        .await
        .map_err(|e| Error::io_with_path(&e, src))?;
    let writer = File::create(dst).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            InstallError::PermissionDenied {
                path: dst.display().to_string(),
            }
            .into()
        } else {
            Error::io_with_path(&e, dst)
        }
    })?;

    Checksum::hash_and_copy(reader, writer).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn locate_reports_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let err = locate_artifact(dir.path(), "oxidux-v0.4.0-linux")
            .await
            .unwrap_err();
        match err {
            Error::Install(InstallError::ArtifactMissing { artifact, directory }) => {
                assert_eq!(artifact, "oxidux-v0.4.0-linux");
                assert_eq!(directory, dir.path().display().to_string());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn locate_ignores_directories() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir(dir.path().join("oxidux-v0.4.0-osx"))
            .await
            .unwrap();
        assert!(locate_artifact(dir.path(), "oxidux-v0.4.0-osx").await.is_err());
    }

    #[test]
    fn temp_path_is_hidden_sibling() {
        assert_eq!(
            temp_binary_path(Path::new("/opt/bin"), "oxidux"),
            PathBuf::from("/opt/bin/.oxidux.keg-new")
        );
    }

    #[tokio::test]
    async fn copy_hashed_matches_source_checksum() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        tokio::fs::write(&src, b"payload").await.unwrap();

        let (checksum, size) = copy_hashed(&src, &dst).await.unwrap();
        assert_eq!(checksum, Checksum::from_data(b"payload"));
        assert_eq!(size, 7);
        assert_eq!(tokio::fs::read(&dst).await.unwrap(), b"payload");
    }
}
