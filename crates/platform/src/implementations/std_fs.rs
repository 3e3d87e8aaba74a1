//! Filesystem operations implemented on top of `tokio::fs`

use async_trait::async_trait;
use keg_errors::PlatformError;
use keg_events::EventEmitter;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::core::PlatformContext;
use crate::filesystem::FilesystemOperations;

/// Portable implementation of filesystem operations
pub struct StdFilesystemOperations;

impl StdFilesystemOperations {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for StdFilesystemOperations {
    fn default() -> Self {
        Self::new()
    }
}

/// Sibling path used while copying across devices
fn staging_path(dst: &Path) -> PathBuf {
    let mut name = dst.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".keg-tmp");
    dst.with_file_name(name)
}

async fn copy_then_replace(src: &Path, dst: &Path) -> Result<(), PlatformError> {
    let staged = staging_path(dst);
    if let Err(e) = fs::copy(src, &staged).await {
        let _ = fs::remove_file(&staged).await;
        return Err(PlatformError::from_io("copy", dst, &e));
    }

    if let Err(e) = fs::rename(&staged, dst).await {
        let _ = fs::remove_file(&staged).await;
        return Err(PlatformError::from_io("atomic_rename", dst, &e));
    }

    fs::remove_file(src)
        .await
        .map_err(|e| PlatformError::from_io("remove_file", src, &e))
}

#[async_trait]
impl FilesystemOperations for StdFilesystemOperations {
    async fn create_dir_all(
        &self,
        _ctx: &PlatformContext,
        path: &Path,
    ) -> Result<(), PlatformError> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| PlatformError::from_io("create_dir_all", path, &e))
    }

    async fn exists(&self, _ctx: &PlatformContext, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn atomic_rename(
        &self,
        ctx: &PlatformContext,
        src: &Path,
        dst: &Path,
    ) -> Result<(), PlatformError> {
        match fs::rename(src, dst).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::CrossesDevices => {
                ctx.emit_debug(format!(
                    "{} and {} are on different devices, copying",
                    src.display(),
                    dst.display()
                ));
                copy_then_replace(src, dst).await
            }
            Err(e) => Err(PlatformError::from_io("atomic_rename", dst, &e)),
        }
    }

    #[cfg(unix)]
    async fn set_executable(
        &self,
        _ctx: &PlatformContext,
        path: &Path,
    ) -> Result<(), PlatformError> {
        use std::os::unix::fs::PermissionsExt;

        let permissions = std::fs::Permissions::from_mode(0o755);
        fs::set_permissions(path, permissions)
            .await
            .map_err(|e| PlatformError::from_io("set_executable", path, &e))
    }

    #[cfg(not(unix))]
    async fn set_executable(
        &self,
        _ctx: &PlatformContext,
        path: &Path,
    ) -> Result<(), PlatformError> {
        fs::metadata(path)
            .await
            .map(|_| ())
            .map_err(|e| PlatformError::from_io("set_executable", path, &e))
    }

    async fn remove_file(&self, _ctx: &PlatformContext, path: &Path) -> Result<(), PlatformError> {
        fs::remove_file(path)
            .await
            .map_err(|e| PlatformError::from_io("remove_file", path, &e))
    }

    async fn size(&self, _ctx: &PlatformContext, path: &Path) -> Result<u64, PlatformError> {
        fs::metadata(path)
            .await
            .map(|metadata| metadata.len())
            .map_err(|e| PlatformError::from_io("size", path, &e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_path_is_a_sibling() {
        let staged = staging_path(Path::new("/usr/local/bin/oxidux"));
        assert_eq!(staged, PathBuf::from("/usr/local/bin/oxidux.keg-tmp"));
    }

    #[tokio::test]
    async fn copy_fallback_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        fs::write(&src, b"new").await.unwrap();
        fs::write(&dst, b"old").await.unwrap();

        copy_then_replace(&src, &dst).await.unwrap();

        assert_eq!(fs::read(&dst).await.unwrap(), b"new");
        assert!(!src.exists());
        assert!(!staging_path(&dst).exists());
    }
}
