//! Filesystem operations used while placing binaries on the path

use async_trait::async_trait;
use keg_errors::PlatformError;
use std::path::Path;

use crate::core::PlatformContext;

/// Trait for the filesystem operations the installer relies on
#[async_trait]
pub trait FilesystemOperations: Send + Sync {
    /// Create directory and all parent directories
    async fn create_dir_all(&self, ctx: &PlatformContext, path: &Path)
        -> Result<(), PlatformError>;

    /// Check if a path exists
    async fn exists(&self, ctx: &PlatformContext, path: &Path) -> bool;

    /// Move `src` to `dst`, replacing `dst` if present.
    ///
    /// Readers of `dst` observe either the old or the new file. When the two
    /// paths live on different devices the file is copied next to `dst` and
    /// then renamed over it.
    async fn atomic_rename(
        &self,
        ctx: &PlatformContext,
        src: &Path,
        dst: &Path,
    ) -> Result<(), PlatformError>;

    /// Mark a file executable (`0o755`)
    async fn set_executable(&self, ctx: &PlatformContext, path: &Path)
        -> Result<(), PlatformError>;

    /// Remove a single file
    async fn remove_file(&self, ctx: &PlatformContext, path: &Path) -> Result<(), PlatformError>;

    /// Get the size of a file
    async fn size(&self, ctx: &PlatformContext, path: &Path) -> Result<u64, PlatformError>;
}
