//! Core platform abstractions and context management

use keg_errors::PlatformError;
use keg_events::{AppEvent, EventEmitter, EventSender, PlatformEvent};
use keg_types::{HostOs, PlatformTag};
use std::path::Path;

use crate::filesystem::FilesystemOperations;
use crate::implementations::std_fs::StdFilesystemOperations;

/// Context for platform operations, providing event emission
#[derive(Clone, Default)]
pub struct PlatformContext {
    event_sender: Option<EventSender>,
}

impl PlatformContext {
    /// Create a new platform context with event emission capabilities
    #[must_use]
    pub fn new(event_sender: Option<EventSender>) -> Self {
        Self { event_sender }
    }
}

impl EventEmitter for PlatformContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

/// Main platform abstraction providing access to platform operations
pub struct Platform {
    filesystem_ops: Box<dyn FilesystemOperations>,
}

impl Platform {
    /// Create a new platform instance with the specified implementation
    #[must_use]
    pub fn new(filesystem_ops: Box<dyn FilesystemOperations>) -> Self {
        Self { filesystem_ops }
    }

    /// Platform backed by `tokio::fs`
    #[must_use]
    pub fn current() -> Self {
        Self::new(Box::new(StdFilesystemOperations::new()))
    }

    /// Access filesystem operations
    #[must_use]
    pub fn filesystem(&self) -> &dyn FilesystemOperations {
        &*self.filesystem_ops
    }

    /// Create a platform context with event emission
    #[must_use]
    pub fn create_context(&self, event_sender: Option<EventSender>) -> PlatformContext {
        PlatformContext::new(event_sender)
    }

    /// Select the artifact platform for `os`, reporting the outcome as an event.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::UnsupportedPlatform` for hosts without artifacts.
    pub fn select(&self, ctx: &PlatformContext, os: &HostOs) -> Result<PlatformTag, PlatformError> {
        match crate::selector::select_platform(os) {
            Ok(tag) => {
                tracing::debug!(os = %os, tag = %tag, "platform selected");
                ctx.emit(AppEvent::Platform(PlatformEvent::Selected {
                    os: os.to_string(),
                    tag,
                }));
                Ok(tag)
            }
            Err(e) => {
                ctx.emit(AppEvent::Platform(PlatformEvent::Unsupported {
                    os: os.to_string(),
                }));
                Err(e)
            }
        }
    }

    /// Convenience method: Atomically rename a file
    ///
    /// # Errors
    ///
    /// Returns an error if the rename (or its copy fallback) fails.
    pub async fn atomic_rename(
        &self,
        ctx: &PlatformContext,
        src: &Path,
        dst: &Path,
    ) -> Result<(), PlatformError> {
        self.filesystem().atomic_rename(ctx, src, dst).await
    }

    /// Convenience method: Create directory and all parent directories
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn create_dir_all(
        &self,
        ctx: &PlatformContext,
        path: &Path,
    ) -> Result<(), PlatformError> {
        self.filesystem().create_dir_all(ctx, path).await
    }

    /// Convenience method: Check if a path exists
    pub async fn exists(&self, ctx: &PlatformContext, path: &Path) -> bool {
        self.filesystem().exists(ctx, path).await
    }

    /// Convenience method: Mark a file executable
    ///
    /// # Errors
    ///
    /// Returns an error if permissions cannot be changed.
    pub async fn set_executable(
        &self,
        ctx: &PlatformContext,
        path: &Path,
    ) -> Result<(), PlatformError> {
        self.filesystem().set_executable(ctx, path).await
    }

    /// Convenience method: Remove a single file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be removed.
    pub async fn remove_file(&self, ctx: &PlatformContext, path: &Path) -> Result<(), PlatformError> {
        self.filesystem().remove_file(ctx, path).await
    }

    /// Convenience method: Size of a file in bytes
    ///
    /// # Errors
    ///
    /// Returns an error if the file metadata cannot be read.
    pub async fn size(&self, ctx: &PlatformContext, path: &Path) -> Result<u64, PlatformError> {
        self.filesystem().size(ctx, path).await
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}
