//! Platform selection and filesystem operation errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Errors that can occur during platform-specific operations
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum PlatformError {
    #[error("unsupported platform: {os} (supported: {supported})")]
    UnsupportedPlatform { os: String, supported: String },

    #[error("unknown platform tag: {tag}")]
    UnknownTag { tag: String },

    #[error("filesystem operation failed: {operation} on {path} - {message}")]
    FilesystemOperationFailed {
        operation: String,
        path: String,
        message: String,
    },

    #[error("permission denied: {operation} on {path}")]
    PermissionDenied { operation: String, path: String },
}

impl PlatformError {
    /// Map an `io::Error` raised by `operation` on `path` into a platform error
    #[must_use]
    pub fn from_io(operation: &str, path: &std::path::Path, err: &std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            Self::PermissionDenied {
                operation: operation.to_string(),
                path: path.display().to_string(),
            }
        } else {
            Self::FilesystemOperationFailed {
                operation: operation.to_string(),
                path: path.display().to_string(),
                message: err.to_string(),
            }
        }
    }
}

impl UserFacingError for PlatformError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::UnsupportedPlatform { .. } => {
                Some("Prebuilt binaries are only published for macOS and Linux.")
            }
            Self::PermissionDenied { .. } => {
                Some("Choose a writable `paths.bin_dir` or retry with elevated privileges.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::UnsupportedPlatform { .. } => "platform.unsupported",
            Self::UnknownTag { .. } => "platform.unknown_tag",
            Self::FilesystemOperationFailed { .. } => "platform.filesystem_failed",
            Self::PermissionDenied { .. } => "platform.permission_denied",
        };
        Some(code)
    }
}
