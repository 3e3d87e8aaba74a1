//! Installation error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum InstallError {
    #[error("installation failed: {message}")]
    Failed { message: String },

    #[error("artifact not found: {artifact} in {directory}")]
    ArtifactMissing { artifact: String, directory: String },

    #[error("permission denied installing into {path}")]
    PermissionDenied { path: String },

    #[error("{package} {version} is already installed")]
    AlreadyInstalled { package: String, version: String },

    #[error("package not installed: {package}")]
    NotInstalled { package: String },

    #[error("installed binary modified: {path} (expected {expected}, got {actual})")]
    BinaryModified {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("filesystem operation failed: {operation} on {path}: {message}")]
    FilesystemError {
        operation: String,
        path: String,
        message: String,
    },

    #[error("installation cancelled by user")]
    Cancelled,
}

impl UserFacingError for InstallError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ArtifactMissing { .. } => Some(
                "Place the release artifact in the staging directory or omit `--from` to download it.",
            ),
            Self::PermissionDenied { .. } => {
                Some("Choose a writable `paths.bin_dir` or retry with elevated privileges.")
            }
            Self::AlreadyInstalled { .. } => Some("Pass `--force` to reinstall the same version."),
            Self::NotInstalled { .. } => Some("Run `keg list` to see installed formulas."),
            Self::BinaryModified { .. } => Some("Reinstall with `keg install --force`."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::FilesystemError { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Failed { .. } => "install.failed",
            Self::ArtifactMissing { .. } => "install.artifact_missing",
            Self::PermissionDenied { .. } => "install.permission_denied",
            Self::AlreadyInstalled { .. } => "install.already_installed",
            Self::NotInstalled { .. } => "install.not_installed",
            Self::BinaryModified { .. } => "install.binary_modified",
            Self::FilesystemError { .. } => "install.filesystem_error",
            Self::Cancelled => "install.cancelled",
        };
        Some(code)
    }
}
