//! Formula parsing and resolution error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum FormulaError {
    #[error("formula not found: {name}")]
    NotFound { name: String },

    #[error("formula {name} has no version {version}")]
    VersionNotFound { name: String, version: String },

    #[error("failed to parse formula {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("invalid formula {name}: {message}")]
    Invalid { name: String, message: String },

    #[error("formula {name} {version} has no artifact for platform {platform}")]
    PlatformNotSupported {
        name: String,
        version: String,
        platform: String,
    },
}

impl UserFacingError for FormulaError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } | Self::VersionNotFound { .. } => {
                Some("Add the formula file to `paths.formula_dir`.")
            }
            Self::ParseError { .. } | Self::Invalid { .. } => {
                Some("Run `keg lint <file>` to check the formula.")
            }
            Self::PlatformNotSupported { .. } => {
                Some("This release does not publish a binary for your platform.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "formula.not_found",
            Self::VersionNotFound { .. } => "formula.version_not_found",
            Self::ParseError { .. } => "formula.parse_error",
            Self::Invalid { .. } => "formula.invalid",
            Self::PlatformNotSupported { .. } => "formula.platform_not_supported",
        };
        Some(code)
    }
}
