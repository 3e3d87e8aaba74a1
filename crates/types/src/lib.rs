#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the keg installer
//!
//! This crate provides fundamental types used throughout the system:
//! versions, platform tags, install reports and output choices.

pub mod platform;
pub mod reports;

// Re-export commonly used types
pub use platform::{HostOs, PlatformTag};
pub use reports::{FormulaInfo, InstallReport, InstalledFormula, PackageChange, VerifyEntry};
pub use semver::Version;

use serde::{Deserialize, Serialize};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    #[default]
    Tty,
    Json,
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    #[default]
    Auto,
    Never,
}

// Implement clap::ValueEnum for ColorChoice
impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}

/// Parse a version string, accepting an optional leading `v` as used in
/// release tags (`v0.4.0`)
///
/// # Errors
///
/// Returns an error if the remaining string is not a valid semantic version.
pub fn parse_version(input: &str) -> Result<Version, keg_errors::Error> {
    let trimmed = input.trim();
    let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(bare).map_err(|_| {
        keg_errors::VersionError::InvalidVersion {
            input: input.to_string(),
        }
        .into()
    })
}
