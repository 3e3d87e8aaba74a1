//! Request and report types for operations

use keg_types::{PlatformTag, Version};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What `keg install` was asked to do
#[derive(Clone, Debug, Default)]
pub struct InstallRequest {
    /// Formula name, or path to a formula file
    pub formula: String,
    /// Exact version; the newest available when unset
    pub version: Option<Version>,
    /// Staging directory holding the versioned artifact
    pub from: Option<PathBuf>,
    /// Reinstall even when the version is already installed
    pub force: bool,
}

impl InstallRequest {
    #[must_use]
    pub fn new(formula: impl Into<String>) -> Self {
        Self {
            formula: formula.into(),
            ..Self::default()
        }
    }
}

/// Result of `keg fetch`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchReport {
    pub name: String,
    pub version: Version,
    pub platform: PlatformTag,
    pub url: String,
    pub path: PathBuf,
    pub sha256: String,
    pub size: u64,
    /// Whether a verified copy was already in the cache
    pub cached: bool,
}

/// Result of `keg platform`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlatformReport {
    /// Host operating system name
    pub os: String,
    pub tag: PlatformTag,
    /// Supported hosts and the tags they map to
    pub supported: Vec<(String, PlatformTag)>,
    pub bin_dir: PathBuf,
}

/// Result of `keg lint`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LintReport {
    pub path: PathBuf,
    pub name: String,
    pub version: Version,
    pub binary: String,
    /// Resolved artifact for each declared platform
    pub artifacts: Vec<LintArtifact>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LintArtifact {
    pub platform: PlatformTag,
    pub artifact_name: String,
    pub url: String,
}
