//! Report type definitions for operations

use crate::{PlatformTag, Version};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Installation report
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InstallReport {
    /// Formulas installed for the first time
    pub installed: Vec<PackageChange>,
    /// Formulas whose installed version was replaced
    pub updated: Vec<PackageChange>,
    /// Formulas that were removed
    pub removed: Vec<PackageChange>,
    /// Total execution time
    pub duration_ms: u64,
}

impl InstallReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.installed.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Package change for reports
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PackageChange {
    /// Formula name
    pub name: String,
    /// Previous version
    pub from_version: Option<Version>,
    /// New version
    pub to_version: Option<Version>,
    /// Installed binary path
    pub path: Option<PathBuf>,
    /// Size in bytes
    pub size: Option<u64>,
}

/// Record of a formula currently installed on this machine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledFormula {
    pub name: String,
    pub version: Version,
    pub platform: PlatformTag,
    /// Hex SHA-256 of the installed binary
    pub sha256: String,
    pub binary_path: PathBuf,
    pub size: u64,
    pub installed_at: DateTime<Utc>,
}

/// Formula details for `info`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FormulaInfo {
    pub name: String,
    pub desc: Option<String>,
    pub homepage: Option<String>,
    pub license: Option<String>,
    /// Newest version available in the formula directory
    pub latest_version: Version,
    /// All versions available, newest first
    pub available_versions: Vec<Version>,
    /// Platforms the newest version publishes artifacts for
    pub platforms: Vec<PlatformTag>,
    pub installed: Option<InstalledFormula>,
}

/// Outcome of re-hashing one installed binary
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerifyEntry {
    pub name: String,
    pub version: Version,
    pub binary_path: PathBuf,
    pub expected: String,
    /// `None` when the binary is missing from disk
    pub actual: Option<String>,
    pub ok: bool,
}
