use serde::{Deserialize, Serialize};
use keg_types::{PlatformTag, Version};
use std::path::PathBuf;

use super::FailureContext;

/// Installation domain events - maps to the install crate and `keg install`/`keg uninstall`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InstallEvent {
    /// Installation started for a resolved formula
    Started {
        package: String,
        version: Version,
        platform: PlatformTag,
    },

    /// Artifact located in the staging directory
    ArtifactStaged {
        package: String,
        artifact: String,
        path: PathBuf,
    },

    /// Checksum verification passed
    Verified { package: String, sha256: String },

    /// Binary placed on the path
    Completed {
        package: String,
        version: Version,
        path: PathBuf,
        replaced: Option<Version>,
        duration_ms: u64,
    },

    /// Installation skipped because the version is already present
    Skipped {
        package: String,
        version: Version,
        reason: String,
    },

    /// Installation failed
    Failed {
        package: String,
        version: Version,
        failure: FailureContext,
    },

    /// Installed binary removed
    Removed {
        package: String,
        version: Version,
        path: PathBuf,
    },
}
