//! Host operating system to platform tag mapping

use keg_errors::PlatformError;
use keg_types::{HostOs, PlatformTag};

/// Every host the selector accepts, paired with the tag it maps to
pub const SUPPORTED: [(&str, PlatformTag); 2] =
    [("macos", PlatformTag::Osx), ("linux", PlatformTag::Linux)];

/// Map a host operating system onto the platform tag used in artifact names.
///
/// # Errors
///
/// Returns `PlatformError::UnsupportedPlatform` for any host that has no
/// published artifacts.
pub fn select_platform(os: &HostOs) -> Result<PlatformTag, PlatformError> {
    match os {
        HostOs::MacOs => Ok(PlatformTag::Osx),
        HostOs::Linux => Ok(PlatformTag::Linux),
        HostOs::Other(name) => Err(PlatformError::UnsupportedPlatform {
            os: name.clone(),
            supported: supported_platforms(),
        }),
    }
}

/// Select the platform tag for the host this process runs on.
///
/// # Errors
///
/// Returns `PlatformError::UnsupportedPlatform` when the host is neither
/// macOS nor Linux.
pub fn current_platform() -> Result<PlatformTag, PlatformError> {
    select_platform(&HostOs::current())
}

/// Human-readable list of supported hosts, e.g. `macos (osx), linux (linux)`
#[must_use]
pub fn supported_platforms() -> String {
    SUPPORTED
        .iter()
        .map(|(os, tag)| format!("{os} ({tag})"))
        .collect::<Vec<_>>()
        .join(", ")
}
