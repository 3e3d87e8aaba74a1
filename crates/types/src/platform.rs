//! Host operating system and artifact platform tags

use keg_errors::PlatformError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform tag used to name and select release artifacts
///
/// The string form is embedded in artifact names
/// (`<name>-v<version>-<tag>`) and formula tables (`[platforms.<tag>]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformTag {
    Osx,
    Linux,
}

impl PlatformTag {
    /// Every tag a release may publish an artifact for
    pub const ALL: [PlatformTag; 2] = [PlatformTag::Osx, PlatformTag::Linux];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Osx => "osx",
            Self::Linux => "linux",
        }
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformTag {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "osx" => Ok(Self::Osx),
            "linux" => Ok(Self::Linux),
            other => Err(PlatformError::UnknownTag {
                tag: other.to_string(),
            }),
        }
    }
}

/// Host operating system as reported by the running binary
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostOs {
    MacOs,
    Linux,
    /// Any other operating system, carrying its `std::env::consts::OS` name
    Other(String),
}

impl HostOs {
    /// Detect the operating system this binary was compiled for
    #[must_use]
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Classify an OS name in the vocabulary of `std::env::consts::OS`
    #[must_use]
    pub fn from_os_name(name: &str) -> Self {
        match name {
            "macos" => Self::MacOs,
            "linux" => Self::Linux,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::MacOs => "macos",
            Self::Linux => "linux",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip_through_str() {
        for tag in PlatformTag::ALL {
            assert_eq!(tag.as_str().parse::<PlatformTag>().unwrap(), tag);
        }
    }

    #[test]
    fn test_unknown_tag() {
        let err = "windows".parse::<PlatformTag>().unwrap_err();
        assert!(matches!(err, PlatformError::UnknownTag { tag } if tag == "windows"));
    }

    #[test]
    fn test_host_os_classification() {
        assert_eq!(HostOs::from_os_name("macos"), HostOs::MacOs);
        assert_eq!(HostOs::from_os_name("linux"), HostOs::Linux);
        assert_eq!(
            HostOs::from_os_name("freebsd"),
            HostOs::Other("freebsd".to_string())
        );
        assert_eq!(HostOs::from_os_name("freebsd").name(), "freebsd");
    }
}
