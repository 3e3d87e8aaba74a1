//! Formula model, parsing and validation

use std::path::Path;

use keg_errors::{Error, FormulaError};
use keg_hash::Checksum;
use keg_types::{PlatformTag, Version};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::template::expand_url;

/// One release of a prebuilt binary (formula file contents)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    pub name: String,
    pub desc: String,
    pub homepage: String,
    pub version: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Fixed, unversioned name the binary is installed under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,
    #[serde(default)]
    pub platforms: Platforms,
}

/// Per-platform artifacts, one optional table per supported tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Platforms {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub osx: Option<PlatformArtifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux: Option<PlatformArtifact>,
}

impl Platforms {
    #[must_use]
    pub fn get(&self, platform: PlatformTag) -> Option<&PlatformArtifact> {
        match platform {
            PlatformTag::Osx => self.osx.as_ref(),
            PlatformTag::Linux => self.linux.as_ref(),
        }
    }

    pub fn get_mut(&mut self, platform: PlatformTag) -> Option<&mut PlatformArtifact> {
        match platform {
            PlatformTag::Osx => self.osx.as_mut(),
            PlatformTag::Linux => self.linux.as_mut(),
        }
    }

    /// Set or clear the artifact for `platform`
    pub fn set(&mut self, platform: PlatformTag, artifact: Option<PlatformArtifact>) {
        match platform {
            PlatformTag::Osx => self.osx = artifact,
            PlatformTag::Linux => self.linux = artifact,
        }
    }

    /// Declared artifacts in tag order
    pub fn iter(&self) -> impl Iterator<Item = (PlatformTag, &PlatformArtifact)> {
        PlatformTag::ALL
            .into_iter()
            .filter_map(|tag| self.get(tag).map(|artifact| (tag, artifact)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Download location and checksum of the artifact for one platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformArtifact {
    /// URL template; may contain `{name}`, `{version}` and `{platform}`
    pub url: String,
    /// Hex-encoded SHA-256 of the artifact
    pub sha256: String,
}

/// Everything needed to fetch and install a formula on one platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub name: String,
    pub version: Version,
    pub platform: PlatformTag,
    pub url: Url,
    pub sha256: Checksum,
    /// Versioned, platform-qualified file name (`<name>-v<version>-<platform>`)
    pub artifact_name: String,
    /// Fixed name the artifact is renamed to on install
    pub binary_name: String,
}

impl Formula {
    /// Parse a formula from TOML
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a well-formed formula.
    pub fn from_toml_str(contents: &str) -> Result<Self, Error> {
        Self::parse(contents, "<string>")
    }

    /// Read and parse a formula file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;
        Self::parse(&contents, &path.display().to_string())
    }

    fn parse(contents: &str, origin: &str) -> Result<Self, Error> {
        toml::from_str(contents).map_err(|e| {
            FormulaError::ParseError {
                path: origin.to_string(),
                message: e.message().to_string(),
            }
            .into()
        })
    }

    /// Serialize to TOML
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, Error> {
        toml::to_string_pretty(self).map_err(|e| {
            FormulaError::Invalid {
                name: self.name.clone(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Name the binary is installed under
    #[must_use]
    pub fn binary_name(&self) -> &str {
        self.binary.as_deref().unwrap_or(&self.name)
    }

    /// Versioned artifact file name for `platform`
    #[must_use]
    pub fn artifact_name(&self, platform: PlatformTag) -> String {
        format!("{}-v{}-{}", self.name, self.version, platform)
    }

    /// Platforms this release publishes artifacts for
    #[must_use]
    pub fn supported_platforms(&self) -> Vec<PlatformTag> {
        self.platforms.iter().map(|(tag, _)| tag).collect()
    }

    /// Check the formula for structural errors.
    ///
    /// # Errors
    ///
    /// Returns `FormulaError::Invalid` describing the first problem found.
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.is_empty() {
            return Err(self.invalid("name must not be empty"));
        }
        if !is_plain_file_name(&self.name) {
            return Err(self.invalid(format!("name `{}` is not a valid file name", self.name)));
        }
        if !is_plain_file_name(self.binary_name()) {
            return Err(self.invalid(format!(
                "binary `{}` is not a valid file name",
                self.binary_name()
            )));
        }

        match Url::parse(&self.homepage) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(self.invalid(format!("homepage `{}` is not an http(s) URL", self.homepage)))
            }
        }

        if self.platforms.is_empty() {
            return Err(self.invalid("at least one platform must be declared"));
        }

        for (platform, _) in self.platforms.iter() {
            self.resolve(platform)?;
        }

        Ok(())
    }

    /// Resolve the artifact for `platform`.
    ///
    /// # Errors
    ///
    /// Returns `FormulaError::PlatformNotSupported` if the release has no
    /// artifact for the platform, or `FormulaError::Invalid` if its URL or
    /// checksum is malformed.
    pub fn resolve(&self, platform: PlatformTag) -> Result<ResolvedArtifact, Error> {
        let artifact =
            self.platforms
                .get(platform)
                .ok_or_else(|| FormulaError::PlatformNotSupported {
                    name: self.name.clone(),
                    version: self.version.to_string(),
                    platform: platform.to_string(),
                })?;

        let expanded = expand_url(&artifact.url, &self.name, &self.version, platform)
            .ok_or_else(|| {
                self.invalid(format!(
                    "{platform}: unknown placeholder in url `{}`",
                    artifact.url
                ))
            })?;
        let url = Url::parse(&expanded)
            .map_err(|e| self.invalid(format!("{platform}: invalid url `{expanded}`: {e}")))?;

        if artifact.sha256.trim().len() != 64 {
            return Err(self.invalid(format!(
                "{platform}: sha256 must be 64 hex characters"
            )));
        }
        let sha256 = Checksum::from_hex(&artifact.sha256)
            .map_err(|_| self.invalid(format!("{platform}: sha256 is not valid hex")))?;

        Ok(ResolvedArtifact {
            name: self.name.clone(),
            version: self.version.clone(),
            platform,
            url,
            sha256,
            artifact_name: self.artifact_name(platform),
            binary_name: self.binary_name().to_string(),
        })
    }

    fn invalid(&self, message: impl Into<String>) -> Error {
        FormulaError::Invalid {
            name: self.name.clone(),
            message: message.into(),
        }
        .into()
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
