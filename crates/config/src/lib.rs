#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for keg
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/keg/config.toml)
//! - Environment variables (`KEG_*`)
//! - CLI flags (applied by the binary)

pub mod constants;

use keg_errors::{ConfigError, Error};
use keg_types::{ColorChoice, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub network: NetworkConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
}

/// Path configuration
///
/// Every entry is optional; unset entries derive from `prefix`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    pub prefix: Option<PathBuf>,
    pub bin_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub formula_dir: Option<PathBuf>,
    pub state_db: Option<PathBuf>,
    pub logs_dir: Option<PathBuf>,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64, // seconds
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: OutputFormat::Tty,
            color: ColorChoice::Auto,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            retries: default_retries(),
            retry_delay: default_retry_delay(),
        }
    }
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Tty
}

fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

fn default_timeout() -> u64 {
    300 // 5 minutes
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join(constants::APP_DIR).join(constants::CONFIG_FILE))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        Self::from_toml_str(&contents)
    }

    /// Parse configuration from a TOML document
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or has the wrong shape.
    pub fn from_toml_str(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "loading config");
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: &Option<PathBuf>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Write configuration to a file, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written.
    pub async fn save_to_file(&self, path: &Path) -> Result<(), Error> {
        let contents = toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            error: e.to_string(),
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteError {
                    path: parent.display().to_string(),
                    error: e.to_string(),
                })?;
        }

        fs::write(path, contents)
            .await
            .map_err(|e| ConfigError::WriteError {
                path: path.display().to_string(),
                error: e.to_string(),
            })?;
        Ok(())
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(output) = std::env::var("KEG_OUTPUT") {
            self.general.default_output = match output.as_str() {
                "plain" => OutputFormat::Plain,
                "tty" => OutputFormat::Tty,
                "json" => OutputFormat::Json,
                _ => return Err(invalid("KEG_OUTPUT", output)),
            };
        }

        if let Ok(color) = std::env::var("KEG_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => return Err(invalid("KEG_COLOR", color)),
            };
        }

        let path_vars: [(&str, &mut Option<PathBuf>); 6] = [
            ("KEG_PREFIX", &mut self.paths.prefix),
            ("KEG_BIN_DIR", &mut self.paths.bin_dir),
            ("KEG_CACHE_DIR", &mut self.paths.cache_dir),
            ("KEG_FORMULA_DIR", &mut self.paths.formula_dir),
            ("KEG_STATE_DB", &mut self.paths.state_db),
            ("KEG_LOGS_DIR", &mut self.paths.logs_dir),
        ];
        for (name, slot) in path_vars {
            if let Some(value) = std::env::var_os(name) {
                if value.is_empty() {
                    return Err(invalid(name, String::new()));
                }
                *slot = Some(PathBuf::from(value));
            }
        }

        if let Ok(timeout) = std::env::var("KEG_TIMEOUT") {
            self.network.timeout = parse_env("KEG_TIMEOUT", timeout)?;
        }

        if let Ok(retries) = std::env::var("KEG_RETRIES") {
            self.network.retries = parse_env("KEG_RETRIES", retries)?;
        }

        if let Ok(delay) = std::env::var("KEG_RETRY_DELAY") {
            self.network.retry_delay = parse_env("KEG_RETRY_DELAY", delay)?;
        }

        Ok(())
    }

    /// Installation prefix; everything else defaults beneath it
    #[must_use]
    pub fn prefix(&self) -> PathBuf {
        self.paths.prefix.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map(|dir| dir.join(constants::APP_DIR))
                .unwrap_or_else(|| PathBuf::from(constants::FALLBACK_PREFIX))
        })
    }

    /// Directory the fixed-name binaries are placed in
    #[must_use]
    pub fn bin_dir(&self) -> PathBuf {
        self.paths
            .bin_dir
            .clone()
            .unwrap_or_else(|| self.prefix().join(constants::BIN_DIR))
    }

    /// Directory downloaded artifacts are staged in
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.paths
            .cache_dir
            .clone()
            .unwrap_or_else(|| self.prefix().join(constants::CACHE_DIR))
    }

    /// Directory formula files are read from
    #[must_use]
    pub fn formula_dir(&self) -> PathBuf {
        self.paths
            .formula_dir
            .clone()
            .unwrap_or_else(|| self.prefix().join(constants::FORMULA_DIR))
    }

    /// Path of the receipts database
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.paths
            .state_db
            .clone()
            .unwrap_or_else(|| self.prefix().join(constants::DB_FILE))
    }

    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.paths
            .logs_dir
            .clone()
            .unwrap_or_else(|| self.prefix().join(constants::LOGS_DIR))
    }

    /// Per-request timeout for network operations
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.network.timeout)
    }

    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.network.retry_delay)
    }
}

fn invalid(field: &str, value: String) -> Error {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value,
    }
    .into()
}

fn parse_env<T: std::str::FromStr>(field: &str, value: String) -> Result<T, Error> {
    value.parse().map_err(|_| invalid(field, value.clone()))
}
