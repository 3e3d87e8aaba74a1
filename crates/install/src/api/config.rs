use keg_config::Config;
use std::path::PathBuf;

/// Installer configuration
#[derive(Clone, Debug)]
pub struct InstallConfig {
    /// Directory fixed-name binaries are placed in
    pub bin_dir: PathBuf,
    /// Directory downloaded artifacts are kept in
    pub cache_dir: PathBuf,
}

impl InstallConfig {
    #[must_use]
    pub fn new(bin_dir: PathBuf, cache_dir: PathBuf) -> Self {
        Self { bin_dir, cache_dir }
    }

    /// Paths resolved from the application config
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.bin_dir(), config.cache_dir())
    }
}
