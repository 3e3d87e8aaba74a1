//! Directory and file names used to derive default paths

/// Application directory under the platform config/data roots
pub const APP_DIR: &str = "keg";
pub const CONFIG_FILE: &str = "config.toml";

/// Used when no user data directory can be determined
pub const FALLBACK_PREFIX: &str = ".keg";

pub const BIN_DIR: &str = "bin";
pub const CACHE_DIR: &str = "cache";
pub const FORMULA_DIR: &str = "formula";
pub const LOGS_DIR: &str = "logs";
pub const DB_FILE: &str = "state.sqlite";
