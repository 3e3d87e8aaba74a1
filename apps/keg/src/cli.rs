//! Command line interface definition

use clap::{Parser, Subcommand};
use keg_types::{ColorChoice, PlatformTag, Version};
use std::path::PathBuf;

/// keg - Formula-driven installer for prebuilt release binaries
#[derive(Parser)]
#[command(name = "keg")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Formula-driven installer for prebuilt release binaries")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to the logs directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the binary directory
    #[arg(long, global = true, value_name = "DIR")]
    pub bin_dir: Option<PathBuf>,

    /// Override the formula directory
    #[arg(long, global = true, value_name = "DIR")]
    pub formula_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Install a formula's binary
    #[command(alias = "i")]
    Install {
        /// Formula name, or path to a formula file (.toml)
        formula: String,

        /// Install this version instead of the newest
        #[arg(long, value_parser = parse_version)]
        version: Option<Version>,

        /// Take the versioned artifact from this directory instead of downloading
        #[arg(long, value_name = "DIR")]
        from: Option<PathBuf>,

        /// Reinstall even if this version is already installed
        #[arg(long)]
        force: bool,
    },

    /// Remove an installed formula's binary
    #[command(alias = "rm")]
    Uninstall {
        /// Formula name
        formula: String,
    },

    /// List installed formulas
    #[command(alias = "ls")]
    List,

    /// Show information about a formula
    Info {
        /// Formula name
        formula: String,
    },

    /// Download a formula's artifact into the cache without installing
    Fetch {
        /// Formula name, or path to a formula file (.toml)
        formula: String,

        /// Fetch this version instead of the newest
        #[arg(long, value_parser = parse_version)]
        version: Option<Version>,

        /// Fetch the artifact for another platform (osx, linux)
        #[arg(long, value_parser = parse_platform)]
        platform: Option<PlatformTag>,
    },

    /// Re-hash installed binaries and compare them with their receipts
    Verify {
        /// Only verify this formula
        formula: Option<String>,
    },

    /// Show the platform tag selected for this host
    Platform,

    /// Validate a formula file
    Lint {
        /// Path to the formula file
        file: PathBuf,
    },

    /// Show install and uninstall history
    History {
        /// Only show entries for this formula
        formula: Option<String>,

        /// Maximum number of entries
        #[arg(long)]
        limit: Option<u32>,
    },
}

fn parse_version(input: &str) -> Result<Version, String> {
    keg_types::parse_version(input).map_err(|e| e.to_string())
}

fn parse_platform(input: &str) -> Result<PlatformTag, String> {
    input.parse::<PlatformTag>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_install_arguments() {
        let cli = Cli::try_parse_from([
            "keg", "install", "oxidux", "--version", "v0.4.0", "--from", "/tmp/stage", "--force",
        ])
        .unwrap();
        match cli.command {
            Commands::Install {
                formula,
                version,
                from,
                force,
            } => {
                assert_eq!(formula, "oxidux");
                assert_eq!(version, Some(Version::new(0, 4, 0)));
                assert_eq!(from, Some(PathBuf::from("/tmp/stage")));
                assert!(force);
            }
            _ => panic!("expected install"),
        }
    }

    #[test]
    fn test_invalid_version_rejected() {
        assert!(Cli::try_parse_from(["keg", "install", "oxidux", "--version", "latest"]).is_err());
    }

    #[test]
    fn test_fetch_platform_override() {
        let cli = Cli::try_parse_from(["keg", "fetch", "oxidux", "--platform", "osx"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Fetch {
                platform: Some(PlatformTag::Osx),
                ..
            }
        ));
        assert!(Cli::try_parse_from(["keg", "fetch", "oxidux", "--platform", "windows"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["keg", "list", "--json", "--color", "never"]).unwrap();
        assert!(cli.global.json);
        assert_eq!(cli.global.color, Some(ColorChoice::Never));
    }
}
