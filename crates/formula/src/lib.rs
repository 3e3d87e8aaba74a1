#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Formula handling for keg
//!
//! A formula is the declarative description of one release of a prebuilt
//! binary: identity, per-platform download URL and SHA-256 checksum, and the
//! fixed name the binary is installed under. Formulas live as TOML files in a
//! formula directory; each release is authored as a complete file so a newer
//! version fully supersedes an older one.

mod directory;
mod formula;
mod template;

pub use directory::{FormulaDirectory, SkippedFormula};
pub use formula::{Formula, PlatformArtifact, Platforms, ResolvedArtifact};
pub use template::expand_url;

/// File extension of formula files
pub const FORMULA_EXTENSION: &str = "toml";
