#![warn(clippy::pedantic)]
#![deny(clippy::all)]

//! Binary installation for keg
//!
//! The install pipeline for one resolved formula is strictly sequential:
//! locate (or download) the versioned artifact, verify its SHA-256, copy it
//! into the binary directory under a temporary name, mark it executable and
//! rename it over the fixed binary name, then record the receipt.

#[macro_use]
mod macros;
mod api;
mod installer;
mod staging;

pub use api::config::InstallConfig;
pub use api::context::{InstallContext, UninstallContext};
pub use installer::Installer;
pub use staging::{locate_artifact, temp_binary_path};

pub use keg_events::EventSender;
