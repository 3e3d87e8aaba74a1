//! Platform abstraction layer for keg.
//!
//! This crate provides:
//! - Platform selection: mapping the host operating system onto the tag a
//!   release publishes artifacts for
//! - Filesystem operations (atomic rename, executable bit) behind a trait so
//!   the installer can be exercised against any implementation

pub mod core;
pub mod filesystem;
pub mod implementations;
pub mod selector;

pub use core::{Platform, PlatformContext};
pub use filesystem::FilesystemOperations;
pub use implementations::std_fs::StdFilesystemOperations;
pub use selector::{current_platform, select_platform, supported_platforms, SUPPORTED};
