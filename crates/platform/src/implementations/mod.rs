//! Concrete platform implementations

pub mod std_fs;
