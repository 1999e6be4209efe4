//! Configuration module
//!
//! Loads the optional server configuration file.

mod file;

pub use file::*;
