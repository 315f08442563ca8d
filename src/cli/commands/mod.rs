//! CLI command implementations
//!
//! The tool has a single command, the build itself.

pub mod build;
