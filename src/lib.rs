//! armadillo-build - build driver for the Armadillo file manager
//!
//! Turns the Go back-end and the JavaScript front-end of Armadillo into
//! deployable artifacts by running a fixed, ordered pipeline of stages.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Pipeline stages and the driver that sequences them
//! - [`infra`] - Infrastructure layer (filesystem, processes, version control)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
