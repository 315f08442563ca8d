//! Core build logic
//!
//! Every stage takes the validated [`config::BuildConfiguration`] by
//! reference and reaches external tools only through
//! [`crate::infra::process::ToolRunner`].
//!
//! # Submodules
//!
//! - [`manifest`] - Build manifest (armadillo-build.toml) parsing
//! - [`config`] - Run configuration and validation
//! - [`compile`] - Back-end compilation and linking
//! - [`sync`] - Pinned dependency synchronization
//! - [`resources`] - Front-end resource bundling
//! - [`stamp`] - Version stamping and publication
//! - [`assemble`] - Front-end script assembly
//! - [`artifacts`] - Produced files and the run report
//! - [`pipeline`] - Stage ordering and the driver

pub mod artifacts;
pub mod assemble;
pub mod compile;
pub mod config;
pub mod manifest;
pub mod pipeline;
pub mod resources;
pub mod stamp;
pub mod sync;
