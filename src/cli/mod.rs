//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no build logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::config::defaults;
use crate::core::config::RunMode;

/// Version plus the git revision and time the binary was built from
fn long_version() -> &'static str {
    static LONG_VERSION: OnceLock<String> = OnceLock::new();
    LONG_VERSION.get_or_init(|| {
        format!(
            "{}\ncommit: {}\nbuilt: {}",
            env!("CARGO_PKG_VERSION"),
            option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
            option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown"),
        )
    })
}

/// Armadillo build driver
///
/// Compiles the back-end, synchronizes the pinned front-end library, stamps
/// the version file, and assembles the front-end bundle.
#[derive(Parser, Debug)]
#[command(name = "armadillo-build")]
#[command(author, version, long_version = long_version(), about, long_about = None)]
pub struct Cli {
    /// Only compile and link the back-end
    #[arg(short = 'b', long)]
    pub backend_only: bool,

    /// Only run the front-end stages
    #[arg(short = 'f', long)]
    pub frontend_only: bool,

    /// Bundle the front-end with the optimizing compiler and publish the version stamp
    #[arg(short = 'c', long = "optimize", visible_alias = "closure-fe")]
    pub optimize: bool,

    /// Project root
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Build manifest (defaults to <root>/armadillo-build.toml)
    #[arg(long, env = defaults::MANIFEST_ENV)]
    pub config: Option<PathBuf>,

    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the build report as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Run-mode flags as given
    pub fn mode(&self) -> RunMode {
        RunMode {
            backend_only: self.backend_only,
            frontend_only: self.frontend_only,
            optimize_frontend: self.optimize,
        }
    }

    /// Execute the build
    pub fn run(self) -> Result<()> {
        let options = commands::build::BuildOptions {
            mode: self.mode(),
            manifest: self.config,
            output: output::OutputConfig::new(self.quiet, self.json, self.verbose),
        };
        commands::build::execute(&self.root, &options)
    }
}
