//! Build command implementation
//!
//! Loads the manifest, validates the run configuration, runs the pipeline
//! against the real tools, and reports the result.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::cli::output::{
    print_detail, print_info, print_success, print_warning, OutputConfig, StageProgress,
};
use crate::config::defaults;
use crate::core::artifacts::BuildReport;
use crate::core::config::{BuildConfiguration, RunMode};
use crate::core::manifest::BuildManifest;
use crate::core::pipeline::Pipeline;
use crate::core::stamp::{Publication, StampOutcome};
use crate::core::sync::SyncOutcome;
use crate::infra::process::SystemRunner;

/// Build options
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Stage selection
    pub mode: RunMode,
    /// Explicit manifest path
    pub manifest: Option<PathBuf>,
    /// Output mode
    pub output: OutputConfig,
}

/// Resolve the manifest location and load it
pub fn load_manifest(project_dir: &Path, explicit: Option<&Path>) -> Result<BuildManifest> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("Build manifest {} does not exist", path.display());
            }
            path.to_path_buf()
        }
        None => project_dir.join(defaults::MANIFEST_FILE),
    };
    Ok(BuildManifest::load_or_default(&path)?)
}

/// Execute the build command
pub fn execute(project_dir: &Path, options: &BuildOptions) -> Result<()> {
    let project_dir = project_dir
        .canonicalize()
        .with_context(|| format!("Project root {} is not accessible", project_dir.display()))?;

    let manifest = load_manifest(&project_dir, options.manifest.as_deref())?;
    let config = BuildConfiguration::new(&project_dir, manifest, options.mode)?;

    tracing::info!("Building {} in {}", config.manifest().project.product, project_dir.display());

    let runner = SystemRunner;
    let mut progress = StageProgress::new(options.output);
    let report = Pipeline::new(&config, &runner).run(&mut progress)?;

    if options.output.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report, &project_dir);
    }
    Ok(())
}

fn print_summary(report: &BuildReport, project_dir: &Path) {
    if let Some(sync) = &report.sync {
        match sync {
            SyncOutcome::Fresh => print_info("Dependency checked out"),
            SyncOutcome::Updated { from } => print_info(&format!("Dependency updated from {from}")),
            SyncOutcome::UpToDate => {}
        }
    }

    if let Some(StampOutcome::Stamped { stamp, publication }) = &report.stamp {
        print_info(&format!("Version stamped: build {} @ {}", stamp.build, stamp.timestamp));
        match publication {
            Publication::Committed { destination } => {
                print_detail(&format!("Committed {}", relative(destination, project_dir)));
            }
            Publication::Copied { destination } => {
                print_warning(&format!(
                    "Copied {} but the working tree is dirty, not committed",
                    relative(destination, project_dir)
                ));
            }
            Publication::NotRequested => {}
        }
    }

    print_success(&format!(
        "Build complete: {} stage(s), {} artifact(s)",
        report.completed_stages().len(),
        report.artifacts.len()
    ));
    for artifact in &report.artifacts {
        print_detail(&format!(
            "{} ({} bytes)",
            relative(&artifact.path, project_dir),
            artifact.size
        ));
    }
}

fn relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base).unwrap_or(path).display().to_string()
}
