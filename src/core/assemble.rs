//! Front-end script assembly
//!
//! Produces `outputRoot/fe/<product>.js` in one of two ways:
//!
//! - **debug**: raw concatenation of the front-end units in declared order,
//!   each preceded by a `/*=== File: <unit> ===*/` comment. No external tool.
//! - **release**: the optimizing bundler is handed the ordered unit list
//!   and the output path; it owns dependency resolution and minification.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::core::config::BuildConfiguration;
use crate::error::{AssembleError, FilesystemError};
use crate::infra::filesystem;
use crate::infra::process::ToolRunner;

/// Run the assembly stage, returning the script path
pub fn assemble_frontend(
    config: &BuildConfiguration,
    runner: &dyn ToolRunner,
) -> Result<PathBuf, AssembleError> {
    let units = &config.manifest().frontend.sources;
    let sources: Vec<PathBuf> = units
        .iter()
        .map(|u| config.frontend_root().join(u))
        .collect();

    if let Some(missing) = sources.iter().find(|p| !p.is_file()) {
        return Err(AssembleError::MissingSource {
            path: missing.clone(),
        });
    }

    let output = config.script_path();
    if let Some(parent) = output.parent() {
        filesystem::create_dir_all(parent)?;
    }

    if config.optimize_frontend() {
        bundle(config, runner, &sources, &output)?;
    } else {
        concatenate(units, &sources, &output)?;
    }

    Ok(output)
}

/// Write each unit behind a provenance comment, in order
pub fn concatenate(units: &[String], sources: &[PathBuf], output: &Path) -> Result<(), AssembleError> {
    let write_err = |e: std::io::Error| FilesystemError::WriteFile {
        path: output.to_path_buf(),
        error: e.to_string(),
    };

    let file = File::create(output).map_err(write_err)?;
    let mut writer = BufWriter::new(file);

    for (unit, source) in units.iter().zip(sources) {
        tracing::info!("CONCAT {unit}");
        let content = filesystem::read_bytes(source)?;
        writeln!(writer, "/*=== File: {unit} ===*/").map_err(write_err)?;
        writer.write_all(&content).map_err(write_err)?;
        // Keep the next header on its own line.
        if !content.is_empty() && !content.ends_with(b"\n") {
            writer.write_all(b"\n").map_err(write_err)?;
        }
    }

    writer.flush().map_err(write_err)?;
    Ok(())
}

fn bundle(
    config: &BuildConfiguration,
    runner: &dyn ToolRunner,
    sources: &[PathBuf],
    output: &Path,
) -> Result<(), AssembleError> {
    // A stale script must never pass for the bundler's output.
    filesystem::remove_file(output)?;

    let inputs: Vec<String> = sources.iter().map(|p| p.display().to_string()).collect();
    let output_arg = output.display().to_string();
    let invocation = config.manifest().frontend.bundle.expand(
        "frontend.bundle",
        &[("output", output_arg.as_str())],
        Some(("each_input", inputs.as_slice())),
        config.project_root(),
    )?;

    tracing::info!("{invocation}");
    runner.run_checked(&invocation)?;

    if !output.is_file() {
        return Err(AssembleError::MissingOutput {
            path: output.to_path_buf(),
        });
    }
    Ok(())
}
