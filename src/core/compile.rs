//! Back-end compilation
//!
//! Compiles each back-end unit in declared order, then links every object
//! into `outputRoot/<product>`. The first failing step stops the stage; an
//! executable is only left behind when the linker succeeded.

use std::path::PathBuf;

use crate::core::config::BuildConfiguration;
use crate::error::CompileError;
use crate::infra::filesystem;
use crate::infra::process::ToolRunner;

/// Run the compile stage, returning the executable path
pub fn compile_backend(
    config: &BuildConfiguration,
    runner: &dyn ToolRunner,
) -> Result<PathBuf, CompileError> {
    let backend = &config.manifest().backend;
    let units: Vec<(PathBuf, PathBuf)> = backend
        .sources
        .iter()
        .map(|unit| (config.source_root().join(unit), config.object_path(unit)))
        .collect();

    if let Some((missing, _)) = units.iter().find(|(source, _)| !source.is_file()) {
        return Err(CompileError::MissingSource {
            path: missing.clone(),
        });
    }

    filesystem::create_dir_all(config.output_root())?;

    let executable = config.executable_path();
    // A previous run's executable must not survive a failed build.
    filesystem::remove_file(&executable)?;

    let cwd = config.output_root();
    for (source, object) in &units {
        let source_arg = source.display().to_string();
        let object_arg = object.display().to_string();
        let invocation = backend.compile.expand(
            "backend.compile",
            &[
                ("source", source_arg.as_str()),
                ("object", object_arg.as_str()),
            ],
            None,
            cwd,
        )?;
        tracing::info!("{invocation}");
        runner.run_checked(&invocation)?;
    }

    let objects: Vec<String> = units
        .iter()
        .map(|(_, object)| object.display().to_string())
        .collect();
    let output_arg = executable.display().to_string();
    let invocation = backend.link.expand(
        "backend.link",
        &[("output", output_arg.as_str())],
        Some(("each_object", objects.as_slice())),
        cwd,
    )?;
    tracing::info!("{invocation}");

    if let Err(e) = runner.run_checked(&invocation) {
        filesystem::remove_file(&executable)?;
        return Err(e.into());
    }

    if !executable.is_file() {
        return Err(CompileError::MissingOutput { path: executable });
    }

    Ok(executable)
}
