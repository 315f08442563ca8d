//! Error types for armadillo-build
//!
//! Domain-specific error types using thiserror. Every pipeline component
//! returns its own error enum; the driver wraps them in [`PipelineError`]
//! together with the stage that failed.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::pipeline::Stage;

/// Configuration and manifest errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Both stage-group restrictions were requested
    #[error("--backend-only and --frontend-only are mutually exclusive")]
    ConflictingRunModes,

    /// Manifest could not be read
    #[error("Failed to read build manifest '{path}': {error}")]
    ManifestRead { path: PathBuf, error: String },

    /// Manifest is not valid TOML or has unexpected fields
    #[error("Failed to parse build manifest '{path}': {error}")]
    ManifestParse { path: PathBuf, error: String },

    /// No back-end units declared while the back-end group runs
    #[error("No back-end sources declared in [backend].sources")]
    EmptyBackendSources,

    /// A unit appears twice in an ordered source list
    #[error("Source '{unit}' is listed more than once in {list}")]
    DuplicateSource { list: String, unit: String },

    /// Two back-end units would compile to the same object file
    #[error("Back-end sources '{first}' and '{second}' would both compile to the same object file")]
    ObjectCollision { first: String, second: String },

    /// Version template does not carry the `.proto` suffix
    #[error("Version template '{path}' must end in '.proto'")]
    MalformedTemplatePath { path: PathBuf },

    /// Command template with no program
    #[error("Command template '{name}' is empty")]
    EmptyCommand { name: String },
}

/// External tool invocation errors
#[derive(Error, Debug)]
pub enum ToolError {
    /// Program not installed or not executable
    #[error("Tool '{program}' not found: {error}")]
    NotFound { program: String, error: String },

    /// Process could not be started
    #[error("Failed to run '{program}': {error}")]
    Spawn { program: String, error: String },

    /// Process ran and reported failure
    #[error("'{command}' {}{}", describe_status(*status), diagnostics(stdout, stderr))]
    Failed {
        command: String,
        status: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

fn describe_status(status: Option<i32>) -> String {
    match status {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

fn diagnostics(stdout: &str, stderr: &str) -> String {
    let mut text = String::new();
    for stream in [stdout, stderr] {
        let trimmed = stream.trim_end();
        if !trimmed.is_empty() {
            text.push('\n');
            text.push_str(trimmed);
        }
    }
    text
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory or file
    #[error("Failed to remove '{path}': {error}")]
    Remove { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// Failed to copy file
    #[error("Failed to copy '{from}' to '{to}': {error}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },
}

/// Dependency synchronization errors
#[derive(Error, Debug)]
pub enum SyncError {
    /// VCS command failed
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Checkout exists but is not a usable repository
    #[error("Invalid checkout at '{path}': {error}")]
    InvalidCheckout { path: PathBuf, error: String },

    /// Revision could not be determined
    #[error("Could not determine the revision of '{path}'")]
    RevisionUnknown { path: PathBuf },

    /// Checkout did not land on the pinned revision
    #[error("Checkout at '{path}' is at revision {actual}, expected {expected}")]
    RevisionMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

/// Back-end compilation errors
#[derive(Error, Debug)]
pub enum CompileError {
    /// Declared source unit does not exist
    #[error("Back-end source not found: {path}")]
    MissingSource { path: PathBuf },

    /// Compiler or linker failed
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Filesystem error
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    /// Invalid command template
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Linker reported success without producing the executable
    #[error("Linker did not produce '{path}'")]
    MissingOutput { path: PathBuf },
}

/// Version stamp errors
#[derive(Error, Debug)]
pub enum StampError {
    /// Counter or VCS command failed
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Filesystem error
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    /// Invalid command template
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Template lacks one of the recognized assignments
    #[error("Version template '{path}' has no '{field} = <number>' assignment")]
    MissingField { path: PathBuf, field: String },

    /// Field name cannot be turned into a matcher
    #[error("Invalid version field name '{field}': {error}")]
    InvalidField { field: String, error: String },

    /// Embedded counter is already at the largest representable value
    #[error("Build counter {previous} in '{path}' cannot be advanced")]
    CounterOverflow { path: PathBuf, previous: u64 },

    /// Counter command printed something that is not a number
    #[error("Build counter '{output}' is not a non-negative integer")]
    InvalidCounter { output: String },
}

/// Resource bundling errors
#[derive(Error, Debug)]
pub enum ResourceError {
    /// Declared static resource or stylesheet fragment does not exist
    #[error("Front-end resource not found: {path}")]
    MissingSource { path: PathBuf },

    /// Filesystem error
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

/// Front-end assembly errors
#[derive(Error, Debug)]
pub enum AssembleError {
    /// Declared front-end unit does not exist
    #[error("Front-end source not found: {path}")]
    MissingSource { path: PathBuf },

    /// Bundler failed
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Filesystem error
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    /// Invalid command template
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Bundler reported success without producing the script
    #[error("Bundler did not produce '{path}'")]
    MissingOutput { path: PathBuf },
}

/// Failure of a single pipeline stage
#[derive(Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Stamp(#[from] StampError),

    #[error(transparent)]
    Assemble(#[from] AssembleError),
}

/// Top-level pipeline error
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A required tool is missing
    #[error("Preflight check failed")]
    Preflight(#[source] ToolError),

    /// A stage failed; later stages did not run
    #[error("Stage '{stage}' failed")]
    Stage {
        stage: Stage,
        #[source]
        source: StageError,
    },

    /// Artifact inspection after a successful run failed
    #[error("Failed to inspect build artifacts")]
    Report(#[from] FilesystemError),
}

impl PipelineError {
    /// Stage that failed, if the failure happened inside one
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
