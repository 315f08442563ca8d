//! External process execution
//!
//! Every collaborator the pipeline drives (compiler, linker, bundler,
//! version control) is invoked through [`ToolRunner`]. Invocations block
//! until the process exits; output is captured so a failure can surface the
//! tool's diagnostics verbatim.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::ToolError;

/// A single external command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path
    pub program: String,
    /// Arguments in order
    pub args: Vec<String>,
    /// Working directory, inherited when unset
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    /// Create an invocation of `program` with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Append one argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run in `dir`
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` when killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Whether the process exited with status 0
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs external tools on behalf of the pipeline
pub trait ToolRunner {
    /// Run `invocation` to completion and capture its output.
    ///
    /// A non-zero exit is *not* an error here; see [`ToolRunner::run_checked`].
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError>;

    /// Resolve `program` to something executable, relative paths against `base`
    fn locate(&self, program: &str, base: &Path) -> Result<PathBuf, ToolError>;

    /// Run `invocation` and turn a non-zero exit into [`ToolError::Failed`]
    fn run_checked(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
        let output = self.run(invocation)?;
        if output.success() {
            Ok(output)
        } else {
            Err(ToolError::Failed {
                command: invocation.to_string(),
                status: output.status,
                stdout: output.stdout,
                stderr: output.stderr,
            })
        }
    }
}

/// Runs tools as child processes of this one
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
        tracing::debug!("exec: {invocation}");

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        if let Some(cwd) = &invocation.cwd {
            command.current_dir(cwd);
        }

        let output = command.output().map_err(|e| ToolError::Spawn {
            program: invocation.program.clone(),
            error: e.to_string(),
        })?;

        let result = ToolOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!("exit: {:?} ({})", result.status, invocation.program);
        Ok(result)
    }

    fn locate(&self, program: &str, base: &Path) -> Result<PathBuf, ToolError> {
        if program.contains(std::path::MAIN_SEPARATOR) || program.contains('/') {
            let path = base.join(program);
            return if path.is_file() {
                Ok(path)
            } else {
                Err(ToolError::NotFound {
                    program: program.to_string(),
                    error: format!("{} does not exist", path.display()),
                })
            };
        }

        which::which(program).map_err(|e| ToolError::NotFound {
            program: program.to_string(),
            error: e.to_string(),
        })
    }
}
