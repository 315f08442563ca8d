//! Git operations
//!
//! Reads checkout revisions in-process with the gix crate and drives the
//! `git` client for everything that mutates a repository: cloning and
//! moving pinned checkouts, and committing the published version stamp.

use std::path::{Path, PathBuf};

use crate::core::stamp::History;
use crate::core::sync::{Checkout, DependencyPin};
use crate::error::{StampError, SyncError, ToolError};
use crate::infra::filesystem;
use crate::infra::process::{Invocation, ToolRunner};
use crate::infra::toolchain::CommandTemplate;

/// Shortest abbreviated SHA accepted as a pin
const MIN_ABBREV_LEN: usize = 7;

/// Resolve HEAD of the repository at `path` to a full commit SHA
pub fn head_sha(path: &Path) -> Result<String, SyncError> {
    let repo = gix::open(path).map_err(|e| SyncError::InvalidCheckout {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    let id = repo.head_id().map_err(|e| SyncError::InvalidCheckout {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    Ok(id.to_hex().to_string())
}

/// Whether `actual` (a full SHA) is the commit named by `pinned`
pub fn sha_matches(actual: &str, pinned: &str) -> bool {
    let pinned = pinned.to_ascii_lowercase();
    pinned.len() >= MIN_ABBREV_LEN
        && pinned.chars().all(|c| c.is_ascii_hexdigit())
        && actual.to_ascii_lowercase().starts_with(&pinned)
}

/// Git-backed pinned checkout
pub struct GitCheckout<'a> {
    runner: &'a dyn ToolRunner,
}

impl<'a> GitCheckout<'a> {
    pub fn new(runner: &'a dyn ToolRunner) -> Self {
        Self { runner }
    }

    fn detach(&self, pin: &DependencyPin) -> Result<(), SyncError> {
        self.runner.run_checked(
            &Invocation::new("git")
                .args(["checkout", "--quiet", "--detach", pin.revision.as_str()])
                .current_dir(&pin.local_path),
        )?;
        Ok(())
    }
}

impl Checkout for GitCheckout<'_> {
    fn current_revision(&self, path: &Path) -> Result<String, SyncError> {
        head_sha(path)
    }

    fn checkout(&self, pin: &DependencyPin) -> Result<(), SyncError> {
        self.runner.run_checked(
            &Invocation::new("git")
                .args(["clone", "--quiet", "--no-checkout", pin.remote.as_str()])
                .arg(pin.local_path.display().to_string()),
        )?;
        // A clone left on the default branch must not pass for the pin.
        if let Err(e) = self.detach(pin) {
            if let Err(cleanup) = filesystem::remove_dir_all(&pin.local_path) {
                tracing::warn!("{cleanup}");
            }
            return Err(e);
        }
        Ok(())
    }

    fn update(&self, pin: &DependencyPin) -> Result<(), SyncError> {
        self.runner.run_checked(
            &Invocation::new("git")
                .args(["fetch", "--quiet", "origin"])
                .current_dir(&pin.local_path),
        )?;
        self.detach(pin)
    }

    fn matches(&self, actual: &str, pinned: &str) -> bool {
        sha_matches(actual, pinned)
    }
}

/// Project history: build counter, working-tree state and stamp commits
pub struct GitHistory<'a> {
    runner: &'a dyn ToolRunner,
    work_dir: PathBuf,
    counter: CommandTemplate,
}

impl<'a> GitHistory<'a> {
    /// History of the repository at `work_dir`, counting builds with `counter`
    pub fn new(runner: &'a dyn ToolRunner, work_dir: &Path, counter: CommandTemplate) -> Self {
        Self {
            runner,
            work_dir: work_dir.to_path_buf(),
            counter,
        }
    }
}

impl History for GitHistory<'_> {
    fn next_build_counter(&self) -> Result<u64, StampError> {
        let invocation = self
            .counter
            .expand("version.counter", &[], None, &self.work_dir)?;
        let output = self.runner.run_checked(&invocation)?;
        let text = output.stdout.trim();
        text.parse::<u64>().map_err(|_| StampError::InvalidCounter {
            output: text.to_string(),
        })
    }

    fn modified_files(&self) -> Result<Vec<String>, ToolError> {
        let output = self.runner.run_checked(
            &Invocation::new("git")
                .args(["ls-files", "-m"])
                .current_dir(&self.work_dir),
        )?;
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    fn commit(&self, path: &Path, author: &str, message: &str) -> Result<(), ToolError> {
        let relative = path.strip_prefix(&self.work_dir).unwrap_or(path);
        self.runner.run_checked(
            &Invocation::new("git")
                .arg("commit")
                .arg(format!("--author={author}"))
                .args(["-m", message])
                .arg(relative.display().to_string())
                .current_dir(&self.work_dir),
        )?;
        Ok(())
    }
}
