//! Subversion checkouts
//!
//! Drives the `svn` client for pinned dependency checkouts.

use std::path::Path;

use crate::core::sync::{Checkout, DependencyPin};
use crate::error::SyncError;
use crate::infra::process::{Invocation, ToolRunner};

/// Subversion client
pub struct SvnCheckout<'a> {
    runner: &'a dyn ToolRunner,
}

impl<'a> SvnCheckout<'a> {
    pub fn new(runner: &'a dyn ToolRunner) -> Self {
        Self { runner }
    }
}

impl Checkout for SvnCheckout<'_> {
    fn current_revision(&self, path: &Path) -> Result<String, SyncError> {
        let output = self.runner.run_checked(
            &Invocation::new("svn")
                .arg("info")
                .arg(path.display().to_string()),
        )?;

        parse_revision(&output.stdout).ok_or_else(|| SyncError::RevisionUnknown {
            path: path.to_path_buf(),
        })
    }

    fn checkout(&self, pin: &DependencyPin) -> Result<(), SyncError> {
        self.runner.run_checked(
            &Invocation::new("svn")
                .args(["checkout", "-r", pin.revision.as_str(), pin.remote.as_str()])
                .arg(pin.local_path.display().to_string()),
        )?;
        Ok(())
    }

    fn update(&self, pin: &DependencyPin) -> Result<(), SyncError> {
        self.runner.run_checked(
            &Invocation::new("svn")
                .args(["update", "-r", pin.revision.as_str()])
                .arg(pin.local_path.display().to_string()),
        )?;
        Ok(())
    }
}

/// Extract the `Revision:` value from `svn info` output
fn parse_revision(info: &str) -> Option<String> {
    info.lines()
        .find_map(|line| line.strip_prefix("Revision:"))
        .map(|rev| rev.trim().to_string())
        .filter(|rev| !rev.is_empty())
}
