//! Dependency synchronization
//!
//! Guarantees that a pinned external library checkout exists locally at
//! exactly the pinned revision. A missing checkout is created; a checkout at
//! another revision is updated in place; a checkout already at the pin is
//! left alone. The revision is re-read after every mutation so the
//! post-condition is checked rather than assumed.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::core::manifest::DependencyConfig;
use crate::error::SyncError;

/// A pinned external checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyPin {
    /// Remote repository location
    pub remote: String,
    /// Revision the checkout must be at
    pub revision: String,
    /// Local checkout path
    pub local_path: PathBuf,
}

impl DependencyPin {
    /// Resolve a declared dependency against the project root
    pub fn from_config(config: &DependencyConfig, project_root: &Path) -> Self {
        Self {
            remote: config.remote.clone(),
            revision: config.revision.clone(),
            local_path: project_root.join(&config.path),
        }
    }
}

/// What synchronization had to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// No checkout existed; one was created
    Fresh,
    /// The checkout was moved from another revision
    Updated { from: String },
    /// Already at the pin, nothing was touched
    UpToDate,
}

/// Version-control operations on a local checkout
pub trait Checkout {
    /// Revision the checkout at `path` is currently at
    fn current_revision(&self, path: &Path) -> Result<String, SyncError>;

    /// Create a checkout of `pin` at `pin.local_path`
    fn checkout(&self, pin: &DependencyPin) -> Result<(), SyncError>;

    /// Move the existing checkout to `pin.revision`
    fn update(&self, pin: &DependencyPin) -> Result<(), SyncError>;

    /// Whether `actual` satisfies the pinned revision
    fn matches(&self, actual: &str, pinned: &str) -> bool {
        actual == pinned
    }
}

/// Bring the checkout for `pin` to the pinned revision
pub fn synchronize(pin: &DependencyPin, vcs: &dyn Checkout) -> Result<SyncOutcome, SyncError> {
    let outcome = if pin.local_path.exists() {
        let current = vcs.current_revision(&pin.local_path)?;
        if vcs.matches(&current, &pin.revision) {
            tracing::info!(
                "{} @ {} (up to date)",
                pin.local_path.display(),
                pin.revision
            );
            return Ok(SyncOutcome::UpToDate);
        }

        tracing::info!(
            "Updating {} from {current} to {}",
            pin.local_path.display(),
            pin.revision
        );
        vcs.update(pin)?;
        SyncOutcome::Updated { from: current }
    } else {
        tracing::info!(
            "Checking out {} @ {} into {}",
            pin.remote,
            pin.revision,
            pin.local_path.display()
        );
        vcs.checkout(pin)?;
        SyncOutcome::Fresh
    };

    let actual = vcs.current_revision(&pin.local_path)?;
    if !vcs.matches(&actual, &pin.revision) {
        return Err(SyncError::RevisionMismatch {
            path: pin.local_path.clone(),
            expected: pin.revision.clone(),
            actual,
        });
    }

    Ok(outcome)
}
