//! Build artifacts and run report
//!
//! After a successful run the driver records what was produced: the
//! executable and every file under the resource directory, each with its
//! size and SHA-256 digest.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::pipeline::Stage;
use crate::core::stamp::StampOutcome;
use crate::core::sync::SyncOutcome;
use crate::error::FilesystemError;
use crate::infra::filesystem;

/// Kind of produced file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Linked back-end executable
    Executable,
    /// Assembled front-end script
    Script,
    /// Anything else in the resource directory
    Resource,
}

/// One produced file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub size: u64,
    pub sha256: String,
}

impl Artifact {
    /// Describe the file at `path`
    pub fn inspect(kind: ArtifactKind, path: &Path) -> Result<Self, FilesystemError> {
        let bytes = filesystem::read_bytes(path)?;
        Ok(Self {
            kind,
            path: path.to_path_buf(),
            size: bytes.len() as u64,
            sha256: hex::encode(Sha256::digest(&bytes)),
        })
    }
}

/// Whether a stage ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Completed,
    Skipped,
}

/// Record of one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageRecord {
    pub stage: Stage,
    pub status: StageStatus,
    pub elapsed_ms: u128,
}

impl StageRecord {
    pub fn completed(stage: Stage, elapsed: Duration) -> Self {
        Self {
            stage,
            status: StageStatus::Completed,
            elapsed_ms: elapsed.as_millis(),
        }
    }

    pub fn skipped(stage: Stage) -> Self {
        Self {
            stage,
            status: StageStatus::Skipped,
            elapsed_ms: 0,
        }
    }
}

/// Summary of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Every stage in pipeline order
    pub stages: Vec<StageRecord>,
    /// Dependency synchronization result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncOutcome>,
    /// Version stamp result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamp: Option<StampOutcome>,
    /// Produced files
    pub artifacts: Vec<Artifact>,
}

impl BuildReport {
    /// Stages that actually ran, in order
    pub fn completed_stages(&self) -> Vec<Stage> {
        self.stages
            .iter()
            .filter(|r| r.status == StageStatus::Completed)
            .map(|r| r.stage)
            .collect()
    }
}

/// Inspect the executable (if built) and every file under `resource_dir`
/// (if the front-end ran), in file-name order
pub fn collect_artifacts(
    executable: Option<&Path>,
    resource_dir: Option<&Path>,
    script: Option<&Path>,
) -> Result<Vec<Artifact>, FilesystemError> {
    let mut artifacts = Vec::new();

    if let Some(path) = executable {
        artifacts.push(Artifact::inspect(ArtifactKind::Executable, path)?);
    }

    if let Some(dir) = resource_dir {
        let files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .collect();

        for path in files {
            let kind = if script == Some(path.as_path()) {
                ArtifactKind::Script
            } else {
                ArtifactKind::Resource
            };
            artifacts.push(Artifact::inspect(kind, &path)?);
        }
    }

    Ok(artifacts)
}
