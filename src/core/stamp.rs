//! Version stamping
//!
//! The front-end carries a build counter and a timestamp as two numeric
//! assignments inside a template file (`BUILD = 12`, `STAMP = 1290000000`).
//! Each run advances the counter from project history, sets the timestamp,
//! and rewrites exactly those two values. Everything else in the template,
//! including line endings, passes through untouched.
//!
//! In release mode the rewritten template is copied to its published path
//! (the template path without `.proto`) and committed, but only when no
//! other tracked file is modified.

use regex::{Captures, Regex};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::core::config::BuildConfiguration;
use crate::error::{StampError, ToolError};
use crate::infra::filesystem;

/// Build counter and stamp time embedded in the front-end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionStamp {
    /// Monotonic build number
    pub build: u64,
    /// Unix epoch seconds
    pub timestamp: u64,
}

/// Project history queries needed for stamping
pub trait History {
    /// One higher than the last recorded build
    fn next_build_counter(&self) -> Result<u64, StampError>;

    /// Tracked files with uncommitted modifications
    fn modified_files(&self) -> Result<Vec<String>, ToolError>;

    /// Commit the single file at `path`
    fn commit(&self, path: &Path, author: &str, message: &str) -> Result<(), ToolError>;
}

/// What happened to the published copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Publication {
    /// Debug build, nothing published
    NotRequested,
    /// Copied, but other files were dirty so no commit was made
    Copied { destination: PathBuf },
    /// Copied and committed
    Committed { destination: PathBuf },
}

/// Result of the version stamp stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StampOutcome {
    /// No template configured or present
    Disabled,
    /// Template rewritten
    Stamped {
        stamp: VersionStamp,
        publication: Publication,
    },
}

/// Matchers for the two recognized assignments
#[derive(Debug, Clone)]
pub struct StampFields {
    counter_field: String,
    timestamp_field: String,
    counter: Regex,
    timestamp: Regex,
}

impl StampFields {
    /// Matchers for `<counter_field> = <digits>` and `<timestamp_field> = <digits>`
    pub fn new(counter_field: &str, timestamp_field: &str) -> Result<Self, StampError> {
        Ok(Self {
            counter_field: counter_field.to_string(),
            timestamp_field: timestamp_field.to_string(),
            counter: assignment(counter_field)?,
            timestamp: assignment(timestamp_field)?,
        })
    }

    /// Read the stamp currently embedded in `content`
    pub fn read(&self, content: &str, path: &Path) -> Result<VersionStamp, StampError> {
        let build = first_value(&self.counter, content).ok_or_else(|| StampError::MissingField {
            path: path.to_path_buf(),
            field: self.counter_field.clone(),
        })?;
        let timestamp =
            first_value(&self.timestamp, content).ok_or_else(|| StampError::MissingField {
                path: path.to_path_buf(),
                field: self.timestamp_field.clone(),
            })?;
        Ok(VersionStamp { build, timestamp })
    }

    /// Replace the two values line by line, leaving every other byte alone
    pub fn rewrite(&self, content: &str, stamp: VersionStamp) -> String {
        let build = stamp.build.to_string();
        let timestamp = stamp.timestamp.to_string();
        content
            .split_inclusive('\n')
            .map(|line| {
                let line = replace_value(&self.counter, line, &build);
                replace_value(&self.timestamp, &line, &timestamp)
            })
            .collect()
    }
}

fn assignment(field: &str) -> Result<Regex, StampError> {
    let pattern = format!(r"\b({})([ \t]*=[ \t]*)([0-9]+)", regex::escape(field));
    Regex::new(&pattern).map_err(|e| StampError::InvalidField {
        field: field.to_string(),
        error: e.to_string(),
    })
}

fn first_value(re: &Regex, content: &str) -> Option<u64> {
    content
        .lines()
        .find_map(|line| re.captures(line))
        .and_then(|caps| caps[3].parse().ok())
}

fn replace_value(re: &Regex, line: &str, value: &str) -> String {
    re.replacen(line, 1, |caps: &Captures| {
        format!("{}{}{value}", &caps[1], &caps[2])
    })
    .into_owned()
}

/// Run the version stamp stage
///
/// `now` is the stamp time in Unix seconds. Publication happens only for
/// optimized front-end builds.
pub fn stamp_version(
    config: &BuildConfiguration,
    history: &dyn History,
    now: u64,
) -> Result<StampOutcome, StampError> {
    let (Some(version), Some(template)) = (config.version(), config.template_path()) else {
        tracing::info!("Version stamping not configured");
        return Ok(StampOutcome::Disabled);
    };

    if !template.exists() {
        tracing::info!(
            "No version template at {}, skipping stamp",
            template.display()
        );
        return Ok(StampOutcome::Disabled);
    }

    let fields = StampFields::new(&version.counter_field, &version.timestamp_field)?;
    let content = filesystem::read_file(&template)?;
    let previous = fields.read(&content, &template)?;

    let mut build = history.next_build_counter()?;
    if build <= previous.build {
        let next = previous
            .build
            .checked_add(1)
            .ok_or_else(|| StampError::CounterOverflow {
                path: template.clone(),
                previous: previous.build,
            })?;
        tracing::warn!(
            "Build counter {build} does not advance past {}, using {next}",
            previous.build
        );
        build = next;
    }

    let stamp = VersionStamp {
        build,
        timestamp: now,
    };
    filesystem::write_file(&template, fields.rewrite(&content, stamp).as_bytes())?;
    tracing::info!("BUILD {} @ {}", stamp.build, stamp.timestamp);

    let publication = if config.optimize_frontend() {
        publish(config, history, &template, stamp)?
    } else {
        Publication::NotRequested
    };

    Ok(StampOutcome::Stamped { stamp, publication })
}

fn publish(
    config: &BuildConfiguration,
    history: &dyn History,
    template: &Path,
    stamp: VersionStamp,
) -> Result<Publication, StampError> {
    let Some(version) = config.version() else {
        return Ok(Publication::NotRequested);
    };
    let Some(destination) = config.published_template_path() else {
        return Ok(Publication::NotRequested);
    };

    // Check the tree before the copy so the copy itself never counts as dirty.
    let modified = history.modified_files()?;

    filesystem::copy_file(template, &destination)?;
    tracing::info!(
        "COPY {} -> {}",
        template.display(),
        destination.display()
    );

    if !modified.is_empty() {
        tracing::warn!(
            "{} modified file(s) in the working tree, not committing {}",
            modified.len(),
            destination.display()
        );
        return Ok(Publication::Copied { destination });
    }

    let message = version.message.replace("{build}", &stamp.build.to_string());
    history.commit(&destination, &version.author, &message)?;
    Ok(Publication::Committed { destination })
}
