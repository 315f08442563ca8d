//! Pipeline driver
//!
//! Runs the stages in fixed order:
//!
//! ```text
//! Compile -> Dependencies -> Resources -> VersionStamp -> Assemble
//! ```
//!
//! `backend_only` skips everything after `Compile`; `frontend_only` skips
//! `Compile`. `Dependencies` is also skipped when no dependency is declared.
//! Every stage blocks until its tools exit, and the first failure ends the
//! run without starting any later stage.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::core::artifacts::{collect_artifacts, BuildReport, StageRecord};
use crate::core::assemble::assemble_frontend;
use crate::core::compile::compile_backend;
use crate::core::config::BuildConfiguration;
use crate::core::manifest::VcsKind;
use crate::core::resources::bundle_resources;
use crate::core::stamp::{stamp_version, StampOutcome};
use crate::core::sync::{synchronize, DependencyPin, SyncOutcome};
use crate::error::{
    AssembleError, CompileError, PipelineError, ResourceError, StageError, SyncError, ToolError,
};
use crate::infra::git::{GitCheckout, GitHistory};
use crate::infra::process::ToolRunner;
use crate::infra::svn::SvnCheckout;

/// One ordered phase of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Compile and link the back-end
    Compile,
    /// Synchronize the pinned dependency checkout
    Dependencies,
    /// Rebuild the resource directory
    Resources,
    /// Rewrite (and maybe publish) the version template
    VersionStamp,
    /// Produce the front-end script
    Assemble,
}

impl Stage {
    /// All stages in execution order
    pub const ALL: [Stage; 5] = [
        Stage::Compile,
        Stage::Dependencies,
        Stage::Resources,
        Stage::VersionStamp,
        Stage::Assemble,
    ];

    /// Short name, identical to the serialized form
    pub fn name(self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Dependencies => "dependencies",
            Self::Resources => "resources",
            Self::VersionStamp => "version_stamp",
            Self::Assemble => "assemble",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Receives stage transitions as the pipeline runs
pub trait PipelineObserver {
    fn stage_started(&mut self, _stage: Stage) {}
    fn stage_finished(&mut self, _stage: Stage, _elapsed: Duration) {}
    fn stage_skipped(&mut self, _stage: Stage) {}
    fn stage_failed(&mut self, _stage: Stage) {}
}

/// Observer that ignores everything
#[derive(Debug, Default)]
pub struct SilentObserver;

impl PipelineObserver for SilentObserver {}

/// Current time in Unix seconds
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn first_missing(mut paths: impl Iterator<Item = PathBuf>) -> Option<PathBuf> {
    paths.find(|p| !p.is_file())
}

/// The build pipeline for one configuration
pub struct Pipeline<'a> {
    config: &'a BuildConfiguration,
    runner: &'a dyn ToolRunner,
    clock: fn() -> u64,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a BuildConfiguration, runner: &'a dyn ToolRunner) -> Self {
        Self {
            config,
            runner,
            clock: unix_now,
        }
    }

    /// Use `clock` for the version timestamp
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    /// Whether `stage` runs under this configuration
    pub fn is_selected(&self, stage: Stage) -> bool {
        match stage {
            Stage::Compile => self.config.runs_backend(),
            Stage::Dependencies => {
                self.config.runs_frontend() && self.config.dependency().is_some()
            }
            Stage::Resources | Stage::VersionStamp | Stage::Assemble => {
                self.config.runs_frontend()
            }
        }
    }

    /// Programs the selected stages will invoke, in first-use order
    pub fn required_tools(&self) -> Vec<String> {
        let manifest = self.config.manifest();
        let mut tools: Vec<&str> = Vec::new();

        if self.is_selected(Stage::Compile) {
            tools.extend(manifest.backend.compile.program());
            tools.extend(manifest.backend.link.program());
        }
        if self.is_selected(Stage::Dependencies) {
            if let Some(dependency) = self.config.dependency() {
                tools.push(match dependency.vcs {
                    VcsKind::Svn => "svn",
                    VcsKind::Git => "git",
                });
            }
        }
        if self.is_selected(Stage::VersionStamp)
            && self.config.template_path().is_some_and(|t| t.exists())
        {
            if let Some(version) = self.config.version() {
                tools.extend(version.counter.program());
            }
            if self.config.optimize_frontend() {
                tools.push("git");
            }
        }
        if self.is_selected(Stage::Assemble) && self.config.optimize_frontend() {
            tools.extend(manifest.frontend.bundle.program());
        }

        let mut unique: Vec<String> = Vec::new();
        for tool in tools {
            if !unique.iter().any(|t| t == tool) {
                unique.push(tool.to_string());
            }
        }
        unique
    }

    /// Verify every required tool resolves before anything is written
    pub fn preflight(&self) -> Result<(), ToolError> {
        for tool in self.required_tools() {
            let path = self.runner.locate(&tool, self.config.project_root())?;
            tracing::debug!("found {tool} at {}", path.display());
        }
        Ok(())
    }

    /// Verify the declared inputs of every selected stage exist
    ///
    /// A missing input is reported against the stage that reads it, before
    /// any stage has run. Stylesheet fragments are left to the resource
    /// stage since the dependency stage may still move the checkout, and a
    /// published template is exempt when the stamp stage writes it.
    pub fn check_inputs(&self) -> Result<(), PipelineError> {
        let manifest = self.config.manifest();

        if self.is_selected(Stage::Compile) {
            let units = manifest.backend.sources.iter();
            if let Some(path) = first_missing(units.map(|u| self.config.source_root().join(u))) {
                return Err(PipelineError::Stage {
                    stage: Stage::Compile,
                    source: CompileError::MissingSource { path }.into(),
                });
            }
        }

        if self.is_selected(Stage::Resources) {
            let statics = manifest.frontend.resources.iter();
            if let Some(path) = first_missing(statics.map(|r| self.config.frontend_root().join(r))) {
                return Err(PipelineError::Stage {
                    stage: Stage::Resources,
                    source: ResourceError::MissingSource { path }.into(),
                });
            }
        }

        if self.is_selected(Stage::Assemble) {
            let published = if self.publishes_template() {
                self.config.published_template_path()
            } else {
                None
            };
            let units = manifest
                .frontend
                .sources
                .iter()
                .map(|u| self.config.frontend_root().join(u))
                .filter(|p| published.as_ref() != Some(p));
            if let Some(path) = first_missing(units) {
                return Err(PipelineError::Stage {
                    stage: Stage::Assemble,
                    source: AssembleError::MissingSource { path }.into(),
                });
            }
        }

        Ok(())
    }

    /// Whether the stamp stage will write the published template
    fn publishes_template(&self) -> bool {
        self.is_selected(Stage::VersionStamp)
            && self.config.optimize_frontend()
            && self.config.template_path().is_some_and(|t| t.exists())
    }

    /// Run every selected stage in order
    pub fn run(&self, observer: &mut dyn PipelineObserver) -> Result<BuildReport, PipelineError> {
        self.preflight().map_err(PipelineError::Preflight)?;
        self.check_inputs()?;

        let mut report = BuildReport::default();
        let mut executable: Option<PathBuf> = None;
        let mut script: Option<PathBuf> = None;

        for stage in Stage::ALL {
            if !self.is_selected(stage) {
                tracing::debug!("skipping stage {stage}");
                observer.stage_skipped(stage);
                report.stages.push(StageRecord::skipped(stage));
                continue;
            }

            tracing::info!("=== {stage} ===");
            observer.stage_started(stage);
            let started = Instant::now();

            let result: Result<(), StageError> = match stage {
                Stage::Compile => compile_backend(self.config, self.runner)
                    .map(|path| executable = Some(path))
                    .map_err(Into::into),
                Stage::Dependencies => self
                    .sync_dependencies()
                    .map(|outcome| report.sync = outcome)
                    .map_err(Into::into),
                Stage::Resources => bundle_resources(self.config)
                    .map(|summary| {
                        tracing::debug!("copied {} resource(s)", summary.copied.len());
                        if let Some(css) = &summary.stylesheet {
                            tracing::debug!("aggregated stylesheet at {}", css.display());
                        }
                    })
                    .map_err(Into::into),
                Stage::VersionStamp => self
                    .stamp()
                    .map(|outcome| report.stamp = Some(outcome))
                    .map_err(Into::into),
                Stage::Assemble => assemble_frontend(self.config, self.runner)
                    .map(|path| script = Some(path))
                    .map_err(Into::into),
            };

            if let Err(source) = result {
                tracing::debug!("stage {stage} failed");
                observer.stage_failed(stage);
                return Err(PipelineError::Stage { stage, source });
            }

            let elapsed = started.elapsed();
            observer.stage_finished(stage, elapsed);
            report.stages.push(StageRecord::completed(stage, elapsed));
        }

        let resource_dir = self.config.runs_frontend().then(|| self.config.resource_dir());
        report.artifacts = collect_artifacts(
            executable.as_deref(),
            resource_dir.as_deref(),
            script.as_deref(),
        )?;

        Ok(report)
    }

    fn sync_dependencies(&self) -> Result<Option<SyncOutcome>, SyncError> {
        let Some(dependency) = self.config.dependency() else {
            return Ok(None);
        };
        let pin = DependencyPin::from_config(dependency, self.config.project_root());
        let outcome = match dependency.vcs {
            VcsKind::Svn => synchronize(&pin, &SvnCheckout::new(self.runner))?,
            VcsKind::Git => synchronize(&pin, &GitCheckout::new(self.runner))?,
        };
        Ok(Some(outcome))
    }

    fn stamp(&self) -> Result<StampOutcome, crate::error::StampError> {
        let Some(version) = self.config.version() else {
            return Ok(StampOutcome::Disabled);
        };
        let history = GitHistory::new(
            self.runner,
            self.config.project_root(),
            version.counter.clone(),
        );
        stamp_version(self.config, &history, (self.clock)())
    }
}
