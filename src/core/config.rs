//! Run configuration
//!
//! A [`BuildConfiguration`] is assembled once per run from the command-line
//! run-mode flags and the build manifest, validated, and then passed by
//! reference to every pipeline component. Nothing reads ambient state.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::config::defaults;
use crate::core::manifest::{BuildManifest, DependencyConfig, VersionConfig};
use crate::error::ConfigError;

/// Run-mode selection from the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunMode {
    /// Run only the back-end compile stage
    pub backend_only: bool,
    /// Run only the front-end stages
    pub frontend_only: bool,
    /// Bundle the front-end with the optimizing bundler and publish the stamp
    pub optimize_frontend: bool,
}

/// Immutable configuration for one pipeline run
#[derive(Debug, Clone)]
pub struct BuildConfiguration {
    mode: RunMode,
    project_root: PathBuf,
    source_root: PathBuf,
    output_root: PathBuf,
    frontend_root: PathBuf,
    manifest: BuildManifest,
}

impl BuildConfiguration {
    /// Validate `mode` and `manifest` against the project at `project_root`
    pub fn new(
        project_root: &Path,
        mut manifest: BuildManifest,
        mode: RunMode,
    ) -> Result<Self, ConfigError> {
        if mode.backend_only && mode.frontend_only {
            return Err(ConfigError::ConflictingRunModes);
        }

        let run_backend = !mode.frontend_only;
        let run_frontend = !mode.backend_only;

        if run_backend {
            if manifest.backend.sources.is_empty() {
                return Err(ConfigError::EmptyBackendSources);
            }
            check_unique("[backend].sources", &manifest.backend.sources)?;
            check_objects(&manifest.backend.sources)?;
            require_program("backend.compile", manifest.backend.compile.program())?;
            require_program("backend.link", manifest.backend.link.program())?;
        }

        if run_frontend {
            check_unique("[frontend].sources", &manifest.frontend.sources)?;
            check_unique("[frontend].resources", &manifest.frontend.resources)?;
            if mode.optimize_frontend {
                require_program("frontend.bundle", manifest.frontend.bundle.program())?;
            }
            if let Some(version) = &manifest.version {
                if !version.template.ends_with(defaults::TEMPLATE_SUFFIX) {
                    return Err(ConfigError::MalformedTemplatePath {
                        path: PathBuf::from(&version.template),
                    });
                }
                require_program("version.counter", version.counter.program())?;
            }
        }

        // Tool paths are relative to the project, not to each stage's cwd.
        let backend = &mut manifest.backend;
        backend.compile = std::mem::take(&mut backend.compile).rooted_at(project_root);
        backend.link = std::mem::take(&mut backend.link).rooted_at(project_root);
        let frontend = &mut manifest.frontend;
        frontend.bundle = std::mem::take(&mut frontend.bundle).rooted_at(project_root);
        if let Some(version) = manifest.version.as_mut() {
            version.counter = std::mem::take(&mut version.counter).rooted_at(project_root);
        }

        let project = &manifest.project;
        Ok(Self {
            mode,
            source_root: project_root.join(&project.source_dir),
            output_root: project_root.join(&project.output_dir),
            frontend_root: project_root.join(&project.frontend_dir),
            project_root: project_root.to_path_buf(),
            manifest,
        })
    }

    /// Run-mode flags
    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Whether the back-end stage group runs
    pub fn runs_backend(&self) -> bool {
        !self.mode.frontend_only
    }

    /// Whether the front-end stage group runs
    pub fn runs_frontend(&self) -> bool {
        !self.mode.backend_only
    }

    /// Whether the front-end is bundled by the optimizing bundler
    pub fn optimize_frontend(&self) -> bool {
        self.mode.optimize_frontend
    }

    /// The declared inputs
    pub fn manifest(&self) -> &BuildManifest {
        &self.manifest
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn frontend_root(&self) -> &Path {
        &self.frontend_root
    }

    /// `outputRoot/<product>`
    pub fn executable_path(&self) -> PathBuf {
        self.output_root.join(&self.manifest.project.product)
    }

    /// Object file for back-end unit `unit`, named after its file stem
    pub fn object_path(&self, unit: &str) -> PathBuf {
        self.output_root.join(format!(
            "{}.{}",
            object_stem(unit),
            self.manifest.backend.object_extension
        ))
    }

    /// `outputRoot/fe`
    pub fn resource_dir(&self) -> PathBuf {
        self.output_root.join(defaults::RESOURCE_DIR)
    }

    /// `outputRoot/fe/<product>.js`
    pub fn script_path(&self) -> PathBuf {
        self.resource_dir()
            .join(format!("{}.js", self.manifest.project.product))
    }

    /// Pinned dependency, if configured
    pub fn dependency(&self) -> Option<&DependencyConfig> {
        self.manifest.dependency.as_ref()
    }

    /// Absolute checkout location of the pinned dependency
    pub fn dependency_path(&self) -> Option<PathBuf> {
        self.dependency().map(|d| self.project_root.join(&d.path))
    }

    /// Version stamping settings, if configured
    pub fn version(&self) -> Option<&VersionConfig> {
        self.manifest.version.as_ref()
    }

    /// Absolute path of the version template
    pub fn template_path(&self) -> Option<PathBuf> {
        self.version().map(|v| self.project_root.join(&v.template))
    }

    /// Template path with its `.proto` suffix removed
    pub fn published_template_path(&self) -> Option<PathBuf> {
        self.version().and_then(|v| {
            v.template
                .strip_suffix(defaults::TEMPLATE_SUFFIX)
                .map(|p| self.project_root.join(p))
        })
    }
}

fn check_unique(list: &str, units: &[String]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for unit in units {
        if !seen.insert(unit.as_str()) {
            return Err(ConfigError::DuplicateSource {
                list: list.to_string(),
                unit: unit.clone(),
            });
        }
    }
    Ok(())
}

fn object_stem(unit: &str) -> String {
    Path::new(unit)
        .file_stem()
        .map_or_else(|| unit.to_string(), |s| s.to_string_lossy().into_owned())
}

/// Objects land flat in the output root, so stems must be unique
fn check_objects(units: &[String]) -> Result<(), ConfigError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for unit in units {
        if let Some(first) = seen.insert(object_stem(unit), unit.as_str()) {
            return Err(ConfigError::ObjectCollision {
                first: first.to_string(),
                second: unit.clone(),
            });
        }
    }
    Ok(())
}

fn require_program(name: &str, program: Option<&str>) -> Result<(), ConfigError> {
    match program {
        Some(p) if !p.is_empty() => Ok(()),
        _ => Err(ConfigError::EmptyCommand {
            name: name.to_string(),
        }),
    }
}
