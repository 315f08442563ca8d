//! Build manifest (armadillo-build.toml) parsing
//!
//! The manifest declares everything the pipeline consumes: ordered source
//! lists, static resources, tool command templates, the pinned dependency
//! and the version template. Source order is load-bearing and is never
//! computed; the manifest is the single place it is written down.
//!
//! When no manifest file exists the built-in defaults describe the
//! Armadillo source tree. In a manifest file, an omitted `[dependency]` or
//! `[version]` section disables that feature.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{defaults, urls};
use crate::error::ConfigError;
use crate::infra::toolchain::CommandTemplate;

/// The build manifest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BuildManifest {
    /// Project layout
    #[serde(default)]
    pub project: ProjectConfig,

    /// Back-end compilation inputs
    #[serde(default)]
    pub backend: BackendConfig,

    /// Front-end inputs
    #[serde(default)]
    pub frontend: FrontendConfig,

    /// Pinned external library checkout
    #[serde(default)]
    pub dependency: Option<DependencyConfig>,

    /// Version stamping
    #[serde(default)]
    pub version: Option<VersionConfig>,
}

/// Project layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Executable and script name
    #[serde(default = "default_product")]
    pub product: String,

    /// Back-end sources directory
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Output root
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Front-end sources directory
    #[serde(default = "default_frontend_dir")]
    pub frontend_dir: String,
}

fn default_product() -> String {
    defaults::PRODUCT_NAME.to_string()
}

fn default_source_dir() -> String {
    defaults::SOURCE_DIR.to_string()
}

fn default_output_dir() -> String {
    defaults::OUTPUT_DIR.to_string()
}

fn default_frontend_dir() -> String {
    defaults::FRONTEND_DIR.to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            product: default_product(),
            source_dir: default_source_dir(),
            output_dir: default_output_dir(),
            frontend_dir: default_frontend_dir(),
        }
    }
}

/// Back-end compilation inputs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Units in compile order; the last one is the entry point
    #[serde(default = "default_backend_sources")]
    pub sources: Vec<String>,

    /// Extension of the compiler's object files
    #[serde(default = "default_object_extension")]
    pub object_extension: String,

    /// Compiler command, run once per unit
    #[serde(default = "default_compile")]
    pub compile: CommandTemplate,

    /// Linker command, run once with every object
    #[serde(default = "default_link")]
    pub link: CommandTemplate,
}

fn default_backend_sources() -> Vec<String> {
    to_strings(defaults::BACKEND_SOURCES)
}

fn default_object_extension() -> String {
    defaults::OBJECT_EXTENSION.to_string()
}

fn default_compile() -> CommandTemplate {
    CommandTemplate::new(defaults::COMPILE_COMMAND.iter().copied())
}

fn default_link() -> CommandTemplate {
    CommandTemplate::new(defaults::LINK_COMMAND.iter().copied())
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            sources: default_backend_sources(),
            object_extension: default_object_extension(),
            compile: default_compile(),
            link: default_link(),
        }
    }
}

/// Front-end inputs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FrontendConfig {
    /// Script units in load order
    #[serde(default = "default_frontend_sources")]
    pub sources: Vec<String>,

    /// Static files copied verbatim into the resource directory
    #[serde(default = "default_resources")]
    pub resources: Vec<String>,

    /// Name of the aggregate stylesheet
    #[serde(default = "default_stylesheet")]
    pub stylesheet: String,

    /// Optimizing bundler command
    #[serde(default = "default_bundle")]
    pub bundle: CommandTemplate,
}

fn default_frontend_sources() -> Vec<String> {
    to_strings(defaults::FRONTEND_SOURCES)
}

fn default_resources() -> Vec<String> {
    to_strings(defaults::FRONTEND_RESOURCES)
}

fn default_stylesheet() -> String {
    defaults::STYLESHEET_NAME.to_string()
}

fn default_bundle() -> CommandTemplate {
    CommandTemplate::new(defaults::BUNDLE_COMMAND.iter().copied())
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            sources: default_frontend_sources(),
            resources: default_resources(),
            stylesheet: default_stylesheet(),
            bundle: default_bundle(),
        }
    }
}

/// Version control system of a pinned checkout
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VcsKind {
    /// Subversion
    #[default]
    Svn,
    /// Git
    Git,
}

impl std::fmt::Display for VcsKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Svn => write!(f, "svn"),
            Self::Git => write!(f, "git"),
        }
    }
}

/// Pinned external library
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DependencyConfig {
    /// Display name, used in generated headers
    pub name: String,

    /// Version control system
    #[serde(default)]
    pub vcs: VcsKind,

    /// Remote repository location
    pub remote: String,

    /// Exact revision to check out
    pub revision: String,

    /// Checkout location, relative to the project root
    pub path: String,

    /// Stylesheet fragments inside the checkout, in aggregation order
    #[serde(default)]
    pub stylesheets: Vec<String>,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            name: urls::CLOSURE_NAME.to_string(),
            vcs: VcsKind::Svn,
            remote: urls::CLOSURE_SVN.to_string(),
            revision: urls::CLOSURE_REV.to_string(),
            path: urls::CLOSURE_DEST.to_string(),
            stylesheets: to_strings(urls::CLOSURE_STYLESHEETS),
        }
    }
}

/// Version stamping
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VersionConfig {
    /// Template file, relative to the project root
    #[serde(default = "default_template")]
    pub template: String,

    /// Command printing the next build counter
    #[serde(default = "default_counter")]
    pub counter: CommandTemplate,

    /// Name of the counter assignment
    #[serde(default = "default_counter_field")]
    pub counter_field: String,

    /// Name of the timestamp assignment
    #[serde(default = "default_timestamp_field")]
    pub timestamp_field: String,

    /// Author of the automated commit
    #[serde(default = "default_author")]
    pub author: String,

    /// Commit message, `{build}` is replaced by the counter
    #[serde(default = "default_message")]
    pub message: String,
}

fn default_template() -> String {
    defaults::VERSION_TEMPLATE.to_string()
}

fn default_counter() -> CommandTemplate {
    CommandTemplate::new(defaults::COUNTER_COMMAND.iter().copied())
}

fn default_counter_field() -> String {
    defaults::COUNTER_FIELD.to_string()
}

fn default_timestamp_field() -> String {
    defaults::TIMESTAMP_FIELD.to_string()
}

fn default_author() -> String {
    defaults::STAMP_AUTHOR.to_string()
}

fn default_message() -> String {
    defaults::STAMP_MESSAGE.to_string()
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            template: default_template(),
            counter: default_counter(),
            counter_field: default_counter_field(),
            timestamp_field: default_timestamp_field(),
            author: default_author(),
            message: default_message(),
        }
    }
}

impl Default for BuildManifest {
    fn default() -> Self {
        Self {
            project: ProjectConfig::default(),
            backend: BackendConfig::default(),
            frontend: FrontendConfig::default(),
            dependency: Some(DependencyConfig::default()),
            version: Some(VersionConfig::default()),
        }
    }
}

impl BuildManifest {
    /// Parse a manifest from TOML
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize the manifest to TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load the manifest at `path`, or the built-in defaults if it is absent
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!(
                "No build manifest at {}, using built-in defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ManifestRead {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|e| ConfigError::ManifestParse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}
