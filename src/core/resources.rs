//! Front-end resource bundling
//!
//! Rebuilds `outputRoot/fe` from scratch: every declared static resource is
//! copied verbatim, and the dependency's stylesheet fragments are
//! concatenated into one aggregate stylesheet with a provenance header in
//! front of each fragment.

use std::path::{Path, PathBuf};

use crate::core::config::BuildConfiguration;
use crate::error::ResourceError;
use crate::infra::filesystem;

/// Files written by the resource stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSummary {
    /// Verbatim copies, in declared order
    pub copied: Vec<PathBuf>,
    /// Aggregate stylesheet, when a dependency declares fragments
    pub stylesheet: Option<PathBuf>,
}

/// Run the resource stage
pub fn bundle_resources(config: &BuildConfiguration) -> Result<ResourceSummary, ResourceError> {
    let statics: Vec<PathBuf> = config
        .manifest()
        .frontend
        .resources
        .iter()
        .map(|r| config.frontend_root().join(r))
        .collect();

    let fragments: Vec<PathBuf> = match (config.dependency(), config.dependency_path()) {
        (Some(dependency), Some(checkout)) => dependency
            .stylesheets
            .iter()
            .map(|f| checkout.join(f))
            .collect(),
        _ => Vec::new(),
    };

    // Refuse before touching the output so a broken manifest leaves the
    // previous resource directory in place.
    if let Some(missing) = statics.iter().chain(&fragments).find(|p| !p.is_file()) {
        return Err(ResourceError::MissingSource {
            path: missing.clone(),
        });
    }

    let dest = config.resource_dir();
    filesystem::remove_dir_all(&dest)?;
    filesystem::create_dir_all(&dest)?;

    let mut summary = ResourceSummary::default();
    for source in &statics {
        let Some(name) = source.file_name() else {
            return Err(ResourceError::MissingSource {
                path: source.clone(),
            });
        };
        let target = dest.join(name);
        tracing::info!("COPY {}", source.display());
        filesystem::copy_file(source, &target)?;
        summary.copied.push(target);
    }

    if let Some(dependency) = config.dependency() {
        if !fragments.is_empty() {
            let target = dest.join(&config.manifest().frontend.stylesheet);
            let css = aggregate_stylesheet(&dependency.name, &fragments, config.project_root())?;
            filesystem::write_file(&target, css.as_bytes())?;
            summary.stylesheet = Some(target);
        }
    }

    Ok(summary)
}

/// Concatenate `fragments` behind a generated header, each preceded by a
/// comment naming its path relative to `root`
pub fn aggregate_stylesheet(
    name: &str,
    fragments: &[PathBuf],
    root: &Path,
) -> Result<String, ResourceError> {
    let mut css = format!("/*=== Generated Resources for {name} ===*/");
    for fragment in fragments {
        let origin = fragment.strip_prefix(root).unwrap_or(fragment);
        tracing::info!("COPY {}", origin.display());
        let content = filesystem::read_file(fragment)?;
        css.push_str(&format!("\n\n/*=== File: {} ===*/\n", origin.display()));
        css.push_str(&content);
    }
    Ok(css)
}
