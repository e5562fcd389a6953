//! Locating bundles in a target's build output.

use std::path::{Path, PathBuf};

use glob::Pattern;
use tauri_release_schema::{ArtifactExtension, ArtifactKind, BuildTarget, CanonicalAssetName, NamingContext};
use tracing::{debug, info};

use crate::error::ReleaseError;

/// A bundle found under the build output of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredArtifact {
    pub path: PathBuf,
    pub target: BuildTarget,
    pub extension: ArtifactExtension,
    pub kind: ArtifactKind,
    /// Directories (the macOS `.app`) are archived before upload.
    pub is_dir: bool,
}

impl DiscoveredArtifact {
    /// Name the artifact is uploaded under, including the archive suffix for
    /// directories.
    pub fn asset_name(&self, app_name: &str, app_version: &str) -> CanonicalAssetName {
        let ctx = NamingContext {
            app_name,
            app_version,
            target: self.target,
        };
        let name = CanonicalAssetName::encode(&self.path, &ctx);
        if self.is_dir {
            name.with_compression_suffix()
        } else {
            name
        }
    }
}

/// `<project>/src-tauri/target/<target>/release/bundle`
pub fn bundle_dir(project: &Path, target: BuildTarget) -> PathBuf {
    project
        .join("src-tauri")
        .join("target")
        .join(target.as_str())
        .join("release")
        .join("bundle")
}

/// Find every file or directory under the bundle tree of `target` whose name
/// starts with `app_name` and ends with a known extension.
///
/// Entries inside an already-matched directory are skipped. The result is
/// sorted by path.
///
/// # Errors
///
/// Fails if the pattern cannot be built or an entry cannot be read.
pub fn discover(
    project: &Path,
    target: BuildTarget,
    app_name: &str,
) -> Result<Vec<DiscoveredArtifact>, ReleaseError> {
    if app_name.is_empty() {
        return Err(ReleaseError::Validation("app name must not be empty".to_string()));
    }

    let root = bundle_dir(project, target);
    let pattern = format!(
        "{}/**/{}*",
        Pattern::escape(&root.to_string_lossy()),
        Pattern::escape(app_name)
    );
    debug!(%pattern, "Scanning build output");

    let mut paths = glob::glob(&pattern)?.collect::<Result<Vec<_>, _>>()?;
    paths.sort();

    let mut found: Vec<DiscoveredArtifact> = Vec::new();
    for path in paths {
        if found.iter().any(|a| a.is_dir && path.starts_with(&a.path)) {
            continue;
        }
        let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let Some(extension) = ArtifactExtension::from_filename(&file_name) else {
            continue;
        };
        let is_dir = path.is_dir();
        debug!(path = %path.display(), %extension, is_dir, "Found artifact");
        found.push(DiscoveredArtifact {
            kind: extension.kind(),
            path,
            target,
            extension,
            is_dir,
        });
    }

    info!(build_target = %target, count = found.len(), root = %root.display(), "Discovered artifacts");
    Ok(found)
}
