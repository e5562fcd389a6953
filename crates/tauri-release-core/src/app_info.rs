//! Application identity from the Tauri crate's `Cargo.toml`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ReleaseError;

/// Name and version the bundler stamps into artifact file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub name: String,
    pub version: semver::Version,
}

#[derive(Deserialize)]
struct CargoManifest {
    package: Option<PackageSection>,
}

#[derive(Deserialize)]
struct PackageSection {
    name: Option<String>,
    version: Option<String>,
}

/// `<project>/src-tauri/Cargo.toml`
pub fn manifest_path(project: &Path) -> PathBuf {
    project.join("src-tauri").join("Cargo.toml")
}

impl AppInfo {
    /// Read the app info of the Tauri project rooted at `project`.
    ///
    /// # Errors
    ///
    /// Fails if the manifest is missing or malformed, or lacks a package
    /// name or a semver version.
    pub fn read(project: &Path) -> Result<Self, ReleaseError> {
        let path = manifest_path(project);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ReleaseError::context("Cannot read project manifest", format!("{}: {e}", path.display())))?;
        Self::parse(&content)
    }

    /// Parse app info from `Cargo.toml` content.
    ///
    /// # Errors
    ///
    /// See [`AppInfo::read`].
    pub fn parse(content: &str) -> Result<Self, ReleaseError> {
        let manifest: CargoManifest = toml::from_str(content)?;
        let package = manifest
            .package
            .ok_or_else(|| ReleaseError::Validation("Cargo.toml has no [package] section".to_string()))?;

        let name = package.name.unwrap_or_default();
        if name.trim().is_empty() {
            return Err(ReleaseError::Validation("package name is missing".to_string()));
        }
        let raw_version = package
            .version
            .ok_or_else(|| ReleaseError::Validation("package version is missing".to_string()))?;
        let version = semver::Version::parse(&raw_version)
            .map_err(|e| ReleaseError::Validation(format!("invalid package version {raw_version:?}: {e}")))?;

        Ok(Self { name, version })
    }
}
