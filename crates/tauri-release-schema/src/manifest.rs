//! Updater manifest wire format.
//!
//! This is the JSON document the desktop auto-updater downloads. Key names
//! (`version`, `notes`, `pub_date`, `platforms`, `url`, `signature`) are a
//! compatibility contract and must not change.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::target::Platform;

/// Download location and signature text for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformUpdate {
    /// URL of the update payload.
    pub url: String,
    /// Content of the detached signature file.
    pub signature: String,
}

/// The published update descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdaterManifest {
    /// Application version the manifest describes.
    pub version: String,
    /// Human-readable release notes.
    pub notes: String,
    /// Publication timestamp (RFC 3339).
    pub pub_date: String,
    /// Per-platform payloads; a platform is present only if fully resolved.
    pub platforms: BTreeMap<Platform, PlatformUpdate>,
}

impl UpdaterManifest {
    /// Manifest with no platforms yet.
    pub fn new(version: impl Into<String>, notes: impl Into<String>, pub_date: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            notes: notes.into(),
            pub_date: pub_date.into(),
            platforms: BTreeMap::new(),
        }
    }
}

/// Release notes used when none are supplied.
pub fn default_notes(version: &str) -> String {
    format!("Version {version} brings enhancements and bug fixes for improved performance and stability.")
}
