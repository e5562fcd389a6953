//! Shared types for the Tauri release pipeline.
//!
//! Everything here is pure data: the build-target and platform tables, the
//! artifact extension taxonomy, the canonical asset naming scheme and the
//! updater manifest wire format. No I/O happens in this crate.

/// Artifact extension taxonomy.
pub mod extension;
/// Updater manifest wire types.
pub mod manifest;
/// Canonical asset naming.
pub mod naming;
/// Build targets and update platforms.
pub mod target;

// Re-exports
pub use extension::{ArtifactExtension, ArtifactKind, BundleFamily, COMPRESS_SUFFIX, SIGNATURE_SUFFIX};
pub use manifest::{PlatformUpdate, UpdaterManifest, default_notes};
pub use naming::{CanonicalAssetName, DecodedAssetName, NamingContext, UPDATER_MARKER};
pub use target::{Arch, BuildTarget, Os, Platform, TargetError};
