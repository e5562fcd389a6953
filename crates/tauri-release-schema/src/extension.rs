//! Artifact extension taxonomy.
//!
//! Bundlers emit one of a handful of compound extensions per installer
//! family. Each family has an app form, an update-payload form (the app form
//! plus a compression suffix) and a signature form (the payload form plus
//! `.sig`). Classification is by longest matching suffix so that `app`,
//! `app.tar.gz` and `app.tar.gz.sig` never collide.

use serde::{Deserialize, Serialize};

/// Suffix that marks a detached signature.
pub const SIGNATURE_SUFFIX: &str = ".sig";

/// Suffix appended to directory artifacts after they are archived.
pub const COMPRESS_SUFFIX: &str = ".tar.gz";

/// Installer family an extension belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BundleFamily {
    /// Linux AppImage.
    AppImage,
    /// macOS `.app` bundle (directory, shipped without version in its name).
    MacApp,
    /// macOS disk image.
    Dmg,
    /// Windows NSIS installer.
    Nsis,
    /// Windows MSI installer.
    Msi,
}

/// Role a file plays in the release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// An installable bundle whose file name already carries the version.
    AppBundle,
    /// The macOS `.app` bundle, named after the app only.
    AppBundleVersionless,
    /// Compressed bundle consumed by the auto-updater.
    UpdatePayload,
    /// Detached signature over an update payload.
    Signature,
    /// Anything not in the taxonomy.
    Other,
}

impl ArtifactKind {
    /// Classify a file name by its longest known extension.
    pub fn classify(filename: &str) -> Self {
        ArtifactExtension::from_filename(filename).map_or(Self::Other, |ext| ext.kind())
    }

    /// Whether canonical names for this kind carry the `.updater` marker.
    pub fn is_update_related(&self) -> bool {
        matches!(self, Self::UpdatePayload | Self::Signature)
    }
}

/// A known compound extension (without the leading dot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactExtension {
    /// `AppImage`
    AppImage,
    /// `AppImage.tar.gz`
    AppImageTarGz,
    /// `AppImage.tar.gz.sig`
    AppImageTarGzSig,
    /// `app`
    App,
    /// `app.tar.gz`
    AppTarGz,
    /// `app.tar.gz.sig`
    AppTarGzSig,
    /// `dmg`
    Dmg,
    /// `exe`
    Exe,
    /// `nsis.zip`
    NsisZip,
    /// `nsis.zip.sig`
    NsisZipSig,
    /// `msi`
    Msi,
    /// `msi.zip`
    MsiZip,
    /// `msi.zip.sig`
    MsiZipSig,
}

impl ArtifactExtension {
    /// The full taxonomy, grouped by family.
    pub const ALL: [Self; 13] = [
        // Linux
        Self::AppImage,
        Self::AppImageTarGz,
        Self::AppImageTarGzSig,
        // macOS
        Self::App,
        Self::AppTarGz,
        Self::AppTarGzSig,
        Self::Dmg,
        // Windows NSIS
        Self::Exe,
        Self::NsisZip,
        Self::NsisZipSig,
        // Windows MSI
        Self::Msi,
        Self::MsiZip,
        Self::MsiZipSig,
    ];

    /// Extension text without the leading dot.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AppImage => "AppImage",
            Self::AppImageTarGz => "AppImage.tar.gz",
            Self::AppImageTarGzSig => "AppImage.tar.gz.sig",
            Self::App => "app",
            Self::AppTarGz => "app.tar.gz",
            Self::AppTarGzSig => "app.tar.gz.sig",
            Self::Dmg => "dmg",
            Self::Exe => "exe",
            Self::NsisZip => "nsis.zip",
            Self::NsisZipSig => "nsis.zip.sig",
            Self::Msi => "msi",
            Self::MsiZip => "msi.zip",
            Self::MsiZipSig => "msi.zip.sig",
        }
    }

    /// Installer family.
    pub fn family(&self) -> BundleFamily {
        match self {
            Self::AppImage | Self::AppImageTarGz | Self::AppImageTarGzSig => BundleFamily::AppImage,
            Self::App | Self::AppTarGz | Self::AppTarGzSig => BundleFamily::MacApp,
            Self::Dmg => BundleFamily::Dmg,
            Self::Exe | Self::NsisZip | Self::NsisZipSig => BundleFamily::Nsis,
            Self::Msi | Self::MsiZip | Self::MsiZipSig => BundleFamily::Msi,
        }
    }

    /// Role of files carrying this extension.
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Self::AppImageTarGzSig | Self::AppTarGzSig | Self::NsisZipSig | Self::MsiZipSig => {
                ArtifactKind::Signature
            }
            Self::AppImageTarGz | Self::AppTarGz | Self::NsisZip | Self::MsiZip => {
                ArtifactKind::UpdatePayload
            }
            Self::App => ArtifactKind::AppBundleVersionless,
            Self::AppImage | Self::Dmg | Self::Exe | Self::Msi => ArtifactKind::AppBundle,
        }
    }

    /// True when the bundler leaves the version and arch out of the file name.
    pub fn is_versionless(&self) -> bool {
        self.family() == BundleFamily::MacApp
    }

    /// Longest known extension that `filename` ends with, dot included.
    pub fn from_filename(filename: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .filter(|ext| {
                filename
                    .strip_suffix(ext.as_str())
                    .is_some_and(|stem| stem.ends_with('.'))
            })
            .max_by_key(|ext| ext.as_str().len())
    }
}

impl std::fmt::Display for ArtifactExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
