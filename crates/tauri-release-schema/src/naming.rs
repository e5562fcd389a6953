//! Canonical asset names.
//!
//! Every uploaded artifact is renamed so that the build target, app identity
//! and artifact role can be read back from the name alone:
//!
//! ```text
//! <target>.<basename>                                  bundles
//! <target>.<stem>.updater.<ext>                        payloads and signatures
//! <target>.<app>_<version>_<arch><marker><suffix>      macOS .app family
//! ```
//!
//! [`CanonicalAssetName::encode`] and [`decode`] are the only places that know
//! this layout.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::extension::{ArtifactExtension, ArtifactKind, COMPRESS_SUFFIX, SIGNATURE_SUFFIX};
use crate::target::{BuildTarget, TARGET_SEPARATOR};

/// Segment inserted before the extension of payloads and signatures.
pub const UPDATER_MARKER: &str = ".updater";

/// Application identity used when naming artifacts of one build.
#[derive(Debug, Clone, Copy)]
pub struct NamingContext<'a> {
    /// Application name, as it prefixes bundle file names.
    pub app_name: &'a str,
    /// Application version.
    pub app_version: &'a str,
    /// Target the build produced.
    pub target: BuildTarget,
}

/// Upload-ready name of an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalAssetName(String);

impl CanonicalAssetName {
    /// Compute the canonical name for the file at `path` (only its base name
    /// is used).
    ///
    /// Pure: identical inputs always give identical output.
    pub fn encode(path: impl AsRef<Path>, ctx: &NamingContext<'_>) -> Self {
        let basename = path
            .as_ref()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let extension = ArtifactExtension::from_filename(&basename);
        let marker = match extension {
            Some(ext) if ext.kind().is_update_related() => UPDATER_MARKER,
            _ => "",
        };
        let target = ctx.target;

        let name = match extension {
            Some(ext) if ext.is_versionless() => {
                // Keep whatever follows the app name (".app", ".app.tar.gz", ...).
                let suffix = match basename.strip_prefix(ctx.app_name) {
                    Some(rest) if !rest.is_empty() => rest.to_string(),
                    _ => format!(".{ext}"),
                };
                format!(
                    "{target}{TARGET_SEPARATOR}{}_{}_{}{marker}{suffix}",
                    ctx.app_name,
                    ctx.app_version,
                    target.arch_suffix(),
                )
            }
            Some(ext) if !marker.is_empty() => {
                let stem = basename
                    .strip_suffix(ext.as_str())
                    .and_then(|s| s.strip_suffix('.'))
                    .unwrap_or(&basename);
                format!("{target}{TARGET_SEPARATOR}{stem}{marker}.{ext}")
            }
            _ => format!("{target}{TARGET_SEPARATOR}{basename}"),
        };

        Self(name)
    }

    /// Name of the archive produced from a directory artifact.
    #[must_use]
    pub fn with_compression_suffix(&self) -> Self {
        Self(format!("{}{COMPRESS_SUFFIX}", self.0))
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read target and role back out of this name.
    pub fn decode(&self) -> Option<DecodedAssetName> {
        decode(&self.0)
    }
}

impl std::fmt::Display for CanonicalAssetName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalAssetName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Metadata recovered from a canonical asset name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedAssetName {
    /// Target that produced the asset.
    pub target: BuildTarget,
    /// Recognized extension, if any.
    pub extension: Option<ArtifactExtension>,
    /// Role of the asset.
    pub kind: ArtifactKind,
}

/// Decode any asset name; `None` when it carries no known target prefix.
///
/// A payload-shaped extension without the updater marker is an archived
/// bundle directory (e.g. `<t>.app_1.0.0_x64.app.tar.gz`), so its role is
/// taken from the name with the compression suffix removed.
pub fn decode(name: &str) -> Option<DecodedAssetName> {
    let target = BuildTarget::from_asset_name(name)?;
    let extension = ArtifactExtension::from_filename(name);

    let kind = match extension {
        Some(ext) if ext.kind().is_update_related() => {
            let marked = name
                .strip_suffix(ext.as_str())
                .and_then(|s| s.strip_suffix('.'))
                .is_some_and(|stem| stem.ends_with(UPDATER_MARKER));
            match name.strip_suffix(COMPRESS_SUFFIX) {
                Some(bundle) if !marked => ArtifactKind::classify(bundle),
                _ => ext.kind(),
            }
        }
        Some(ext) => ext.kind(),
        None => ArtifactKind::Other,
    };

    Some(DecodedAssetName {
        target,
        extension,
        kind,
    })
}

/// Name of the update payload a signature was produced for.
///
/// Pairing is purely name-derived: the payload is the signature name without
/// its `.sig` suffix.
pub fn payload_name_for_signature(signature_name: &str) -> Option<&str> {
    signature_name.strip_suffix(SIGNATURE_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(target: BuildTarget) -> NamingContext<'static> {
        NamingContext {
            app_name: "xxx",
            app_version: "0.0.18",
            target,
        }
    }

    fn encode(path: &str, target: BuildTarget) -> String {
        CanonicalAssetName::encode(path, &ctx(target)).to_string()
    }

    #[test]
    fn test_macos_versionless_bundle_family() {
        let t = BuildTarget::Aarch64AppleDarwin;
        assert_eq!(
            encode("bundle/macos/xxx.app", t),
            "aarch64-apple-darwin.xxx_0.0.18_aarch64.app"
        );
        assert_eq!(
            encode("bundle/macos/xxx.app.tar.gz", t),
            "aarch64-apple-darwin.xxx_0.0.18_aarch64.updater.app.tar.gz"
        );
        assert_eq!(
            encode("bundle/macos/xxx.app.tar.gz.sig", BuildTarget::X86_64AppleDarwin),
            "x86_64-apple-darwin.xxx_0.0.18_x64.updater.app.tar.gz.sig"
        );
        assert_eq!(
            encode("xxx.app.tar.gz", BuildTarget::UniversalAppleDarwin),
            "universal-apple-darwin.xxx_0.0.18_universal.updater.app.tar.gz"
        );
    }

    #[test]
    fn test_versioned_bundles_are_prefixed_only() {
        assert_eq!(
            encode("bundle/dmg/xxx_0.0.18_aarch64.dmg", BuildTarget::Aarch64AppleDarwin),
            "aarch64-apple-darwin.xxx_0.0.18_aarch64.dmg"
        );
        assert_eq!(
            encode("bundle/nsis/xxx_0.0.18_x64-setup.exe", BuildTarget::X86_64PcWindowsMsvc),
            "x86_64-pc-windows-msvc.xxx_0.0.18_x64-setup.exe"
        );
    }

    #[test]
    fn test_updater_marker_spliced_before_extension() {
        let t = BuildTarget::X86_64PcWindowsMsvc;
        assert_eq!(
            encode("bundle/nsis/xxx_0.0.18_x64-setup.nsis.zip", t),
            "x86_64-pc-windows-msvc.xxx_0.0.18_x64-setup.updater.nsis.zip"
        );
        assert_eq!(
            encode("bundle/msi/xxx_0.0.18_x64_en-US.msi.zip.sig", t),
            "x86_64-pc-windows-msvc.xxx_0.0.18_x64_en-US.updater.msi.zip.sig"
        );
        assert_eq!(
            encode(
                "bundle/appimage/xxx_0.0.18_amd64.AppImage.tar.gz",
                BuildTarget::X86_64UnknownLinuxGnu
            ),
            "x86_64-unknown-linux-gnu.xxx_0.0.18_amd64.updater.AppImage.tar.gz"
        );
    }

    #[test]
    fn test_compression_suffix() {
        let name = CanonicalAssetName::encode("xxx.app", &ctx(BuildTarget::Aarch64AppleDarwin));
        assert_eq!(
            name.with_compression_suffix().as_str(),
            "aarch64-apple-darwin.xxx_0.0.18_aarch64.app.tar.gz"
        );
        let decoded = name.with_compression_suffix().decode().unwrap();
        assert_eq!(decoded.kind, ArtifactKind::AppBundleVersionless);
    }

    #[test]
    fn test_encode_is_idempotent() {
        for target in BuildTarget::ALL {
            for path in ["xxx.app", "xxx_0.0.18_x64-setup.nsis.zip.sig", "xxx.dmg"] {
                assert_eq!(encode(path, target), encode(path, target));
            }
        }
    }

    #[test]
    fn test_target_round_trips_through_name() {
        let samples = [
            "xxx.app",
            "xxx.app.tar.gz",
            "xxx.app.tar.gz.sig",
            "xxx_0.0.18_aarch64.dmg",
            "xxx_0.0.18_x64-setup.exe",
            "xxx_0.0.18_x64-setup.nsis.zip",
            "xxx_0.0.18_x64_en-US.msi",
            "xxx_0.0.18_x64_en-US.msi.zip.sig",
            "xxx_0.0.18_amd64.AppImage",
            "xxx_0.0.18_amd64.AppImage.tar.gz.sig",
        ];
        for target in BuildTarget::ALL {
            for sample in samples {
                let name = CanonicalAssetName::encode(sample, &ctx(target));
                let decoded = name.decode().unwrap();
                assert_eq!(decoded.target, target, "{name}");
                assert_eq!(decoded.kind, ArtifactKind::classify(sample), "{name}");
                assert_eq!(
                    BuildTarget::from_asset_name(name.with_compression_suffix().as_str()),
                    Some(target)
                );
            }
        }
    }

    #[test]
    fn test_signature_pairs_with_payload_name() {
        let sig = encode("xxx.app.tar.gz.sig", BuildTarget::Aarch64AppleDarwin);
        let payload = encode("xxx.app.tar.gz", BuildTarget::Aarch64AppleDarwin);
        assert_eq!(payload_name_for_signature(&sig), Some(payload.as_str()));
        assert_eq!(payload_name_for_signature(&payload), None);
    }

    #[test]
    fn test_decode_rejects_unknown_prefix() {
        assert!(decode("latest.json").is_none());
        assert!(decode("INVALIDaarch64-pc-windows-msvc.x.nsis.zip.sig").is_none());
    }
}
