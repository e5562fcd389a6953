//! Updater manifest reconciliation.
//!
//! Runs after every build job has uploaded. The live asset list of the
//! release is the only input: signatures are indexed by the target encoded in
//! their names, one signature is chosen per platform under the preference
//! policy, and each is paired with the payload whose name is the signature
//! name minus `.sig`. Platforms missing either half are left out.
//!
//! Reconciliation reads only, so it can be re-run at any time.

use std::collections::{BTreeMap, BTreeSet};

use tauri_release_schema::naming::{decode, payload_name_for_signature};
use tauri_release_schema::{
    ArtifactExtension, ArtifactKind, BuildTarget, BundleFamily, Os, Platform, PlatformUpdate,
    UpdaterManifest,
};
use tracing::{debug, info, warn};

use crate::error::ReleaseError;
use crate::host::{Release, ReleaseAsset, ReleaseHost, list_all_release_assets};

/// Which build wins when more than one can serve a platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreferencePolicy {
    /// Serve macOS from the universal build rather than the per-arch one.
    pub prefer_universal: bool,
    /// Serve Windows from the NSIS installer rather than the MSI.
    pub prefer_nsis: bool,
}

/// `preferred` if `flag` is set, else `alternative`, each falling back to the
/// other when absent.
pub fn prefer<T>(preferred: Option<T>, alternative: Option<T>, flag: bool) -> Option<T> {
    if flag {
        preferred.or(alternative)
    } else {
        alternative.or(preferred)
    }
}

/// A signature asset with the extension read from its name.
#[derive(Debug, Clone, Copy)]
struct IndexedSignature<'a> {
    asset: &'a ReleaseAsset,
    extension: Option<ArtifactExtension>,
}

/// Signature assets grouped by the target that produced them, in listing
/// order.
#[derive(Debug, Default)]
pub struct SignatureIndex<'a> {
    by_target: BTreeMap<BuildTarget, Vec<IndexedSignature<'a>>>,
}

impl<'a> SignatureIndex<'a> {
    /// Index every asset whose name decodes to a signature.
    pub fn build(assets: &'a [ReleaseAsset]) -> Self {
        let mut by_target: BTreeMap<BuildTarget, Vec<IndexedSignature<'a>>> = BTreeMap::new();
        for asset in assets {
            let Some(decoded) = decode(&asset.name) else {
                continue;
            };
            if decoded.kind != ArtifactKind::Signature {
                continue;
            }
            by_target.entry(decoded.target).or_default().push(IndexedSignature {
                asset,
                extension: decoded.extension,
            });
        }
        Self { by_target }
    }

    /// Targets with at least one signature.
    pub fn targets(&self) -> impl Iterator<Item = BuildTarget> + '_ {
        self.by_target.keys().copied()
    }

    /// Signature names for `target`, in listing order.
    pub fn names(&self, target: BuildTarget) -> Vec<&'a str> {
        self.entries(target).iter().map(|s| s.asset.name.as_str()).collect()
    }

    fn entries(&self, target: BuildTarget) -> &[IndexedSignature<'a>] {
        self.by_target.get(&target).map(Vec::as_slice).unwrap_or_default()
    }

    fn first(&self, target: BuildTarget) -> Option<&'a ReleaseAsset> {
        self.entries(target).first().map(|s| s.asset)
    }

    fn first_of_family(&self, target: BuildTarget, family: BundleFamily) -> Option<&'a ReleaseAsset> {
        self.entries(target)
            .iter()
            .find(|s| s.extension.is_some_and(|ext| ext.family() == family))
            .map(|s| s.asset)
    }

    /// Every platform some indexed target can serve.
    pub fn covered_platforms(&self) -> BTreeSet<Platform> {
        self.targets()
            .flat_map(|target| target.platforms().iter().copied())
            .collect()
    }

    /// The signature that should serve `platform`, if any.
    pub fn select(&self, platform: Platform, policy: PreferencePolicy) -> Option<&'a ReleaseAsset> {
        let specific = platform.specific_target();
        match platform.os() {
            Os::Darwin => prefer(
                self.first(BuildTarget::UniversalAppleDarwin),
                self.first(specific),
                policy.prefer_universal,
            ),
            Os::Windows => prefer(
                self.first_of_family(specific, BundleFamily::Nsis),
                self.first_of_family(specific, BundleFamily::Msi),
                policy.prefer_nsis,
            ),
            Os::Linux => self.first(specific),
        }
    }
}

/// The asset a signature was produced for.
pub fn payload_for_signature<'a>(
    assets: &'a [ReleaseAsset],
    signature: &ReleaseAsset,
) -> Option<&'a ReleaseAsset> {
    let payload_name = payload_name_for_signature(&signature.name)?;
    assets.iter().find(|a| a.name == payload_name)
}

/// A platform's chosen payload and signature assets, before the signature
/// content is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemiManifestEntry {
    pub payload: ReleaseAsset,
    pub signature: ReleaseAsset,
}

/// Selected asset pairs per platform.
pub type SemiManifest = BTreeMap<Platform, SemiManifestEntry>;

/// Pick a payload and signature for every platform the assets can serve.
pub fn assemble_semi_manifest(assets: &[ReleaseAsset], policy: PreferencePolicy) -> SemiManifest {
    let index = SignatureIndex::build(assets);
    let mut semi = SemiManifest::new();

    for platform in index.covered_platforms() {
        let Some(signature) = index.select(platform, policy) else {
            warn!(%platform, "No selectable signature for platform");
            continue;
        };
        let Some(payload) = payload_for_signature(assets, signature) else {
            warn!(%platform, signature = %signature.name, "Signature has no matching update payload");
            continue;
        };
        debug!(%platform, payload = %payload.name, signature = %signature.name, "Selected update");
        semi.insert(
            platform,
            SemiManifestEntry {
                payload: payload.clone(),
                signature: signature.clone(),
            },
        );
    }
    semi
}

/// Fields of the manifest that do not come from the assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestMeta {
    pub version: String,
    pub notes: String,
    /// RFC 3339 timestamp.
    pub pub_date: String,
}

/// Fetch each selected signature and build the final manifest.
///
/// # Errors
///
/// Any failed signature fetch aborts; no partial manifest is returned.
pub async fn resolve_manifest<H: ReleaseHost + ?Sized>(
    host: &H,
    semi: SemiManifest,
    meta: ManifestMeta,
) -> Result<UpdaterManifest, ReleaseError> {
    let mut manifest = UpdaterManifest::new(meta.version, meta.notes, meta.pub_date);
    for (platform, entry) in semi {
        let signature = host
            .fetch_asset_text(&entry.signature.url)
            .await
            .map_err(|e| ReleaseError::host(format!("Failed to fetch signature {}", entry.signature.name), e))?;
        if signature.trim().is_empty() {
            warn!(%platform, signature = %entry.signature.name, "Signature file is empty, skipping platform");
            continue;
        }
        manifest.platforms.insert(
            platform,
            PlatformUpdate {
                url: entry.payload.url,
                signature,
            },
        );
    }
    Ok(manifest)
}

/// List the release's assets and reconcile them into a manifest.
///
/// # Errors
///
/// Propagates listing and signature fetch failures.
pub async fn reconcile<H: ReleaseHost + ?Sized>(
    host: &H,
    release_id: u64,
    policy: PreferencePolicy,
    meta: ManifestMeta,
) -> Result<UpdaterManifest, ReleaseError> {
    let assets = list_all_release_assets(host, release_id)
        .await
        .map_err(|e| ReleaseError::host(format!("Failed to list assets of release {release_id}"), e))?;
    info!(release_id, assets = assets.len(), ?policy, "Reconciling updater manifest");

    let semi = assemble_semi_manifest(&assets, policy);
    let manifest = resolve_manifest(host, semi, meta).await?;
    info!(platforms = manifest.platforms.len(), "Assembled updater manifest");
    Ok(manifest)
}

/// Upload `manifest` to `release` as `name`, replacing a previous asset of
/// the same name.
///
/// # Errors
///
/// Propagates serialization and host failures.
pub async fn publish_manifest<H: ReleaseHost + ?Sized>(
    host: &H,
    release: &Release,
    name: &str,
    manifest: &UpdaterManifest,
) -> Result<ReleaseAsset, ReleaseError> {
    let body = serde_json::to_vec(manifest).map_err(|e| ReleaseError::context("Serializing manifest", e))?;

    let existing = list_all_release_assets(host, release.id)
        .await
        .map_err(|e| ReleaseError::host(format!("Failed to list assets of release {}", release.id), e))?;
    for asset in existing.iter().filter(|a| a.name == name) {
        info!(name, id = asset.id, "Replacing existing manifest asset");
        host.delete_release_asset(asset.id)
            .await
            .map_err(|e| ReleaseError::host(format!("Failed to delete asset {name}"), e))?;
    }

    info!(name, release = release.id, bytes = body.len(), "Uploading updater manifest");
    host.upload_release_asset(release, name, body)
        .await
        .map_err(|e| ReleaseError::host(format!("Failed to upload {name}"), e))
}
