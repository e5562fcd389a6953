//! Naming, validating and uploading one job's artifacts.
//!
//! Checks run strictly before side effects: the artifact count and name
//! uniqueness are verified before anything is compressed, and everything is
//! compressed before the first upload. Uploads are sequential and the first
//! failure aborts the batch.

use std::collections::HashMap;
use std::path::PathBuf;

use tauri_release_schema::CanonicalAssetName;
use tracing::info;

use super::compress::compress_directory;
use super::discovery::DiscoveredArtifact;
use crate::error::ReleaseError;
use crate::host::{Release, ReleaseAsset, ReleaseHost};

/// An artifact and the name it will be uploaded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpload {
    pub artifact: DiscoveredArtifact,
    pub asset_name: CanonicalAssetName,
}

/// A file ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedArtifact {
    /// The archive for directories, otherwise the artifact itself.
    pub upload_path: PathBuf,
    pub asset_name: CanonicalAssetName,
}

/// Validate the batch and assign canonical names.
///
/// # Errors
///
/// [`ReleaseError::ArtifactCount`] when the number of artifacts differs from
/// `expected`; [`ReleaseError::DuplicateAssetName`] when two artifacts map to
/// the same name.
pub fn plan_uploads(
    artifacts: Vec<DiscoveredArtifact>,
    expected: usize,
    app_name: &str,
    app_version: &str,
) -> Result<Vec<PlannedUpload>, ReleaseError> {
    if artifacts.len() != expected {
        return Err(ReleaseError::ArtifactCount {
            expected,
            found: artifacts.len(),
            paths: artifacts.into_iter().map(|a| a.path).collect(),
        });
    }

    let mut seen: HashMap<CanonicalAssetName, PathBuf> = HashMap::new();
    let mut plan = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let asset_name = artifact.asset_name(app_name, app_version);
        if let Some(first) = seen.get(&asset_name) {
            return Err(ReleaseError::DuplicateAssetName {
                name: asset_name.to_string(),
                first: first.clone(),
                second: artifact.path,
            });
        }
        seen.insert(asset_name.clone(), artifact.path.clone());
        plan.push(PlannedUpload {
            artifact,
            asset_name,
        });
    }
    Ok(plan)
}

/// Archive directory artifacts; files pass through unchanged.
///
/// # Errors
///
/// Propagates compression failures, including an existing archive.
pub async fn prepare_artifacts(plan: Vec<PlannedUpload>) -> Result<Vec<PreparedArtifact>, ReleaseError> {
    let mut prepared = Vec::with_capacity(plan.len());
    for PlannedUpload {
        artifact,
        asset_name,
    } in plan
    {
        let upload_path = if artifact.is_dir {
            compress_directory(&artifact.path).await?
        } else {
            artifact.path
        };
        prepared.push(PreparedArtifact {
            upload_path,
            asset_name,
        });
    }
    Ok(prepared)
}

/// Upload each prepared artifact to `release`, one at a time.
///
/// # Errors
///
/// The first read or host failure aborts the remaining uploads.
pub async fn upload_artifacts<H: ReleaseHost + ?Sized>(
    host: &H,
    release: &Release,
    artifacts: &[PreparedArtifact],
) -> Result<Vec<ReleaseAsset>, ReleaseError> {
    let mut uploaded = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let data = tokio::fs::read(&artifact.upload_path).await?;
        info!(
            name = %artifact.asset_name,
            path = %artifact.upload_path.display(),
            bytes = data.len(),
            release = release.id,
            "Uploading asset"
        );
        let asset = host
            .upload_release_asset(release, artifact.asset_name.as_str(), data)
            .await
            .map_err(|e| {
                ReleaseError::host(
                    format!(
                        "Failed to upload {} as {}",
                        artifact.upload_path.display(),
                        artifact.asset_name
                    ),
                    e,
                )
            })?;
        uploaded.push(asset);
    }
    info!(count = uploaded.len(), release = release.id, "Uploaded assets");
    Ok(uploaded)
}

/// Plan, prepare and upload a job's artifacts.
///
/// # Errors
///
/// See [`plan_uploads`], [`prepare_artifacts`] and [`upload_artifacts`].
pub async fn publish_artifacts<H: ReleaseHost + ?Sized>(
    host: &H,
    release: &Release,
    artifacts: Vec<DiscoveredArtifact>,
    expected: usize,
    app_name: &str,
    app_version: &str,
) -> Result<Vec<ReleaseAsset>, ReleaseError> {
    let plan = plan_uploads(artifacts, expected, app_name, app_version)?;
    let prepared = prepare_artifacts(plan).await?;
    upload_artifacts(host, release, &prepared).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryHost;
    use crate::io::discovery::{bundle_dir, discover};
    use std::fs;
    use std::path::Path;
    use tauri_release_schema::BuildTarget;
    use tempfile::TempDir;

    const TARGET: BuildTarget = BuildTarget::Aarch64AppleDarwin;

    /// Five macOS artifacts, one of them the `.app` directory.
    fn mac_build(project: &Path) -> PathBuf {
        let bundle = bundle_dir(project, TARGET);
        let app = bundle.join("macos/xxx.app");
        fs::create_dir_all(app.join("Contents")).unwrap();
        fs::write(app.join("Contents/Info.plist"), "<plist/>").unwrap();
        fs::write(bundle.join("macos/xxx.app.tar.gz"), "payload").unwrap();
        fs::write(bundle.join("macos/xxx.app.tar.gz.sig"), "signature").unwrap();
        fs::create_dir_all(bundle.join("dmg")).unwrap();
        fs::write(bundle.join("dmg/xxx_0.0.18_aarch64.dmg"), "dmg").unwrap();
        fs::write(bundle.join("dmg/xxx_0.0.18_aarch64_debug.dmg"), "dmg").unwrap();
        bundle
    }

    #[tokio::test]
    async fn test_count_mismatch_aborts_before_side_effects() {
        let project = TempDir::new().unwrap();
        let bundle = mac_build(project.path());
        let host = MemoryHost::new();
        let release = host.insert_release("v0.0.18", false);

        let artifacts = discover(project.path(), TARGET, "xxx").unwrap();
        assert_eq!(artifacts.len(), 5);

        let err = publish_artifacts(&host, &release, artifacts, 6, "xxx", "0.0.18")
            .await
            .unwrap_err();
        assert!(
            matches!(err, ReleaseError::ArtifactCount { expected: 6, found: 5, .. }),
            "{err}"
        );
        assert!(!bundle.join("macos/__zipped__xxx.app.tar.gz").exists());
        assert!(host.uploads().is_empty());
    }

    #[tokio::test]
    async fn test_publish_uploads_canonical_names() {
        let project = TempDir::new().unwrap();
        let bundle = mac_build(project.path());
        let host = MemoryHost::new();
        let release = host.insert_release("v0.0.18", false);

        let artifacts = discover(project.path(), TARGET, "xxx").unwrap();
        let uploaded = publish_artifacts(&host, &release, artifacts, 5, "xxx", "0.0.18")
            .await
            .unwrap();
        assert_eq!(uploaded.len(), 5);

        let mut names = host.asset_names(release.id);
        names.sort();
        assert_eq!(
            names,
            [
                "aarch64-apple-darwin.xxx_0.0.18_aarch64.app.tar.gz",
                "aarch64-apple-darwin.xxx_0.0.18_aarch64.dmg",
                "aarch64-apple-darwin.xxx_0.0.18_aarch64.updater.app.tar.gz",
                "aarch64-apple-darwin.xxx_0.0.18_aarch64.updater.app.tar.gz.sig",
                "aarch64-apple-darwin.xxx_0.0.18_aarch64_debug.dmg",
            ]
        );
        assert!(bundle.join("macos/__zipped__xxx.app.tar.gz").exists());
        assert_eq!(
            host.asset_content(release.id, "aarch64-apple-darwin.xxx_0.0.18_aarch64.updater.app.tar.gz.sig")
                .unwrap(),
            b"signature"
        );
    }

    #[tokio::test]
    async fn test_existing_archive_aborts_before_any_upload() {
        let project = TempDir::new().unwrap();
        let bundle = mac_build(project.path());
        let stale = bundle.join("macos/__zipped__xxx.app.tar.gz");
        fs::write(&stale, "stale").unwrap();
        let host = MemoryHost::new();
        let release = host.insert_release("v0.0.18", false);

        let artifacts = discover(project.path(), TARGET, "xxx").unwrap();
        assert_eq!(artifacts.len(), 5);

        let err = publish_artifacts(&host, &release, artifacts, 5, "xxx", "0.0.18")
            .await
            .unwrap_err();
        assert!(matches!(err, ReleaseError::ArchiveExists(_)), "{err}");
        assert!(host.uploads().is_empty());
        assert_eq!(fs::read_to_string(&stale).unwrap(), "stale");
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let artifact = |path: &str| DiscoveredArtifact {
            path: PathBuf::from(path),
            target: TARGET,
            extension: tauri_release_schema::ArtifactExtension::App,
            kind: tauri_release_schema::ArtifactKind::AppBundleVersionless,
            is_dir: true,
        };
        let err = plan_uploads(
            vec![artifact("a/macos/xxx.app"), artifact("b/macos/xxx.app")],
            2,
            "xxx",
            "1.0.0",
        )
        .unwrap_err();
        assert!(matches!(err, ReleaseError::DuplicateAssetName { .. }), "{err}");
    }

    #[tokio::test]
    async fn test_first_upload_failure_is_fatal() {
        let project = TempDir::new().unwrap();
        mac_build(project.path());
        let mut host = MemoryHost::new();
        host.failing_upload = Some("aarch64-apple-darwin.xxx_0.0.18_aarch64.app.tar.gz".to_string());
        let release = host.insert_release("v0.0.18", false);

        let artifacts = discover(project.path(), TARGET, "xxx").unwrap();
        let err = publish_artifacts(&host, &release, artifacts, 5, "xxx", "0.0.18")
            .await
            .unwrap_err();
        assert!(matches!(err, ReleaseError::Host { .. }), "{err}");
        // Sorted order puts the dmg files first, then the app archive.
        assert_eq!(host.uploads().len(), 3);
        assert_eq!(host.asset_names(release.id).len(), 2);
    }
}
