//! `assemble-updater`: reconcile release assets into the updater manifest.

use anyhow::{Context, Result};
use chrono::Utc;
use tauri_release_core::GithubHost;
use tauri_release_core::app_info::AppInfo;
use tauri_release_core::host::ReleaseHost;
use tauri_release_core::reconcile::{ManifestMeta, PreferencePolicy, publish_manifest, reconcile};
use tauri_release_core::release::release_by_id;
use tauri_release_schema::{UpdaterManifest, default_notes};
use tracing::info;

use crate::AssembleUpdaterArgs;
use crate::config::format_pub_date;

pub async fn assemble_updater(args: &AssembleUpdaterArgs, dry_run: bool) -> Result<UpdaterManifest> {
    let host = GithubHost::new(args.host.github_config()?)?;
    run(&host, args, dry_run).await
}

/// Reconcile against `host`; print the manifest on a dry run, upload it
/// otherwise.
pub async fn run(host: &dyn ReleaseHost, args: &AssembleUpdaterArgs, dry_run: bool) -> Result<UpdaterManifest> {
    let meta = manifest_meta(args)?;
    let policy = PreferencePolicy {
        prefer_universal: args.prefer_universal,
        prefer_nsis: args.prefer_nsis,
    };

    let release = release_by_id(host, args.release_id).await?;
    let manifest = reconcile(host, release.id, policy, meta).await?;

    if dry_run {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
    } else {
        let asset = publish_manifest(host, &release, &args.updater_name, &manifest)
            .await
            .with_context(|| format!("Failed to publish {}", args.updater_name))?;
        info!(name = %asset.name, release = release.id, platforms = manifest.platforms.len(), "Published updater manifest");
    }
    Ok(manifest)
}

fn manifest_meta(args: &AssembleUpdaterArgs) -> Result<ManifestMeta> {
    let version = match &args.app_version {
        Some(v) => semver::Version::parse(v.trim())
            .with_context(|| format!("Invalid --app-version {v:?}"))?
            .to_string(),
        None => AppInfo::read(&args.project_path)?.version.to_string(),
    };
    Ok(ManifestMeta {
        notes: args.notes.clone().unwrap_or_else(|| default_notes(&version)),
        pub_date: args.pub_date.clone().unwrap_or_else(|| format_pub_date(Utc::now())),
        version,
    })
}
