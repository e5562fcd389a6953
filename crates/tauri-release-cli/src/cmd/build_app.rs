//! `build-app`: build one target and upload its bundles.

use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tauri_release_core::app_info::AppInfo;
use tauri_release_core::host::{Release, ReleaseHost};
use tauri_release_core::io::{discover, plan_uploads, publish_artifacts};
use tauri_release_core::release::{ReleaseRequest, get_or_create_release, release_by_id};
use tauri_release_core::tag::{TagData, render_tag};
use tauri_release_core::toolchain::{Toolchain, split_build_options};
use tauri_release_core::GithubHost;
use tracing::info;

use crate::BuildAppArgs;
use crate::config::require_sha;
use crate::output::write_step_outputs;

/// What the run resolved, reported as step outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutputs {
    /// `None` in a dry run with no pre-resolved release.
    pub release_id: Option<u64>,
    pub release_tag: String,
    pub app_name: String,
    pub app_version: String,
    pub asset_names: Vec<String>,
}

impl BuildOutputs {
    fn step_outputs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("release-id", self.release_id.map(|id| id.to_string()).unwrap_or_default()),
            ("release-tag", self.release_tag.clone()),
            ("app-name", self.app_name.clone()),
            ("app-version", self.app_version.clone()),
        ]
    }
}

pub async fn build_app(args: &BuildAppArgs, dry_run: bool, toolchain: &dyn Toolchain) -> Result<BuildOutputs> {
    let project = args.project_path.as_path();
    if !project.is_dir() {
        bail!("Project path {} is not a directory", project.display());
    }
    let app = AppInfo::read(project)?;
    let app_version = app.version.to_string();
    let tag = render_tag(
        &args.tag_template,
        &TagData {
            app: &app,
            sha: &args.host.sha,
            now: Utc::now(),
        },
    );
    info!(app = %app.name, version = %app_version, build_target = %args.target, %tag, "Preparing build");

    // Resolve everything that can fail on input before the build starts.
    let host = if dry_run {
        None
    } else {
        Some(GithubHost::new(args.host.github_config()?)?)
    };
    let release = match &host {
        Some(host) => Some(resolve_release(host, args, &tag).await?),
        None => None,
    };
    let release_tag = release.as_ref().map_or_else(|| tag.clone(), |r| r.tag_name.clone());

    let options = split_build_options(&args.build_options);
    toolchain.install(project).await?;
    toolchain.add_target(args.target).await?;
    toolchain.build(project, args.target, &options).await?;

    let artifacts = discover(project, args.target, &app.name)?;
    let asset_names: Vec<String> = match (&host, &release) {
        (Some(host), Some(release)) => {
            publish_artifacts(host, release, artifacts, args.expected_artifacts, &app.name, &app_version)
                .await?
                .into_iter()
                .map(|asset| asset.name)
                .collect()
        }
        _ => {
            let plan = plan_uploads(artifacts, args.expected_artifacts, &app.name, &app_version)?;
            for planned in &plan {
                println!("{} -> {}", display_relative(&planned.artifact.path, project), planned.asset_name);
            }
            plan.into_iter().map(|p| p.asset_name.to_string()).collect()
        }
    };

    let outputs = BuildOutputs {
        release_id: release.as_ref().map(|r| r.id).or(args.release_id),
        release_tag,
        app_name: app.name,
        app_version,
        asset_names,
    };
    write_step_outputs(&outputs.step_outputs())?;
    Ok(outputs)
}

async fn resolve_release(host: &dyn ReleaseHost, args: &BuildAppArgs, tag: &str) -> Result<Release> {
    if let Some(id) = args.release_id {
        return Ok(release_by_id(host, id).await?);
    }
    let request = ReleaseRequest {
        tag: tag.to_string(),
        sha: require_sha(&args.host.sha)?.to_string(),
        draft: args.draft,
        prerelease: args.prerelease,
    };
    get_or_create_release(host, &request)
        .await
        .with_context(|| format!("Failed to resolve release {tag}"))
}

fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}
