//! tauri-release - release coordination for multi-target Tauri builds
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
//!
//! Two commands, run at different points of a CI matrix:
//!
//! - `build-app` runs once per target: it resolves the shared release,
//!   builds the app, and uploads the bundles under canonical names.
//! - `assemble-updater` runs once after all builds: it reconciles the
//!   release's assets into the updater manifest and uploads it.

pub mod cmd;
pub mod config;
pub mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tauri_release_core::tag::DEFAULT_TAG_TEMPLATE;
use tauri_release_schema::BuildTarget;

use crate::config::{HostArgs, parse_expected_artifacts, parse_pub_date, parse_updater_name};

#[derive(Debug, Parser)]
#[command(name = "tauri-release")]
#[command(author, version, about = "Build Tauri apps and publish them with an updater manifest")]
pub struct Cli {
    /// Show what would happen without changing the release
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build one target and upload its bundles to the release
    BuildApp(BuildAppArgs),
    /// Reconcile uploaded bundles into an updater manifest
    AssembleUpdater(AssembleUpdaterArgs),
}

#[derive(Debug, Args)]
pub struct BuildAppArgs {
    #[command(flatten)]
    pub host: HostArgs,

    /// Root of the Tauri project (the directory holding src-tauri/)
    #[arg(long, default_value = ".")]
    pub project_path: PathBuf,

    /// Target triple to build, or universal-apple-darwin
    #[arg(long)]
    pub target: BuildTarget,

    /// Number of bundles the build must produce
    #[arg(long, value_parser = parse_expected_artifacts)]
    pub expected_artifacts: usize,

    /// Extra arguments passed to `tauri build`
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub build_options: String,

    /// Release tag template ({NAME}, {VERSION}, {SHORT_SHA}, {DATE_ISO_8601})
    #[arg(long, default_value = DEFAULT_TAG_TEMPLATE)]
    pub tag_template: String,

    /// Upload to this release instead of resolving one by tag
    #[arg(long)]
    pub release_id: Option<u64>,

    /// Create the release as a draft
    #[arg(long)]
    pub draft: bool,

    /// Mark a created release as a prerelease
    #[arg(long)]
    pub prerelease: bool,
}

#[derive(Debug, Args)]
pub struct AssembleUpdaterArgs {
    #[command(flatten)]
    pub host: HostArgs,

    /// Release whose assets are reconciled
    #[arg(long)]
    pub release_id: u64,

    /// Version written to the manifest; read from src-tauri/Cargo.toml if omitted
    #[arg(long)]
    pub app_version: Option<String>,

    /// Project root used when --app-version is omitted
    #[arg(long, default_value = ".")]
    pub project_path: PathBuf,

    /// Serve macOS from the universal build when both exist
    #[arg(long)]
    pub prefer_universal: bool,

    /// Serve Windows from the NSIS installer when both exist
    #[arg(long)]
    pub prefer_nsis: bool,

    /// Publication date (RFC 3339); defaults to now
    #[arg(long, value_parser = parse_pub_date)]
    pub pub_date: Option<String>,

    /// Asset name of the manifest
    #[arg(long, default_value = "latest.json", value_parser = parse_updater_name)]
    pub updater_name: String,

    /// Release notes; generated from the version if omitted
    #[arg(long)]
    pub notes: Option<String>,
}
