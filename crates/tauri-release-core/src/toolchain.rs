//! Running the Rust and JavaScript toolchains for a Tauri build.

use std::path::Path;

use async_trait::async_trait;
use tauri_release_schema::BuildTarget;
use tokio::process::Command;
use tracing::info;

use crate::error::ReleaseError;

/// JavaScript package manager driving the Tauri CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Npm,
    Pnpm,
    Yarn,
}

impl PackageManager {
    /// Pick the manager whose lockfile is present in `project`, npm if none.
    pub fn detect(project: &Path) -> Self {
        if project.join("pnpm-lock.yaml").exists() {
            Self::Pnpm
        } else if project.join("yarn.lock").exists() {
            Self::Yarn
        } else {
            Self::Npm
        }
    }

    pub fn program(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Pnpm => "pnpm",
            Self::Yarn => "yarn",
        }
    }

    /// Arguments that invoke `tauri build` through this manager.
    fn tauri_build_prefix(&self) -> &'static [&'static str] {
        match self {
            Self::Npm => &["run", "tauri", "--", "build"],
            Self::Pnpm | Self::Yarn => &["tauri", "build"],
        }
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.program())
    }
}

/// Split user build options on whitespace, dropping empty segments.
pub fn split_build_options(options: &str) -> Vec<String> {
    options.split_whitespace().map(str::to_string).collect()
}

/// Value of `--target`/`-t` in `options`, if given.
pub fn target_from_options(options: &[String]) -> Option<&str> {
    options
        .iter()
        .position(|o| o == "--target" || o == "-t")
        .and_then(|i| options.get(i + 1))
        .map(String::as_str)
}

/// Full argument list for building `target` with `manager`.
///
/// `--target` is appended unless the options already choose one.
pub fn build_args(manager: PackageManager, target: BuildTarget, options: &[String]) -> Vec<String> {
    let mut args: Vec<String> = manager
        .tauri_build_prefix()
        .iter()
        .map(|s| (*s).to_string())
        .collect();
    args.extend(options.iter().cloned());
    if target_from_options(options).is_none() {
        args.push("--target".to_string());
        args.push(target.as_str().to_string());
    }
    args
}

/// The external tools a build job drives.
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Install JavaScript dependencies.
    async fn install(&self, project: &Path) -> Result<(), ReleaseError>;

    /// Make the rustc targets needed for `target` available.
    async fn add_target(&self, target: BuildTarget) -> Result<(), ReleaseError>;

    /// Build and bundle the app for `target`.
    async fn build(&self, project: &Path, target: BuildTarget, options: &[String]) -> Result<(), ReleaseError>;
}

/// [`Toolchain`] that shells out to rustup and the project's package manager.
#[derive(Debug, Clone, Copy, Default)]
pub struct TauriToolchain;

async fn run(program: &str, args: &[String], cwd: Option<&Path>) -> Result<(), ReleaseError> {
    let command = format!("{program} {}", args.join(" "));
    info!(%command, "Running");

    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    // Inherited stdio so the tool's progress shows in the job log.
    let status = cmd
        .status()
        .await
        .map_err(|e| ReleaseError::context("Failed to start command", format!("{command}: {e}")))?;

    if !status.success() {
        return Err(ReleaseError::Command { command, status });
    }
    Ok(())
}

#[async_trait]
impl Toolchain for TauriToolchain {
    async fn install(&self, project: &Path) -> Result<(), ReleaseError> {
        let manager = PackageManager::detect(project);
        run(manager.program(), &["install".to_string()], Some(project)).await
    }

    async fn add_target(&self, target: BuildTarget) -> Result<(), ReleaseError> {
        for &triple in target.rustc_targets() {
            let args = ["target", "add", triple].map(str::to_string);
            run("rustup", &args, None).await?;
        }
        Ok(())
    }

    async fn build(&self, project: &Path, target: BuildTarget, options: &[String]) -> Result<(), ReleaseError> {
        let manager = PackageManager::detect(project);
        run(manager.program(), &build_args(manager, target, options), Some(project)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detect_package_manager() {
        let dir = TempDir::new().unwrap();
        assert_eq!(PackageManager::detect(dir.path()), PackageManager::Npm);

        std::fs::write(dir.path().join("yarn.lock"), "").unwrap();
        assert_eq!(PackageManager::detect(dir.path()), PackageManager::Yarn);

        std::fs::write(dir.path().join("pnpm-lock.yaml"), "").unwrap();
        assert_eq!(PackageManager::detect(dir.path()), PackageManager::Pnpm);
    }

    #[test]
    fn test_split_build_options() {
        assert_eq!(
            split_build_options("  --verbose \n --bundles   app,dmg "),
            ["--verbose", "--bundles", "app,dmg"]
        );
        assert!(split_build_options("   ").is_empty());
    }

    #[test]
    fn test_build_args_adds_target() {
        let options = split_build_options("--verbose");
        assert_eq!(
            build_args(PackageManager::Pnpm, BuildTarget::UniversalAppleDarwin, &options),
            ["tauri", "build", "--verbose", "--target", "universal-apple-darwin"]
        );
        assert_eq!(
            build_args(PackageManager::Npm, BuildTarget::X86_64PcWindowsMsvc, &[]),
            ["run", "tauri", "--", "build", "--target", "x86_64-pc-windows-msvc"]
        );
    }

    #[test]
    fn test_build_args_respects_explicit_target() {
        let options = split_build_options("-t aarch64-apple-darwin");
        assert_eq!(target_from_options(&options), Some("aarch64-apple-darwin"));
        assert_eq!(
            build_args(PackageManager::Yarn, BuildTarget::Aarch64AppleDarwin, &options),
            ["tauri", "build", "-t", "aarch64-apple-darwin"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_command_reports_status() {
        let err = run("false", &[], None).await.unwrap_err();
        assert!(matches!(err, ReleaseError::Command { .. }), "{err}");
    }
}
