//! tauri-release - Tauri release coordination CLI

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tauri_release_cli::cmd;
use tauri_release_cli::output::report_failure;
use tauri_release_cli::{Cli, Commands};
use tauri_release_core::toolchain::TauriToolchain;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_failure(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let dry_run = cli.dry_run;
    match cli.command {
        Commands::BuildApp(args) => {
            let outputs = cmd::build_app::build_app(&args, dry_run, &TauriToolchain).await?;
            if let Some(id) = outputs.release_id {
                println!("Release {id} ({})", outputs.release_tag);
            }
            Ok(())
        }
        Commands::AssembleUpdater(args) => {
            cmd::assemble_updater::assemble_updater(&args, dry_run).await?;
            Ok(())
        }
    }
}
