//! Step outputs and the terminal failure message.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

/// Append `key=value` lines to the file GitHub Actions reads step outputs
/// from.
pub fn append_outputs(path: &Path, outputs: &[(&str, String)]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    for (key, value) in outputs {
        writeln!(file, "{key}={value}").with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

/// Append to `$GITHUB_OUTPUT` when running under Actions; no-op otherwise.
pub fn write_step_outputs(outputs: &[(&str, String)]) -> Result<()> {
    match std::env::var_os("GITHUB_OUTPUT") {
        Some(path) if !path.is_empty() => append_outputs(Path::new(&path), outputs),
        _ => Ok(()),
    }
}

/// One-line rendering of an error chain.
pub fn failure_message(err: &anyhow::Error) -> String {
    format!("{err:#}")
}

/// Print the run's single failure message.
pub fn report_failure(err: &anyhow::Error) {
    let message = failure_message(err);
    if std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true") {
        // Workflow commands must stay on one line.
        println!("::error::{}", message.replace('\n', "%0A"));
    }
    eprintln!("Error: {message}");
}
