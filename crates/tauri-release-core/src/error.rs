//! Domain errors for release operations

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::host::HostError;

#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Expecting {expected} artifacts but found {found}: {paths:?}")]
    ArtifactCount {
        expected: usize,
        found: usize,
        paths: Vec<PathBuf>,
    },

    #[error("Asset name \"{name}\" produced by both {} and {}", first.display(), second.display())]
    DuplicateAssetName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Won't compress artifact, the file \"{}\" already exists", .0.display())]
    ArchiveExists(PathBuf),

    #[error("{operation}")]
    Host {
        operation: String,
        #[source]
        source: HostError,
    },

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to scan build output: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("Failed to parse project manifest: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("`{command}` exited with {status}")]
    Command { command: String, status: ExitStatus },

    #[error("{context}: {message}")]
    Context {
        context: &'static str,
        message: String,
    },
}

impl ReleaseError {
    /// Create an error with context for better debugging.
    pub fn context(ctx: &'static str, msg: impl std::fmt::Display) -> Self {
        Self::Context {
            context: ctx,
            message: msg.to_string(),
        }
    }

    /// Wrap a host failure with the operation that triggered it.
    pub fn host(operation: impl Into<String>, source: HostError) -> Self {
        Self::Host {
            operation: operation.into(),
            source,
        }
    }
}
