//! Release coordination engine for multi-target Tauri builds.
//!
//! Each build job resolves (or creates) the shared release, builds its
//! target, and uploads the bundles under canonical names. A final
//! aggregation step lists whatever is attached to the release and reconciles
//! it into one updater manifest.
//!
//! The repository host is reached only through [`host::ReleaseHost`], so the
//! engine can be driven against GitHub or an in-memory double.
#![allow(missing_docs)]

pub mod app_info;
pub mod error;
pub mod host;
pub mod io;
pub mod reconcile;
pub mod release;
pub mod tag;
pub mod toolchain;

pub use error::ReleaseError;
pub use host::{ReleaseHost, github::GithubHost};

/// User Agent string for host requests
pub const USER_AGENT: &str = concat!("tauri-release/", env!("CARGO_PKG_VERSION"));
