//! Repository host adapters.
//!
//! The release record and its attached assets are the only state shared
//! between build jobs. Everything the engine needs from the host is behind
//! [`ReleaseHost`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// GitHub REST adapter.
pub mod github;

#[cfg(test)]
pub(crate) mod memory;

/// Hard ceiling on asset pages fetched for one release.
pub const MAX_ASSET_PAGES: u32 = 20;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Listing {what} did not finish within {pages} pages")]
    PageLimit { what: &'static str, pages: u32 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl HostError {
    /// True only for the "resource does not exist" failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// A release as the engine sees it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    /// Endpoint assets are uploaded to (may carry a URI template suffix).
    pub upload_url: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
}

/// A file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    pub id: u64,
    pub name: String,
    /// API URL; returns the raw content when fetched with an
    /// `application/octet-stream` accept header.
    pub url: String,
    #[serde(default)]
    pub browser_download_url: String,
}

/// Parameters for creating a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRelease {
    pub tag_name: String,
    pub target_commitish: String,
    pub name: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
}

impl NewRelease {
    /// Release for `tag` at commit `sha`, with the default title and body.
    pub fn for_tag(tag: &str, sha: &str, draft: bool, prerelease: bool) -> Self {
        Self {
            tag_name: tag.to_string(),
            target_commitish: sha.to_string(),
            name: format!("Release {tag}"),
            body: format!("Tag `{tag}`"),
            draft,
            prerelease,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next: bool,
}

/// Operations the engine needs from a repository host.
///
/// Pages are 1-based. Implementations report a missing resource as
/// [`HostError::NotFound`] and nothing else.
#[async_trait]
pub trait ReleaseHost: Send + Sync {
    /// Fetch a release by id.
    async fn get_release(&self, id: u64) -> Result<Release, HostError>;

    /// Fetch a published release by tag. Drafts are not visible here.
    async fn get_release_by_tag(&self, tag: &str) -> Result<Release, HostError>;

    /// One page of all releases, drafts included.
    async fn list_releases(&self, page: u32) -> Result<Page<Release>, HostError>;

    /// Create a release.
    async fn create_release(&self, release: &NewRelease) -> Result<Release, HostError>;

    /// One page of the assets attached to a release.
    async fn list_release_assets(
        &self,
        release_id: u64,
        page: u32,
    ) -> Result<Page<ReleaseAsset>, HostError>;

    /// Attach a binary asset named `name` to `release`.
    async fn upload_release_asset(
        &self,
        release: &Release,
        name: &str,
        data: Vec<u8>,
    ) -> Result<ReleaseAsset, HostError>;

    /// Remove an asset from its release.
    async fn delete_release_asset(&self, asset_id: u64) -> Result<(), HostError>;

    /// Authenticated read of an asset's raw content as text.
    async fn fetch_asset_text(&self, url: &str) -> Result<String, HostError>;
}

/// Every asset attached to a release, following pagination to the end.
///
/// # Errors
///
/// Propagates host failures, and fails with [`HostError::PageLimit`] rather
/// than returning a truncated list when the ceiling is reached.
pub async fn list_all_release_assets<H: ReleaseHost + ?Sized>(
    host: &H,
    release_id: u64,
) -> Result<Vec<ReleaseAsset>, HostError> {
    let mut assets = Vec::new();
    for page in 1..=MAX_ASSET_PAGES {
        let batch = host.list_release_assets(release_id, page).await?;
        debug!(release_id, page, count = batch.items.len(), "listed release assets");
        assets.extend(batch.items);
        if !batch.has_next {
            return Ok(assets);
        }
    }
    Err(HostError::PageLimit {
        what: "release assets",
        pages: MAX_ASSET_PAGES,
    })
}
