//! Release identity resolution.
//!
//! Every build job in a matrix needs the same release. Published releases are
//! found by tag; drafts are invisible to the tag endpoint, so they are found
//! by paging through the release list. Only a "not found" answer leads to
//! creation. Two jobs may still race to create the same tag; callers that
//! care should resolve once and pass the id down.

use tracing::{debug, info};

use crate::error::ReleaseError;
use crate::host::{NewRelease, Release, ReleaseHost};

/// Hard ceiling on release-list pages searched for a draft.
pub const MAX_RELEASE_PAGES: u32 = 50;

/// What the caller wants the release to look like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    pub tag: String,
    /// Commit the tag is created at, if the release is new.
    pub sha: String,
    pub draft: bool,
    pub prerelease: bool,
}

/// Return the release for `request.tag`, creating it if it does not exist.
///
/// # Errors
///
/// Fails on an empty tag before touching the host. Any host error other than
/// "not found" is returned wrapped, without attempting creation.
pub async fn get_or_create_release<H: ReleaseHost + ?Sized>(
    host: &H,
    request: &ReleaseRequest,
) -> Result<Release, ReleaseError> {
    if request.tag.trim().is_empty() {
        return Err(ReleaseError::Validation("release tag must not be empty".to_string()));
    }

    if let Some(existing) = find_release(host, request).await? {
        info!(id = existing.id, tag = %existing.tag_name, draft = existing.draft, "Using existing release");
        return Ok(existing);
    }

    info!(tag = %request.tag, draft = request.draft, prerelease = request.prerelease, "Creating release");
    let new = NewRelease::for_tag(&request.tag, &request.sha, request.draft, request.prerelease);
    let created = host
        .create_release(&new)
        .await
        .map_err(|e| ReleaseError::host(format!("Failed to create release {}", request.tag), e))?;
    info!(id = created.id, tag = %created.tag_name, "Created release");
    Ok(created)
}

async fn find_release<H: ReleaseHost + ?Sized>(
    host: &H,
    request: &ReleaseRequest,
) -> Result<Option<Release>, ReleaseError> {
    if request.draft {
        return find_draft(host, &request.tag).await;
    }
    match host.get_release_by_tag(&request.tag).await {
        Ok(release) => Ok(Some(release)),
        Err(e) if e.is_not_found() => {
            debug!(tag = %request.tag, "No published release for tag");
            Ok(None)
        }
        Err(e) => Err(ReleaseError::host(
            format!("Failed to look up release {}", request.tag),
            e,
        )),
    }
}

/// Search the release list for any release with `tag`, draft or not.
async fn find_draft<H: ReleaseHost + ?Sized>(
    host: &H,
    tag: &str,
) -> Result<Option<Release>, ReleaseError> {
    for page in 1..=MAX_RELEASE_PAGES {
        let batch = host
            .list_releases(page)
            .await
            .map_err(|e| ReleaseError::host(format!("Failed to list releases (page {page})"), e))?;
        debug!(page, count = batch.items.len(), "Searching releases for tag");

        if let Some(found) = batch.items.into_iter().find(|r| r.tag_name == tag) {
            return Ok(Some(found));
        }
        if !batch.has_next {
            return Ok(None);
        }
    }
    Err(ReleaseError::context(
        "Draft lookup",
        format!("no release tagged {tag} within the first {MAX_RELEASE_PAGES} pages of releases"),
    ))
}

/// Fetch a release whose id was resolved by an earlier job.
///
/// # Errors
///
/// Any host error, including "not found", is fatal here.
pub async fn release_by_id<H: ReleaseHost + ?Sized>(
    host: &H,
    id: u64,
) -> Result<Release, ReleaseError> {
    let release = host
        .get_release(id)
        .await
        .map_err(|e| ReleaseError::host(format!("Failed to fetch release {id}"), e))?;
    debug!(id, tag = %release.tag_name, "Loaded release");
    Ok(release)
}
