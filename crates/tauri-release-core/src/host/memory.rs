//! In-memory [`ReleaseHost`] used by the engine's tests.
//!
//! Mirrors the GitHub behaviours the engine depends on: drafts are invisible
//! to tag lookup, listings are paged, and duplicate asset names are rejected.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{HostError, NewRelease, Page, Release, ReleaseAsset, ReleaseHost};

#[derive(Debug, Default)]
struct State {
    releases: Vec<Release>,
    assets: Vec<(u64, ReleaseAsset, Vec<u8>)>,
    next_id: u64,
    creates: usize,
    release_pages_read: u32,
    uploads: Vec<String>,
}

#[derive(Debug)]
pub(crate) struct MemoryHost {
    state: Mutex<State>,
    page_size: usize,
    /// Status returned by tag lookup instead of looking anything up.
    pub(crate) tag_lookup_status: Option<u16>,
    /// Upload of this asset name fails with a 500.
    pub(crate) failing_upload: Option<String>,
}

fn paged<T: Clone>(items: &[T], page: u32, page_size: usize) -> Page<T> {
    let start = (page.saturating_sub(1) as usize) * page_size;
    Page {
        items: items.iter().skip(start).take(page_size).cloned().collect(),
        has_next: start + page_size < items.len(),
    }
}

impl MemoryHost {
    pub(crate) fn new() -> Self {
        Self::with_page_size(100)
    }

    pub(crate) fn with_page_size(page_size: usize) -> Self {
        Self {
            state: Mutex::new(State::default()),
            page_size,
            tag_lookup_status: None,
            failing_upload: None,
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("memory host state poisoned")
    }

    pub(crate) fn creates(&self) -> usize {
        self.state().creates
    }

    pub(crate) fn release_pages_read(&self) -> u32 {
        self.state().release_pages_read
    }

    /// Names passed to `upload_release_asset`, in call order.
    pub(crate) fn uploads(&self) -> Vec<String> {
        self.state().uploads.clone()
    }

    pub(crate) fn asset_names(&self, release_id: u64) -> Vec<String> {
        self.state()
            .assets
            .iter()
            .filter(|(id, _, _)| *id == release_id)
            .map(|(_, asset, _)| asset.name.clone())
            .collect()
    }

    pub(crate) fn asset_content(&self, release_id: u64, name: &str) -> Option<Vec<u8>> {
        self.state()
            .assets
            .iter()
            .find(|(id, asset, _)| *id == release_id && asset.name == name)
            .map(|(_, _, data)| data.clone())
    }

    /// Seed an existing release without going through `create_release`.
    pub(crate) fn insert_release(&self, tag: &str, draft: bool) -> Release {
        let mut state = self.state();
        state.next_id += 1;
        let release = Release {
            id: state.next_id,
            tag_name: tag.to_string(),
            upload_url: format!("memory://releases/{}/assets{{?name,label}}", state.next_id),
            draft,
            prerelease: false,
        };
        state.releases.push(release.clone());
        release
    }
}

#[async_trait]
impl ReleaseHost for MemoryHost {
    async fn get_release(&self, id: u64) -> Result<Release, HostError> {
        self.state()
            .releases
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| HostError::NotFound {
                what: format!("release {id}"),
            })
    }

    async fn get_release_by_tag(&self, tag: &str) -> Result<Release, HostError> {
        if let Some(status) = self.tag_lookup_status {
            return Err(HostError::Status {
                url: format!("memory://releases/tags/{tag}"),
                status,
                body: "injected".to_string(),
            });
        }
        self.state()
            .releases
            .iter()
            .find(|r| r.tag_name == tag && !r.draft)
            .cloned()
            .ok_or_else(|| HostError::NotFound {
                what: format!("release with tag {tag}"),
            })
    }

    async fn list_releases(&self, page: u32) -> Result<Page<Release>, HostError> {
        let mut state = self.state();
        state.release_pages_read += 1;
        Ok(paged(&state.releases, page, self.page_size))
    }

    async fn create_release(&self, release: &NewRelease) -> Result<Release, HostError> {
        self.state().creates += 1;
        let created = self.insert_release(&release.tag_name, release.draft);
        let mut state = self.state();
        let stored = state
            .releases
            .iter_mut()
            .find(|r| r.id == created.id)
            .expect("release just inserted");
        stored.prerelease = release.prerelease;
        Ok(stored.clone())
    }

    async fn list_release_assets(
        &self,
        release_id: u64,
        page: u32,
    ) -> Result<Page<ReleaseAsset>, HostError> {
        let assets: Vec<ReleaseAsset> = self
            .state()
            .assets
            .iter()
            .filter(|(id, _, _)| *id == release_id)
            .map(|(_, asset, _)| asset.clone())
            .collect();
        Ok(paged(&assets, page, self.page_size))
    }

    async fn upload_release_asset(
        &self,
        release: &Release,
        name: &str,
        data: Vec<u8>,
    ) -> Result<ReleaseAsset, HostError> {
        let mut state = self.state();
        state.uploads.push(name.to_string());

        if self.failing_upload.as_deref() == Some(name) {
            return Err(HostError::Status {
                url: release.upload_url.clone(),
                status: 500,
                body: "injected".to_string(),
            });
        }
        if state
            .assets
            .iter()
            .any(|(id, asset, _)| *id == release.id && asset.name == name)
        {
            return Err(HostError::Status {
                url: release.upload_url.clone(),
                status: 422,
                body: "already_exists".to_string(),
            });
        }

        state.next_id += 1;
        let asset = ReleaseAsset {
            id: state.next_id,
            name: name.to_string(),
            url: format!("memory://assets/{}", state.next_id),
            browser_download_url: format!("memory://download/{}/{name}", release.tag_name),
        };
        state.assets.push((release.id, asset.clone(), data));
        Ok(asset)
    }

    async fn delete_release_asset(&self, asset_id: u64) -> Result<(), HostError> {
        let mut state = self.state();
        let before = state.assets.len();
        state.assets.retain(|(_, asset, _)| asset.id != asset_id);
        if state.assets.len() == before {
            return Err(HostError::NotFound {
                what: format!("asset {asset_id}"),
            });
        }
        Ok(())
    }

    async fn fetch_asset_text(&self, url: &str) -> Result<String, HostError> {
        self.state()
            .assets
            .iter()
            .find(|(_, asset, _)| asset.url == url)
            .map(|(_, _, data)| String::from_utf8_lossy(data).into_owned())
            .ok_or_else(|| HostError::NotFound {
                what: format!("asset {url}"),
            })
    }
}
