use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, LINK};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{HostError, NewRelease, Page, Release, ReleaseAsset, ReleaseHost};

/// Public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Items requested per listing page (the API maximum).
pub const PER_PAGE: u32 = 100;

const API_VERSION: &str = "2022-11-28";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const OCTET_STREAM: &str = "application/octet-stream";

/// Connection settings for one repository.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// REST root, e.g. `https://api.github.com` or a GHES `/api/v3` URL.
    pub api_url: String,
    pub token: String,
    pub owner: String,
    pub repo: String,
}

/// Split an `owner/repo` string.
pub fn parse_repository(repository: &str) -> Option<(String, String)> {
    let (owner, repo) = repository.trim().split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

/// [`ReleaseHost`] backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubHost {
    client: Client,
    config: GithubConfig,
}

impl GithubHost {
    /// Build a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: GithubConfig) -> Result<Self, HostError> {
        let client = Client::builder().user_agent(crate::USER_AGENT).build()?;
        Ok(Self { client, config })
    }

    /// `<api>/repos/<owner>/<repo>/<segments...>`, each segment percent-encoded.
    fn repo_endpoint(&self, segments: &[&str]) -> Result<Url, HostError> {
        let mut url = Url::parse(&self.config.api_url)
            .map_err(|e| HostError::InvalidUrl(format!("{}: {e}", self.config.api_url)))?;
        url.path_segments_mut()
            .map_err(|()| HostError::InvalidUrl(self.config.api_url.clone()))?
            .pop_if_empty()
            .extend(["repos", self.config.owner.as_str(), self.config.repo.as_str()])
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.config.token)
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn json<T: DeserializeOwned>(&self, what: &str, req: RequestBuilder) -> Result<T, HostError> {
        let resp = check(req.send().await?, what).await?;
        Ok(resp.json().await?)
    }

    async fn page<T: DeserializeOwned>(
        &self,
        what: &str,
        url: Url,
        page: u32,
    ) -> Result<Page<T>, HostError> {
        let req = self
            .request(Method::GET, url)
            .query(&[("per_page", PER_PAGE), ("page", page)]);
        let resp = check(req.send().await?, what).await?;
        let has_next = has_next_page(&resp);
        let items: Vec<T> = resp.json().await?;
        debug!(what, page, count = items.len(), has_next, "fetched page");
        Ok(Page { items, has_next })
    }
}

/// Map 404 to [`HostError::NotFound`] and any other failure status to
/// [`HostError::Status`].
async fn check(resp: Response, what: &str) -> Result<Response, HostError> {
    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
        return Err(HostError::NotFound {
            what: what.to_string(),
        });
    }
    if !status.is_success() {
        let url = resp.url().to_string();
        let body = resp.text().await.unwrap_or_default();
        return Err(HostError::Status {
            url,
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp)
}

fn has_next_page(resp: &Response) -> bool {
    resp.headers()
        .get(LINK)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|link| link.contains("rel=\"next\""))
}

/// Drop the RFC 6570 `{?name,label}` template GitHub appends to upload URLs.
fn upload_endpoint(upload_url: &str) -> Result<Url, HostError> {
    let base = upload_url.split('{').next().unwrap_or(upload_url);
    Url::parse(base).map_err(|e| HostError::InvalidUrl(format!("{upload_url}: {e}")))
}

#[async_trait]
impl ReleaseHost for GithubHost {
    async fn get_release(&self, id: u64) -> Result<Release, HostError> {
        let url = self.repo_endpoint(&["releases", &id.to_string()])?;
        self.json(&format!("release {id}"), self.request(Method::GET, url))
            .await
    }

    async fn get_release_by_tag(&self, tag: &str) -> Result<Release, HostError> {
        let url = self.repo_endpoint(&["releases", "tags", tag])?;
        self.json(&format!("release with tag {tag}"), self.request(Method::GET, url))
            .await
    }

    async fn list_releases(&self, page: u32) -> Result<Page<Release>, HostError> {
        let url = self.repo_endpoint(&["releases"])?;
        self.page("releases", url, page).await
    }

    async fn create_release(&self, release: &NewRelease) -> Result<Release, HostError> {
        let url = self.repo_endpoint(&["releases"])?;
        let req = self.request(Method::POST, url).json(release);
        self.json("repository", req).await
    }

    async fn list_release_assets(
        &self,
        release_id: u64,
        page: u32,
    ) -> Result<Page<ReleaseAsset>, HostError> {
        let url = self.repo_endpoint(&["releases", &release_id.to_string(), "assets"])?;
        self.page("release assets", url, page).await
    }

    async fn upload_release_asset(
        &self,
        release: &Release,
        name: &str,
        data: Vec<u8>,
    ) -> Result<ReleaseAsset, HostError> {
        let url = upload_endpoint(&release.upload_url)?;
        let req = self
            .request(Method::POST, url)
            .query(&[("name", name)])
            .header(CONTENT_TYPE, OCTET_STREAM)
            .body(data);
        self.json(&format!("release {}", release.id), req).await
    }

    async fn delete_release_asset(&self, asset_id: u64) -> Result<(), HostError> {
        let url = self.repo_endpoint(&["releases", "assets", &asset_id.to_string()])?;
        let resp = self.request(Method::DELETE, url).send().await?;
        check(resp, &format!("asset {asset_id}")).await?;
        Ok(())
    }

    async fn fetch_asset_text(&self, url: &str) -> Result<String, HostError> {
        let url = Url::parse(url).map_err(|e| HostError::InvalidUrl(format!("{url}: {e}")))?;
        let resp = self
            .client
            .get(url.clone())
            .bearer_auth(&self.config.token)
            .header(ACCEPT, OCTET_STREAM)
            .send()
            .await?;
        let resp = check(resp, &format!("asset {url}")).await?;
        Ok(resp.text().await?)
    }
}
