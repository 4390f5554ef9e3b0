//! GitHub release API interaction

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use super::DownloadOptions;
use crate::error::{DownloadError, GitHubError};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("release-runner/", env!("CARGO_PKG_VERSION"));
const API_TIMEOUT: Duration = Duration::from_secs(30);

/// Repository identity, `owner/name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
    pub owner: String,
    pub name: String,
}

impl Repo {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl FromStr for Repo {
    type Err = GitHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(GitHubError::InvalidRepo(s.to_string())),
        }
    }
}

/// GitHub release metadata from API
#[derive(Deserialize, Debug, Clone)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    pub assets: Vec<Asset>,
}

/// GitHub release asset metadata
#[derive(Deserialize, Debug, Clone)]
pub struct Asset {
    pub name: String,
    pub browser_download_url: String,
    #[serde(default)]
    pub size: u64,
}

impl Release {
    pub fn asset(&self, name: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.name == name)
    }

    pub fn asset_names(&self) -> Vec<&str> {
        self.assets.iter().map(|a| a.name.as_str()).collect()
    }
}

/// Where releases come from
///
/// Implemented by [`GitHubClient`]; tests substitute an in-memory source.
#[allow(async_fn_in_trait)]
pub trait ReleaseSource {
    fn repo(&self) -> &Repo;

    async fn latest_release(&self) -> Result<Release, GitHubError>;

    async fn release_by_tag(&self, tag: &str) -> Result<Release, GitHubError>;

    /// Download `asset` of `release` and unpack it, returning the directory
    async fn download_asset(
        &self,
        release: &Release,
        asset: &str,
        options: &DownloadOptions,
    ) -> Result<PathBuf, DownloadError>;
}

/// `ReleaseSource` backed by the GitHub REST API
pub struct GitHubClient {
    repo: Repo,
    api_url: Url,
    token: Option<String>,
    http: reqwest::Client,
}

impl GitHubClient {
    pub fn new(repo: Repo, api_url: &str, token: Option<String>) -> Result<Self, GitHubError> {
        let parsed = Url::parse(api_url).map_err(|source| GitHubError::InvalidUrl {
            url: api_url.to_string(),
            source,
        })?;
        if parsed.cannot_be_a_base() {
            return Err(GitHubError::NotABase(api_url.to_string()));
        }
        let api_url = parsed;

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(API_TIMEOUT)
            .build()
            .map_err(|source| GitHubError::Http {
                url: api_url.to_string(),
                source,
            })?;

        Ok(Self {
            repo,
            api_url,
            token: token.filter(|t| !t.is_empty()),
            http,
        })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// `{api}/repos/{owner}/{name}/releases/{suffix..}`
    ///
    /// Each segment is percent-encoded, so a tag containing `/`, `?` or `#`
    /// stays a single path segment. GHES bases such as `/api/v3` are kept.
    fn releases_url(&self, suffix: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        // `new` rejects cannot-be-a-base urls
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["repos", self.repo.owner.as_str(), self.repo.name.as_str(), "releases"])
                .extend(suffix);
        }
        url
    }

    async fn get_release(&self, url: Url) -> Result<Release, GitHubError> {
        let url_str = url.to_string();
        let mut request = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|source| GitHubError::Http {
            url: url_str.clone(),
            source,
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::Status {
                url: url_str,
                status,
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|source| GitHubError::Decode { url: url_str, source })
    }
}

impl ReleaseSource for GitHubClient {
    fn repo(&self) -> &Repo {
        &self.repo
    }

    async fn latest_release(&self) -> Result<Release, GitHubError> {
        let url = self.releases_url(&["latest"]);
        self.get_release(url).await
    }

    async fn release_by_tag(&self, tag: &str) -> Result<Release, GitHubError> {
        let url = self.releases_url(&["tags", tag]);
        self.get_release(url).await
    }

    async fn download_asset(
        &self,
        release: &Release,
        asset: &str,
        options: &DownloadOptions,
    ) -> Result<PathBuf, DownloadError> {
        super::core::download_and_unpack(self, release, asset, options).await
    }
}
