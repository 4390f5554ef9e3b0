//! GitHub release download and asset extraction
//!
//! ## Module Organization
//!
//! - `platform` - Host target detection and asset naming
//! - `github` - GitHub API interaction for release discovery
//! - `extract` - `.tar.gz` unpacking
//! - `core` - Download orchestration and caching

mod core;
mod extract;
mod github;
mod platform;

use std::path::PathBuf;

pub(crate) use self::core::asset_not_found;
pub use extract::{ensure_executable, unpack_tar_gz};
pub use github::{Asset, DEFAULT_API_URL, GitHubClient, Release, ReleaseSource, Repo};
pub use platform::{Target, asset_name};

#[cfg(test)]
pub(crate) use extract::tests::write_tar_gz;

/// Options for [`ReleaseSource::download_asset`]
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    /// Reuse a previously unpacked copy of the same asset
    pub cache: bool,
    /// Cache location, defaults to the user cache directory
    pub cache_root: Option<PathBuf>,
}

impl DownloadOptions {
    /// Directory a given asset is cached in, if a cache root is known
    pub fn cache_dir(&self, repo: &Repo, tag: &str, asset: &str) -> Option<PathBuf> {
        let root = self
            .cache_root
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join("release-runner")))?;
        let asset = asset.strip_suffix(".tar.gz").unwrap_or(asset);
        Some(
            root.join(format!("{}_{}", repo.owner, repo.name))
                .join(tag)
                .join(asset),
        )
    }
}
