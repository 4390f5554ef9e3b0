//! Asset download orchestration

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use log::{debug, info};
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;

use super::DownloadOptions;
use super::extract::unpack_tar_gz;
use super::github::{GitHubClient, Release, ReleaseSource};
use crate::error::{DownloadError, GitHubError};

const DOWNLOAD_CONNECT_TIMEOUT: Duration = Duration::from_secs(30); // Initial connection
const DOWNLOAD_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(300); // 5 min no data

/// Marker written once a cached asset has been fully unpacked
const CACHE_MARKER: &str = ".release-runner-complete";

/// Find `asset_name` in `release`, download it and unpack it
pub(crate) async fn download_and_unpack(
    client: &GitHubClient,
    release: &Release,
    asset_name: &str,
    options: &DownloadOptions,
) -> Result<PathBuf, DownloadError> {
    let asset = release
        .asset(asset_name)
        .ok_or_else(|| asset_not_found(release, asset_name))?;

    let cache_dir = options
        .cache_dir(client.repo(), &release.tag_name, asset_name)
        .filter(|_| options.cache);
    if let Some(dir) = &cache_dir
        && dir.join(CACHE_MARKER).is_file()
    {
        info!("using cached {} from {}", asset_name, dir.display());
        return Ok(dir.clone());
    }

    let staging = tempfile::tempdir()?;
    let archive_path = staging.path().join(&asset.name);
    fetch_to_file(
        client,
        &asset.browser_download_url,
        asset.size,
        &archive_path,
    )
    .await?;

    let output_dir = match cache_dir {
        Some(dir) => dir,
        // lives until the process exits, nothing cleans it up
        None => tempfile::Builder::new()
            .prefix("release-runner-")
            .tempdir()?
            .keep(),
    };

    let unpacked = unpack_tar_gz(&archive_path, &output_dir).await?;
    if options.cache {
        tokio::fs::write(unpacked.join(CACHE_MARKER), release.tag_name.as_bytes()).await?;
    }
    Ok(unpacked)
}

pub(crate) fn asset_not_found(release: &Release, asset_name: &str) -> DownloadError {
    let available = release.asset_names();
    DownloadError::AssetNotFound {
        tag: release.tag_name.clone(),
        asset: asset_name.to_string(),
        available: if available.is_empty() {
            "none".to_string()
        } else {
            available.join(", ")
        },
    }
}

/// Stream `url` into `dest`, failing if the connection goes quiet
async fn fetch_to_file(
    client: &GitHubClient,
    url: &str,
    total_bytes: u64,
    dest: &Path,
) -> Result<(), DownloadError> {
    let http = reqwest::Client::builder()
        .connect_timeout(DOWNLOAD_CONNECT_TIMEOUT)
        .user_agent(concat!("release-runner/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|source| http_error(url, source))?;

    let mut request = http.get(url);
    if let Some(token) = client.token() {
        request = request.bearer_auth(token);
    }
    let response = request.send().await.map_err(|source| http_error(url, source))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(GitHubError::Status {
            url: url.to_string(),
            status,
            body,
        }
        .into());
    }

    debug!("downloading {url} ({total_bytes} bytes)");
    let mut file = tokio::fs::File::create(dest).await?;
    let mut downloaded: u64 = 0;
    let mut stream = response.bytes_stream();

    loop {
        let chunk = match timeout(DOWNLOAD_INACTIVITY_TIMEOUT, stream.next()).await {
            Ok(Some(Ok(chunk))) => chunk,
            Ok(Some(Err(source))) => return Err(http_error(url, source)),
            Ok(None) => break,
            Err(_) => {
                return Err(DownloadError::Stalled {
                    secs: DOWNLOAD_INACTIVITY_TIMEOUT.as_secs(),
                    downloaded,
                    total: total_bytes,
                });
            }
        };

        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
    }

    file.flush().await?;
    debug!("downloaded {downloaded} bytes to {}", dest.display());
    Ok(())
}

fn http_error(url: &str, source: reqwest::Error) -> DownloadError {
    GitHubError::Http {
        url: url.to_string(),
        source,
    }
    .into()
}
