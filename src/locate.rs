//! Release lookup for a resolved version

use log::debug;

use crate::download::{Release, ReleaseSource};
use crate::error::RunError;
use crate::version::is_latest;

/// Fetch the release `version` refers to
///
/// `latest` (or an empty string) selects the most recently published
/// release, anything else must match a tag exactly.
pub async fn locate_release(
    source: &impl ReleaseSource,
    version: &str,
) -> Result<Release, RunError> {
    let result = if is_latest(version) {
        source.latest_release().await
    } else {
        source.release_by_tag(version).await
    };

    let release = result.map_err(|source_err| RunError::ReleaseLookup {
        version: version.to_string(),
        repo: source.repo().full_name(),
        source: source_err,
    })?;

    debug!(
        "found {} assets for {} release {} of {}",
        release.assets.len(),
        version,
        release.name.as_deref().unwrap_or(&release.tag_name),
        source.repo().full_name()
    );
    Ok(release)
}
