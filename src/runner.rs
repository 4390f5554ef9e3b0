//! The release runner: resolve, locate, download, execute
//!
//! Every step runs once, strictly in order. Only errors for which
//! [`RunError::is_recoverable`] holds are recovered from (a manifest failure
//! falls back to `latest`); any other error ends the run.

use std::path::PathBuf;

use log::{debug, info};

use crate::actions;
use crate::config::RunnerConfig;
use crate::download::{
    DownloadOptions, ReleaseSource, Target, asset_not_found, ensure_executable,
};
use crate::error::{DownloadError, ManifestError, RunError};
use crate::exec::Launcher;
use crate::locate::locate_release;
use crate::version::{Manifest, resolve_version};

/// What a completed run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub version: String,
    pub tag: String,
    pub asset: String,
    pub executable: PathBuf,
}

/// Inputs to [`run`] that do not depend on the release source
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub version: Option<String>,
    pub binary: String,
    pub target: Target,
    pub download: DownloadOptions,
    pub add_path: bool,
    pub validate_asset: bool,
}

impl From<&RunnerConfig> for RunPlan {
    fn from(config: &RunnerConfig) -> Self {
        Self {
            version: config.version.clone(),
            binary: config.binary.clone(),
            target: config.target.clone(),
            download: config.download.clone(),
            add_path: config.add_path,
            validate_asset: config.validate_asset,
        }
    }
}

/// Run the whole sequence once
///
/// `manifest` is the result of reading the manifest at startup; it is only
/// consulted when the plan carries no version override.
pub async fn run(
    plan: &RunPlan,
    manifest: Result<Manifest, ManifestError>,
    source: &impl ReleaseSource,
    launcher: &impl Launcher,
) -> Result<RunSummary, RunError> {
    let resolved = resolve_version(plan.version.as_deref(), manifest.map_err(RunError::from))?;
    info!("resolved version {}", resolved.version);

    let release = locate_release(source, &resolved.version).await?;

    let target = &plan.target;
    debug!(
        "host system: platform={} arch={}",
        target.platform, target.arch
    );

    let asset = target.asset_name(&plan.binary);
    if plan.validate_asset && release.asset(&asset).is_none() {
        return Err(RunError::Download {
            source: asset_not_found(&release, &asset),
            asset,
        });
    }

    info!("downloading {asset} from {}", release.tag_name);
    let downloaded = source
        .download_asset(&release, &asset, &plan.download)
        .await
        .map_err(|source| RunError::Download {
            asset: asset.clone(),
            source,
        })?;

    if plan.add_path {
        actions::add_path(&downloaded).map_err(|source| RunError::AddPath {
            path: downloaded.clone(),
            source,
        })?;
        debug!("added {} to PATH", downloaded.display());
    }

    let executable = downloaded.join(&plan.binary);
    if !executable.is_file() {
        return Err(RunError::Download {
            source: DownloadError::MissingBinary {
                binary: plan.binary.clone(),
                dir: downloaded,
            },
            asset,
        });
    }
    ensure_executable(&executable).map_err(|source| RunError::Download {
        asset: asset.clone(),
        source: DownloadError::Io(source),
    })?;
    launcher.launch(&executable).await?;

    Ok(RunSummary {
        version: resolved.version,
        tag: release.tag_name,
        asset,
        executable,
    })
}
