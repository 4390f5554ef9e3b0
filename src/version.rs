//! Version resolution: explicit override, then manifest, then `latest`

use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;

use crate::error::{ManifestError, RunError};

/// Version string meaning "most recently published release"
pub const LATEST: &str = "latest";

/// Version fields read from a `Cargo.toml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub path: PathBuf,
    pub version: String,
}

#[derive(Deserialize)]
struct RawManifest {
    package: Option<RawPackage>,
    workspace: Option<RawWorkspace>,
}

#[derive(Deserialize)]
struct RawPackage {
    version: Option<RawVersion>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawVersion {
    Plain(String),
    Inherited { workspace: bool },
}

#[derive(Deserialize)]
struct RawWorkspace {
    package: Option<RawWorkspacePackage>,
}

#[derive(Deserialize)]
struct RawWorkspacePackage {
    version: Option<String>,
}

impl Manifest {
    /// Read the manifest once; the result is handed to [`resolve_version`]
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    pub fn parse(path: &Path, content: &str) -> Result<Self, ManifestError> {
        let raw: RawManifest = toml::from_str(content).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let workspace_version = || {
            raw.workspace
                .as_ref()
                .and_then(|ws| ws.package.as_ref())
                .and_then(|pkg| pkg.version.clone())
        };

        let version = match raw.package.as_ref().and_then(|pkg| pkg.version.as_ref()) {
            Some(RawVersion::Plain(version)) => Some(version.clone()),
            Some(RawVersion::Inherited { workspace: true }) => workspace_version(),
            Some(RawVersion::Inherited { workspace: false }) => None,
            // virtual manifest
            None if raw.package.is_none() => workspace_version(),
            None => None,
        };

        match version {
            Some(version) if !version.is_empty() => Ok(Self {
                path: path.to_path_buf(),
                version,
            }),
            _ => Err(ManifestError::MissingVersion {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Where a resolved version came from
#[derive(Debug)]
pub enum VersionSource {
    Override,
    Manifest(PathBuf),
    /// Fell back to `latest` after a recoverable failure
    Latest(RunError),
}

#[derive(Debug)]
pub struct ResolvedVersion {
    pub version: String,
    pub source: VersionSource,
}

impl ResolvedVersion {
    pub fn is_latest(&self) -> bool {
        is_latest(&self.version)
    }
}

/// `latest` and the empty string both select the most recent release
pub fn is_latest(version: &str) -> bool {
    version.is_empty() || version == LATEST
}

/// Pick the version to run
///
/// A non-empty override wins and the manifest is not consulted. Otherwise
/// the manifest version is used with a `v` prefix. A recoverable failure
/// (see [`RunError::is_recoverable`]) only produces a warning and resolution
/// falls back to `latest`; anything else is returned.
pub fn resolve_version(
    override_version: Option<&str>,
    manifest: Result<Manifest, RunError>,
) -> Result<ResolvedVersion, RunError> {
    if let Some(version) = override_version.filter(|v| !v.is_empty()) {
        debug!("using version override {version}");
        return Ok(ResolvedVersion {
            version: version.to_string(),
            source: VersionSource::Override,
        });
    }

    match manifest {
        Ok(manifest) => {
            debug!(
                "using version {} from {}",
                manifest.version,
                manifest.path.display()
            );
            Ok(ResolvedVersion {
                version: format!("v{}", manifest.version),
                source: VersionSource::Manifest(manifest.path),
            })
        }
        Err(err) if err.is_recoverable() => {
            warn!("{err}, falling back to {LATEST}");
            Ok(ResolvedVersion {
                version: LATEST.to_string(),
                source: VersionSource::Latest(err),
            })
        }
        Err(err) => Err(err),
    }
}
