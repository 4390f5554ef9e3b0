//! Error kinds for a single runner invocation
//!
//! Each stage returns a typed error. The top-level runner decides from the
//! kind alone whether a failure falls back to a default or ends the run.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to read a version out of the project manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read manifest {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("manifest {} has no package.version", path.display())]
    MissingVersion { path: PathBuf },
}

/// Malformed action input
#[derive(Error, Debug)]
pub enum InputError {
    #[error("input `{input}` must be a boolean (true/false), got `{value}`")]
    InvalidBool { input: String, value: String },
}

/// Failure talking to the GitHub REST API
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("invalid repository `{0}`, expected `owner/name`")]
    InvalidRepo(String),

    #[error("invalid API url `{url}`")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("API url `{0}` cannot carry a path")]
    NotABase(String),

    #[error("request to {url} failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GitHub API returned {status} for {url}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode release JSON from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Failure fetching or unpacking a release asset
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("release {tag} has no asset named {asset} (available: {available})")]
    AssetNotFound {
        tag: String,
        asset: String,
        available: String,
    },

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error("no data received for {secs} seconds ({downloaded}/{total} bytes)")]
    Stalled { secs: u64, downloaded: u64, total: u64 },

    #[error("failed to unpack archive {}", path.display())]
    Extract {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("archive unpacked into {} has no {binary}", dir.display())]
    MissingBinary { binary: String, dir: PathBuf },

    #[error("extraction task panicked")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Top-level error for one run
#[derive(Error, Debug)]
pub enum RunError {
    /// Recoverable: resolution falls back to `latest`
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("failed to fetch release {version} of {repo}")]
    ReleaseLookup {
        version: String,
        repo: String,
        #[source]
        source: GitHubError,
    },

    #[error("failed to download asset {asset}")]
    Download {
        asset: String,
        #[source]
        source: DownloadError,
    },

    #[error("failed to launch {}", path.display())]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} exited with {}", path.display(), describe_exit(*code))]
    ExitStatus { path: PathBuf, code: Option<i32> },

    #[error("failed to register {} on PATH", path.display())]
    AddPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RunError {
    /// Whether the runner may continue with a default instead of aborting
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RunError::Manifest(_))
    }
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "a signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_manifest_errors_are_recoverable() {
        let manifest = RunError::Manifest(ManifestError::MissingVersion {
            path: PathBuf::from("Cargo.toml"),
        });
        assert!(manifest.is_recoverable());

        let exit = RunError::ExitStatus {
            path: PathBuf::from("/tmp/bin"),
            code: Some(2),
        };
        assert!(!exit.is_recoverable());
        assert_eq!(exit.to_string(), "/tmp/bin exited with exit code 2");
    }

    #[test]
    fn signal_exit_is_described() {
        let exit = RunError::ExitStatus {
            path: PathBuf::from("bin"),
            code: None,
        };
        assert_eq!(exit.to_string(), "bin exited with a signal");
    }
}
