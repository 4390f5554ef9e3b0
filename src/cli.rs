use std::path::PathBuf;

use clap::Parser;

use crate::config::DEFAULT_BINARY;

/// Command-line arguments; action inputs arrive as `INPUT_*` variables
///
/// Boolean inputs are not bound through clap's `env` since the runner sets
/// them to `""` when unset and users spell them `True` or `false`; they
/// are merged in [`RunnerConfig::from_args`](crate::RunnerConfig::from_args).
#[derive(Parser, Debug, Clone)]
#[command(name = "release-runner", disable_version_flag = true)]
#[command(about = "Download a prebuilt action binary from GitHub releases and run it")]
pub struct Args {
    /// Release tag to run, `latest` for the newest release
    ///
    /// Defaults to `v` + the version in the manifest.
    #[arg(long, env = "INPUT_VERSION")]
    pub version: Option<String>,

    /// Repository publishing the releases (`owner/name`)
    #[arg(long)]
    pub repo: Option<String>,

    /// Name of the binary inside the release archive
    #[arg(long, default_value = DEFAULT_BINARY)]
    pub binary: String,

    /// Manifest to read the default version from
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Reuse previously downloaded assets (or `INPUT_CACHE`)
    #[arg(long)]
    pub cache: bool,

    /// Cache location (defaults to the user cache directory)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Add the unpacked directory to PATH for subsequent steps (or `INPUT_ADD-PATH`)
    #[arg(long)]
    pub add_path: bool,

    /// Fail before downloading if the release lacks the expected asset
    /// (or `INPUT_VALIDATE-ASSET`)
    #[arg(long)]
    pub validate_asset: bool,

    /// GitHub token (falls back to GITHUB_TOKEN)
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitHub API base url (falls back to GITHUB_API_URL)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Override the detected platform, e.g. `linux` or `darwin`
    #[arg(long)]
    pub target_platform: Option<String>,

    /// Override the detected architecture, e.g. `x86_64`
    #[arg(long)]
    pub target_arch: Option<String>,
}
