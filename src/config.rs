use std::path::PathBuf;

use crate::actions::{input_key, parse_bool_input};
use crate::cli::Args;
use crate::download::{DEFAULT_API_URL, DownloadOptions, Repo, Target};
use crate::error::RunError;

/// Binary shipped in the release archives
pub const DEFAULT_BINARY: &str = "publish-crates-action";

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub version: Option<String>,
    pub repo: Repo,
    pub binary: String,
    pub manifest: PathBuf,
    pub target: Target,
    pub api_url: String,
    pub token: Option<String>,
    pub download: DownloadOptions,
    /// Register the unpacked directory on PATH for later steps
    pub add_path: bool,
    /// Check the asset exists in the release before downloading
    pub validate_asset: bool,
}

impl RunnerConfig {
    /// Combine CLI arguments with the Actions environment
    ///
    /// `env` looks up environment variables so the fallbacks can be tested
    /// without touching the process environment.
    pub fn from_args(args: Args, env: impl Fn(&str) -> Option<String>) -> Result<Self, RunError> {
        let non_empty = |key: &str| env(key).filter(|v| !v.is_empty());
        // a flag on the command line wins, otherwise the action input decides
        let flag = |set: bool, input: &str| -> Result<bool, RunError> {
            if set {
                return Ok(true);
            }
            let value = env(&input_key(input));
            Ok(parse_bool_input(input, value.as_deref())?.unwrap_or(false))
        };

        let cache = flag(args.cache, "cache")?;
        if args.cache_dir.is_some() && !cache {
            return Err(RunError::Config(
                "--cache-dir has no effect without --cache".to_string(),
            ));
        }

        let repo = args
            .repo
            .filter(|r| !r.is_empty())
            .or_else(|| non_empty("GITHUB_ACTION_REPOSITORY"))
            .or_else(|| non_empty("GITHUB_REPOSITORY"))
            .ok_or_else(|| {
                RunError::Config(
                    "no repository given, pass --repo or set GITHUB_ACTION_REPOSITORY".to_string(),
                )
            })?;
        let repo: Repo = repo
            .parse()
            .map_err(|e: crate::error::GitHubError| RunError::Config(e.to_string()))?;

        let manifest = match args.manifest {
            Some(path) => path,
            None => non_empty("GITHUB_ACTION_PATH")
                .map(PathBuf::from)
                .unwrap_or_default()
                .join("Cargo.toml"),
        };

        let host = Target::detect();
        let target = Target::new(
            args.target_platform.unwrap_or(host.platform),
            args.target_arch.unwrap_or(host.arch),
        );

        Ok(Self {
            version: args.version.filter(|v| !v.is_empty()),
            repo,
            binary: args.binary,
            manifest,
            target,
            api_url: args
                .api_url
                .filter(|u| !u.is_empty())
                .or_else(|| non_empty("GITHUB_API_URL"))
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            token: args
                .token
                .filter(|t| !t.is_empty())
                .or_else(|| non_empty("GITHUB_TOKEN")),
            download: DownloadOptions {
                cache,
                cache_root: args.cache_dir,
            },
            add_path: flag(args.add_path, "add-path")?,
            validate_asset: flag(args.validate_asset, "validate-asset")?,
        })
    }
}
