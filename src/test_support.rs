//! In-memory release source, launcher and logger for tests

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use log::{Level, LevelFilter, Metadata, Record};
use tempfile::TempDir;

use crate::download::{
    Asset, DownloadOptions, Release, ReleaseSource, Repo, asset_not_found, unpack_tar_gz,
};
use crate::error::{DownloadError, GitHubError, RunError};
use crate::exec::Launcher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Latest,
    ReleaseByTag(String),
    Download(String),
}

pub fn release_with(tag: &str, assets: &[&str]) -> Release {
    Release {
        tag_name: tag.to_string(),
        name: Some(tag.to_string()),
        assets: assets
            .iter()
            .map(|name| Asset {
                name: name.to_string(),
                browser_download_url: format!("https://example.invalid/{tag}/{name}"),
                size: 0,
            })
            .collect(),
    }
}

pub struct FakeSource {
    repo: Repo,
    release: Option<Release>,
    fail_download: bool,
    archive: Option<PathBuf>,
    binary: String,
    calls: Mutex<Vec<Call>>,
    dirs: Mutex<Vec<TempDir>>,
}

impl FakeSource {
    pub fn new(release: Release) -> Self {
        Self {
            repo: Repo {
                owner: "romnn".to_string(),
                name: "publish-crates".to_string(),
            },
            release: Some(release),
            fail_download: false,
            archive: None,
            binary: "publish-crates-action".to_string(),
            calls: Mutex::new(Vec::new()),
            dirs: Mutex::new(Vec::new()),
        }
    }

    /// Every release lookup answers 404
    pub fn failing_lookup() -> Self {
        Self {
            release: None,
            ..Self::new(release_with("unused", &[]))
        }
    }

    pub fn failing_download(mut self) -> Self {
        self.fail_download = true;
        self
    }

    /// Unpack `archive` on download instead of fabricating the binary
    pub fn serving(mut self, archive: PathBuf) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn lookup(&self, what: &str) -> Result<Release, GitHubError> {
        self.release.clone().ok_or_else(|| GitHubError::Status {
            url: format!(
                "https://api.github.com/repos/{}/releases/{what}",
                self.repo.full_name()
            ),
            status: reqwest::StatusCode::NOT_FOUND,
            body: r#"{"message":"Not Found"}"#.to_string(),
        })
    }
}

impl ReleaseSource for FakeSource {
    fn repo(&self) -> &Repo {
        &self.repo
    }

    async fn latest_release(&self) -> Result<Release, GitHubError> {
        self.record(Call::Latest);
        self.lookup("latest")
    }

    async fn release_by_tag(&self, tag: &str) -> Result<Release, GitHubError> {
        self.record(Call::ReleaseByTag(tag.to_string()));
        self.lookup(&format!("tags/{tag}"))
    }

    async fn download_asset(
        &self,
        release: &Release,
        asset: &str,
        _options: &DownloadOptions,
    ) -> Result<PathBuf, DownloadError> {
        self.record(Call::Download(asset.to_string()));
        if self.fail_download {
            return Err(GitHubError::Status {
                url: format!("https://example.invalid/{asset}"),
                status: reqwest::StatusCode::BAD_GATEWAY,
                body: String::new(),
            }
            .into());
        }
        if release.asset(asset).is_none() {
            return Err(asset_not_found(release, asset));
        }

        let dir = tempfile::tempdir()?;
        let out = dir.path().to_path_buf();
        match &self.archive {
            Some(archive) => {
                unpack_tar_gz(archive, &out).await?;
            }
            None => std::fs::write(out.join(&self.binary), b"")?,
        }
        self.dirs.lock().unwrap().push(dir);
        Ok(out)
    }
}

/// Records launches instead of spawning processes
#[derive(Default)]
pub struct FakeLauncher {
    exit_code: Option<i32>,
    launched: Mutex<Vec<PathBuf>>,
}

impl FakeLauncher {
    pub fn exiting_with(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            ..Self::default()
        }
    }

    pub fn launched(&self) -> Vec<PathBuf> {
        self.launched.lock().unwrap().clone()
    }
}

impl Launcher for FakeLauncher {
    async fn launch(&self, program: &Path) -> Result<(), RunError> {
        self.launched.lock().unwrap().push(program.to_path_buf());
        match self.exit_code {
            Some(code) if code != 0 => Err(RunError::ExitStatus {
                path: program.to_path_buf(),
                code: Some(code),
            }),
            _ => Ok(()),
        }
    }
}

thread_local! {
    static CAPTURED: RefCell<Option<Vec<(Level, String)>>> = const { RefCell::new(None) };
}

/// Routes records to the calling test's thread so parallel tests stay apart
struct CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let message = record.args().to_string();
        CAPTURED.with(|captured| {
            if let Some(records) = captured.borrow_mut().as_mut() {
                records.push((record.level(), message));
            }
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INSTALL: Once = Once::new();

/// Run `f` and return what it logged on this thread
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, Vec<(Level, String)>) {
    INSTALL.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
    CAPTURED.with(|captured| *captured.borrow_mut() = Some(Vec::new()));
    let out = f();
    let records = CAPTURED.with(|captured| captured.borrow_mut().take().unwrap_or_default());
    (out, records)
}
