//! Host target detection and release asset naming

use once_cell::sync::OnceCell;

/// Normalized (platform, arch) pair of the machine we run on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub platform: String,
    pub arch: String,
}

/// Global cache for host detection (initialized once, used everywhere)
static HOST_TARGET: OnceCell<Target> = OnceCell::new();

impl Target {
    pub fn new(platform: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            arch: arch.into(),
        }
    }

    /// Detect the host target (cached after first call)
    pub fn detect() -> Target {
        HOST_TARGET
            .get_or_init(|| Self::from_consts(std::env::consts::OS, std::env::consts::ARCH))
            .clone()
    }

    /// Normalize `std::env::consts` values into release naming
    fn from_consts(os: &str, arch: &str) -> Self {
        let platform = match os {
            "macos" => "darwin",
            other => other,
        };
        Self::new(platform, arch)
    }

    /// Expected asset file name of `binary` built for this target
    pub fn asset_name(&self, binary: &str) -> String {
        asset_name(binary, &self.arch, &self.platform)
    }
}

/// `{binary}-{arch}-unknown-{platform}-gnu.tar.gz`
///
/// Pure formatting; whether the release actually carries this asset is only
/// known once we look at its asset list.
pub fn asset_name(binary: &str, arch: &str, platform: &str) -> String {
    format!("{binary}-{arch}-unknown-{platform}-gnu.tar.gz")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_asset_name() {
        assert_eq!(
            asset_name("bin", "x86_64", "linux"),
            "bin-x86_64-unknown-linux-gnu.tar.gz"
        );
        assert_eq!(
            Target::new("darwin", "arm64").asset_name("publish-crates-action"),
            "publish-crates-action-arm64-unknown-darwin-gnu.tar.gz"
        );
    }

    #[test]
    fn macos_is_reported_as_darwin() {
        assert_eq!(
            Target::from_consts("macos", "aarch64"),
            Target::new("darwin", "aarch64")
        );
        assert_eq!(
            Target::from_consts("linux", "x86_64"),
            Target::new("linux", "x86_64")
        );
    }

    #[test]
    fn detection_is_stable() {
        let first = Target::detect();
        assert_eq!(first, Target::detect());
        assert!(!first.platform.is_empty());
        assert!(!first.arch.is_empty());
    }
}
