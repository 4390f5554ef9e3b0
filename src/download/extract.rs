//! Unpacking of `.tar.gz` release assets

use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use log::debug;
use tar::Archive;

use crate::error::DownloadError;

/// Unpack a gzipped tarball into `output_dir`
///
/// Runs on the blocking pool since decompression is CPU-bound.
pub async fn unpack_tar_gz(
    archive_path: &Path,
    output_dir: &Path,
) -> Result<PathBuf, DownloadError> {
    tokio::fs::create_dir_all(output_dir).await?;

    let archive_path = archive_path.to_path_buf();
    let output_dir = output_dir.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let unpack = || -> std::io::Result<()> {
            let tar_gz_file = std::fs::File::open(&archive_path)?;
            let tar = GzDecoder::new(tar_gz_file);
            let mut archive = Archive::new(tar);
            archive.set_preserve_permissions(true);
            archive.unpack(&output_dir)
        };
        unpack().map_err(|source| DownloadError::Extract {
            path: archive_path.clone(),
            source,
        })?;
        debug!(
            "unpacked {} into {}",
            archive_path.display(),
            output_dir.display()
        );
        Ok::<PathBuf, DownloadError>(output_dir)
    })
    .await?
}

/// Make sure `path` carries the executable bit
///
/// Archives built on some hosts lose the mode bits; the binary has to be
/// runnable either way.
#[cfg(unix)]
pub fn ensure_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)?.permissions();
    if perms.mode() & 0o111 == 0 {
        perms.set_mode(perms.mode() | 0o755);
        std::fs::set_permissions(path, perms)?;
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn ensure_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
