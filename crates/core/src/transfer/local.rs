//! Local destination directory handling.

use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

/// Makes sure `dir` exists, creating intermediate directories as needed.
///
/// Returns `true` when the directory had to be created.
pub async fn ensure_dir(dir: &Path) -> io::Result<bool> {
    if fs::try_exists(dir).await? {
        if !fs::metadata(dir).await?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} exists and is not a directory", dir.display()),
            ));
        }
        return Ok(false);
    }

    fs::create_dir_all(dir).await?;
    Ok(true)
}

/// Removes whatever a failed download left at `path`.
///
/// Returns `true` when a file was removed.
pub async fn discard_partial(path: &Path) -> bool {
    match fs::remove_file(path).await {
        Ok(()) => {
            debug!("Removed partial download {}", path.display());
            true
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            warn!("Failed to remove partial download {}: {}", path.display(), e);
            false
        }
    }
}
