//! Temporary artifacts of an upload.
//!
//! Files are held as [`tempfile::TempPath`], so a source, segment or generated
//! thumbnail is deleted when its guard drops, including on `?` error paths.

use std::path::PathBuf;

use tempfile::TempPath;

/// Takes ownership of an existing file. It is deleted when the returned guard drops.
pub fn adopt(path: impl Into<PathBuf>) -> TempPath {
    TempPath::from_path(path)
}

/// Deletes `temp` now. A file that is already gone is not an error.
pub fn discard(temp: TempPath) {
    let path = temp.to_path_buf();
    match temp.close() {
        Ok(()) => log::debug!("Removed temporary file {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
    }
}
