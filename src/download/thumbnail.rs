//! Thumbnail resolution for video uploads.
//!
//! A caller may hand over an existing image, which is used as-is and never
//! deleted. Otherwise a frame is grabbed from the video with ffmpeg into a
//! `thumb_{timestamp}.jpg` file owned by the upload.

use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::core::config::upload::{THUMBNAIL_OFFSET_SECS, THUMBNAIL_SENTINELS};
use crate::core::utils::unix_micros;
use crate::download::temp;
use crate::download::tools::ExternalTool;

/// Thumbnail requested by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Thumbnail {
    /// No thumbnail supplied, generate one from the video
    Generate,
    /// Caller-owned image path
    Provided(PathBuf),
}

impl Thumbnail {
    /// Parses the thumbnail argument: `/d`, `no` or an empty string mean "generate".
    pub fn from_arg(arg: &str) -> Self {
        let arg = arg.trim();
        if arg.is_empty() || THUMBNAIL_SENTINELS.contains(&arg) {
            Thumbnail::Generate
        } else {
            Thumbnail::Provided(PathBuf::from(arg))
        }
    }
}

/// Thumbnail ready for upload. A generated file is deleted when this is dropped.
#[derive(Debug, Default)]
pub struct ResolvedThumbnail {
    provided: Option<PathBuf>,
    generated: Option<TempPath>,
}

impl ResolvedThumbnail {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.generated.as_deref().or(self.provided.as_deref())
    }

    /// Deletes a generated thumbnail now; a provided one is left alone.
    pub fn cleanup(self) {
        if let Some(generated) = self.generated {
            temp::discard(generated);
        }
    }
}

/// Path for a freshly generated thumbnail inside `temp_dir`.
pub fn generated_thumbnail_path(temp_dir: &Path) -> PathBuf {
    temp_dir.join(format!("thumb_{}.jpg", unix_micros()))
}

/// Resolves the thumbnail for `video`.
///
/// A provided path that exists is used directly. A missing path or
/// [`Thumbnail::Generate`] triggers frame extraction at the 5 second mark; if that
/// fails the upload continues without a thumbnail.
pub async fn resolve_thumbnail(
    tool: &dyn ExternalTool,
    video: &Path,
    thumbnail: &Thumbnail,
    temp_dir: &Path,
) -> ResolvedThumbnail {
    if let Thumbnail::Provided(path) = thumbnail {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            log::info!("[THUMBNAIL] Using provided thumbnail {}", path.display());
            return ResolvedThumbnail {
                provided: Some(path.clone()),
                generated: None,
            };
        }
        log::warn!(
            "[THUMBNAIL] Provided thumbnail {} does not exist, generating one",
            path.display()
        );
    }

    let output = temp::adopt(generated_thumbnail_path(temp_dir));
    if let Err(e) = tool.extract_frame(video, THUMBNAIL_OFFSET_SECS, &output).await {
        log::warn!("[THUMBNAIL] Frame extraction failed: {}", e);
    }

    if tokio::fs::try_exists(&output).await.unwrap_or(false) {
        log::info!("[THUMBNAIL] Generated thumbnail {}", output.display());
        ResolvedThumbnail {
            provided: None,
            generated: Some(output),
        }
    } else {
        log::warn!("[THUMBNAIL] No thumbnail produced, uploading without one");
        ResolvedThumbnail::none()
    }
}
