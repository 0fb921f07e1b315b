//! Time-based splitting of oversized videos.
//!
//! Segments are cut by equal duration, not equal bytes, with ffmpeg stream copy.
//! Cuts land on keyframes, so segment sizes and lengths are approximate.

use std::path::{Path, PathBuf};

use crate::core::config::upload::MIB;
use crate::core::error::AppResult;
use crate::core::utils::strip_extension;
use crate::download::probe::{probe_duration, MediaDuration};
use crate::download::tools::ExternalTool;

/// One planned segment: 1-based index plus start offset and length in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSpec {
    pub index: u64,
    pub start_secs: u64,
    pub length_secs: u64,
}

/// Plans the segments for a file of `size_bytes` and `duration_secs`.
///
/// Returns `None` when the file fits in `max_bytes`. Otherwise the file is cut
/// into `ceil(size / max_bytes)` parts of `duration / count` seconds each; start
/// and length are floored to whole seconds.
pub fn segment_plan(size_bytes: u64, max_bytes: u64, duration_secs: f64) -> Option<Vec<SegmentSpec>> {
    if max_bytes == 0 || size_bytes <= max_bytes {
        return None;
    }

    let count = size_bytes.div_ceil(max_bytes);
    let part_duration = duration_secs / count as f64;

    Some(
        (0..count)
            .map(|i| SegmentSpec {
                index: i + 1,
                start_secs: (part_duration * i as f64).floor() as u64,
                length_secs: part_duration.floor() as u64,
            })
            .collect(),
    )
}

/// `{base}_part{index}.mp4`, where `base` is `path` without its final extension.
pub fn segment_path(path: &Path, index: u64) -> PathBuf {
    let mut name = strip_extension(path).into_os_string();
    name.push(format!("_part{}.mp4", index));
    PathBuf::from(name)
}

/// Splits `path` into parts no larger than `max_size_mb` MiB if needed.
///
/// - Within the limit: returns `[path]` unchanged.
/// - Duration unknown: returns `[path]`; boundaries are time-based, so no blind split.
/// - Otherwise returns the segments that were actually written. A failed remux is
///   logged and skipped, so the list can be shorter than the planned count.
///
/// The source file is never modified or removed here.
pub async fn split_if_needed(tool: &dyn ExternalTool, path: &Path, max_size_mb: u64) -> AppResult<Vec<PathBuf>> {
    let size_bytes = fs_err::tokio::metadata(path).await?.len();
    let max_bytes = max_size_mb * MIB;

    if size_bytes <= max_bytes {
        log::info!(
            "Video size {} is within limit {}, no splitting needed",
            size_bytes,
            max_bytes
        );
        return Ok(vec![path.to_path_buf()]);
    }

    let duration = match probe_duration(tool, path).await {
        MediaDuration::Known(secs) => secs,
        MediaDuration::Unknown => {
            log::warn!(
                "Cannot split {} ({} bytes): duration unknown, uploading as a single file",
                path.display(),
                size_bytes
            );
            return Ok(vec![path.to_path_buf()]);
        }
    };

    let Some(plan) = segment_plan(size_bytes, max_bytes, duration) else {
        return Ok(vec![path.to_path_buf()]);
    };

    log::info!(
        "Splitting video (size: {} MB, duration: {:.1}s) into {} parts",
        size_bytes / MIB,
        duration,
        plan.len()
    );

    let mut parts = Vec::with_capacity(plan.len());
    for part in &plan {
        let output = segment_path(path, part.index);
        if let Err(e) = tool.remux(path, part.start_secs, part.length_secs, &output).await {
            log::warn!("Remux of part {} failed: {}", part.index, e);
        }
        if tokio::fs::try_exists(&output).await.unwrap_or(false) {
            parts.push(output);
        } else {
            log::warn!("Part {} was not produced: {}", part.index, output.display());
        }
    }

    if parts.len() < plan.len() {
        log::warn!(
            "Split of {} produced {}/{} parts",
            path.display(),
            parts.len(),
            plan.len()
        );
    } else {
        log::info!("Successfully split video into {} parts", parts.len());
    }

    Ok(parts)
}
