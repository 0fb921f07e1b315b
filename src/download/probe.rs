//! Best-effort duration probing.

use std::path::Path;

use crate::download::tools::ExternalTool;

/// Duration of a media file, or `Unknown` when it could not be determined.
///
/// Callers must branch on `Unknown` instead of treating 0 as a real duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaDuration {
    Known(f64),
    Unknown,
}

impl MediaDuration {
    /// Builds a duration from a probed value; non-finite or non-positive values are `Unknown`.
    pub fn from_secs(secs: f64) -> Self {
        if secs.is_finite() && secs > 0.0 {
            MediaDuration::Known(secs)
        } else {
            MediaDuration::Unknown
        }
    }

    /// Seconds, 0.0 when unknown.
    pub fn as_secs_f64(&self) -> f64 {
        match self {
            MediaDuration::Known(secs) => *secs,
            MediaDuration::Unknown => 0.0,
        }
    }

    /// Whole seconds (truncated) for display fields, 0 when unknown.
    pub fn as_whole_secs(&self) -> u32 {
        self.as_secs_f64().trunc().min(u32::MAX as f64) as u32
    }
}

/// Probes the playback duration of `path`.
///
/// Never fails: a missing tool, non-zero exit or unparsable output is logged and
/// reported as [`MediaDuration::Unknown`].
pub async fn probe_duration(tool: &dyn ExternalTool, path: &Path) -> MediaDuration {
    match tool.probe_duration(path).await {
        Ok(secs) => {
            let duration = MediaDuration::from_secs(secs);
            log::debug!("Probed duration of {}: {:?}", path.display(), duration);
            duration
        }
        Err(e) => {
            log::warn!("Duration probe failed for {}: {}", path.display(), e);
            MediaDuration::Unknown
        }
    }
}
