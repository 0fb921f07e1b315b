//! External media tools behind a single capability trait.
//!
//! The pipeline never spawns ffmpeg/ffprobe directly: it goes through
//! [`ExternalTool`], which returns `AppResult` values instead of leaving exit-code
//! inspection to every caller. Tests substitute a fake implementation.

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::core::process::{run_silent, run_with_timeout};

/// Media inspection and remux operations used by the splitter and uploader.
#[async_trait]
pub trait ExternalTool: Send + Sync {
    /// Container duration in seconds.
    async fn probe_duration(&self, path: &Path) -> AppResult<f64>;

    /// Stream-copies `length_secs` seconds starting at `start_secs` into `output`.
    async fn remux(&self, input: &Path, start_secs: u64, length_secs: u64, output: &Path) -> AppResult<()>;

    /// Writes a single frame taken `offset_secs` into the video as an image.
    async fn extract_frame(&self, input: &Path, offset_secs: u64, output: &Path) -> AppResult<()>;
}

/// [`ExternalTool`] backed by the ffmpeg/ffprobe binaries.
#[derive(Debug, Clone)]
pub struct FfmpegTool {
    ffmpeg_bin: String,
    ffprobe_bin: String,
}

impl FfmpegTool {
    pub fn new(ffmpeg_bin: impl Into<String>, ffprobe_bin: impl Into<String>) -> Self {
        Self {
            ffmpeg_bin: ffmpeg_bin.into(),
            ffprobe_bin: ffprobe_bin.into(),
        }
    }

    /// Uses the binaries from `FFMPEG_BIN` / `FFPROBE_BIN`.
    pub fn from_config() -> Self {
        Self::new(config::FFMPEG_BIN.as_str(), config::FFPROBE_BIN.as_str())
    }
}

impl Default for FfmpegTool {
    fn default() -> Self {
        Self::from_config()
    }
}

/// Formats an offset as `HH:MM:SS` for ffmpeg's `-ss`.
pub fn format_timestamp(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Parses ffprobe's bare `format=duration` output.
pub fn parse_duration_output(stdout: &str) -> AppResult<f64> {
    stdout
        .trim()
        .parse::<f64>()
        .map_err(|_| AppError::Media(format!("Failed to parse duration from {:?}", stdout.trim())))
}

#[async_trait]
impl ExternalTool for FfmpegTool {
    async fn probe_duration(&self, path: &Path) -> AppResult<f64> {
        let mut cmd = Command::new(&self.ffprobe_bin);
        cmd.args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path);

        let output = run_with_timeout(&mut cmd, config::ffmpeg::FFPROBE_TIMEOUT).await?;
        if !output.status.success() {
            return Err(AppError::Media(format!(
                "ffprobe failed for {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_duration_output(&String::from_utf8_lossy(&output.stdout))
    }

    async fn remux(&self, input: &Path, start_secs: u64, length_secs: u64, output: &Path) -> AppResult<()> {
        log::info!(
            "Remuxing {} [{}s +{}s] -> {}",
            input.display(),
            start_secs,
            length_secs,
            output.display()
        );
        let mut cmd = Command::new(&self.ffmpeg_bin);
        cmd.arg("-y")
            .arg("-i")
            .arg(input)
            .args(["-ss", start_secs.to_string().as_str(), "-t", length_secs.to_string().as_str()])
            .args(["-c", "copy", "-map", "0"])
            .arg(output);

        run_silent(&mut cmd, config::ffmpeg::remux_timeout()).await
    }

    async fn extract_frame(&self, input: &Path, offset_secs: u64, output: &Path) -> AppResult<()> {
        log::info!(
            "[THUMBNAIL] Extracting frame at {}s from {} -> {}",
            offset_secs,
            input.display(),
            output.display()
        );
        let mut cmd = Command::new(&self.ffmpeg_bin);
        cmd.arg("-i")
            .arg(input)
            .args(["-ss", format_timestamp(offset_secs).as_str(), "-vframes", "1", "-y"])
            .arg(output);

        run_silent(&mut cmd, config::ffmpeg::FRAME_TIMEOUT).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(5), "00:00:05");
        assert_eq!(format_timestamp(3725), "01:02:05");
    }

    #[test]
    fn test_parse_duration_output() {
        assert!((parse_duration_output("600.040000\n").unwrap() - 600.04).abs() < 1e-9);
        assert!(parse_duration_output("N/A\n").is_err());
        assert!(parse_duration_output("").is_err());
    }

    #[tokio::test]
    async fn test_missing_ffprobe_is_error() {
        let tool = FfmpegTool::new("no-such-ffmpeg-vidrelay", "no-such-ffprobe-vidrelay");
        let result = tool.probe_duration(Path::new("missing.mp4")).await;
        assert!(result.is_err());
    }
}
