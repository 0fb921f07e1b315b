//! Upload progress tracking and the status text shown in the channel.

use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, ReadBuf};

use crate::core::utils::{format_duration, format_megabytes};

/// Tracks the number of bytes sent during an upload.
///
/// Clones share the same counter, so the status updater can read what the
/// upload stream has consumed.
#[derive(Clone, Debug, Default)]
pub struct UploadProgress {
    bytes_sent: Arc<AtomicU64>,
}

impl UploadProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bytes(&self, bytes: usize) {
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Relaxed)
    }
}

/// An `AsyncRead` wrapper that reports every byte read to an [`UploadProgress`].
pub struct ProgressReader<R> {
    inner: R,
    progress: UploadProgress,
}

impl<R> ProgressReader<R> {
    pub fn new(inner: R, progress: UploadProgress) -> Self {
        Self { inner, progress }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ProgressReader<R> {
    fn poll_read(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<std::io::Result<()>> {
        let before = buf.filled().len();
        let poll = Pin::new(&mut self.inner).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = &poll {
            let after = buf.filled().len();
            if after > before {
                self.progress.add_bytes(after - before);
            }
        }
        poll
    }
}

/// Snapshot of one upload's progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UploadStats {
    pub sent: u64,
    pub total: u64,
    pub percent: u8,
    /// Bytes per second, `None` before the first byte
    pub speed: Option<f64>,
    pub eta_secs: Option<u64>,
}

impl UploadStats {
    pub fn compute(sent: u64, total: u64, elapsed: Duration) -> Self {
        let sent = sent.min(total);
        let percent = if total == 0 {
            100
        } else {
            ((sent as f64 / total as f64) * 100.0) as u8
        };

        let elapsed_secs = elapsed.as_secs_f64();
        let speed = if sent > 0 && elapsed_secs > 0.0 {
            Some(sent as f64 / elapsed_secs)
        } else {
            None
        };

        let remaining = total.saturating_sub(sent);
        let eta_secs = match speed {
            Some(speed) if speed > 0.0 => Some((remaining as f64 / speed) as u64),
            _ => None,
        };

        Self {
            sent,
            total,
            percent,
            speed,
            eta_secs,
        }
    }
}

/// `[█████░░░░░]` for 50%.
pub fn progress_bar(percent: u8) -> String {
    let percent = percent.min(100) as usize;
    let filled = percent / 10;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(10 - filled))
}

/// First line of the channel status message for an upload.
pub fn uploading_header(display_name: &str) -> String {
    format!("📤 Uploading: {}", display_name)
}

/// Full status text: header, bar with percent, sizes, then speed and ETA when known.
pub fn format_upload_status(display_name: &str, stats: &UploadStats) -> String {
    let mut text = uploading_header(display_name);
    text.push_str(&format!("\n\n{} {}%", progress_bar(stats.percent), stats.percent));
    text.push_str(&format!(
        "\n📦 {} / {}",
        format_megabytes(stats.sent),
        format_megabytes(stats.total)
    ));
    if let Some(speed) = stats.speed {
        text.push_str(&format!("\n🚀 {}/s", format_megabytes(speed as u64)));
    }
    if let Some(eta) = stats.eta_secs {
        text.push_str(&format!("\n⏱ ETA: {}", format_duration(eta)));
    }
    text
}
