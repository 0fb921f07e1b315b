//! Process execution utilities with timeout support
//!
//! Helpers for running external processes (ffmpeg, ffprobe, yt-dlp) so a hung
//! tool surfaces as an error instead of blocking the pipeline forever.

use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

use crate::core::error::AppError;

/// Run an async Command with a timeout, capturing stdout and stderr.
///
/// Returns the process Output on success, or an AppError on timeout/IO failure.
/// The child is killed when the timeout fires.
pub async fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<Output, AppError> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(AppError::Io(e)),
        Err(_) => Err(AppError::Media(format!(
            "Process timed out after {}s",
            timeout.as_secs()
        ))),
    }
}

/// Run a command with its output discarded, returning an error on non-zero exit.
pub async fn run_silent(cmd: &mut Command, timeout: Duration) -> Result<(), AppError> {
    cmd.stdout(Stdio::null()).stderr(Stdio::null()).stdin(Stdio::null());
    cmd.kill_on_drop(true);
    let status = match tokio::time::timeout(timeout, cmd.status()).await {
        Ok(Ok(status)) => status,
        Ok(Err(e)) => return Err(AppError::Io(e)),
        Err(_) => {
            return Err(AppError::Media(format!(
                "Process timed out after {}s",
                timeout.as_secs()
            )))
        }
    };
    if status.success() {
        Ok(())
    } else {
        Err(AppError::Media(format!("Process exited with {}", status)))
    }
}
