//! Upload pipeline: thumbnail, optional split, video upload with document fallback.
//!
//! Every file the pipeline creates or takes over is held as a
//! [`tempfile::TempPath`], so segments, the generated thumbnail and the source
//! file are deleted on success and on every error path.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use bon::Builder;
use tempfile::TempPath;
use teloxide::types::ChatId;
use tokio::time::MissedTickBehavior;

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::download::probe::probe_duration;
use crate::download::progress::{format_upload_status, uploading_header, UploadProgress, UploadStats};
use crate::download::split::split_if_needed;
use crate::download::temp;
use crate::download::thumbnail::{resolve_thumbnail, ResolvedThumbnail, Thumbnail};
use crate::download::tools::ExternalTool;
use crate::telegram::client::{ChannelClient, MessageRef, VideoUpload};

/// Status text shown while a large file is being cut.
pub const SPLITTING_STATUS: &str = "✂️ File is > 2GB, splitting into parts...";

/// Thresholds and paths used by the [`Uploader`].
#[derive(Debug, Clone)]
pub struct UploadSettings {
    /// Files strictly larger than this are split first
    pub split_trigger_bytes: u64,
    /// Segment size limit handed to the splitter
    pub split_part_max_mb: u64,
    /// Interval between status message edits during an upload
    pub progress_interval: Duration,
    /// Directory for generated thumbnails
    pub temp_dir: PathBuf,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            split_trigger_bytes: config::upload::split_trigger_bytes(),
            split_part_max_mb: *config::upload::SPLIT_PART_MAX_MB,
            progress_interval: config::upload::progress_interval(),
            temp_dir: PathBuf::from(config::TEMP_FILES_DIR.as_str()),
        }
    }
}

/// One upload job.
#[derive(Debug, Clone, Builder)]
pub struct UploadRequest {
    /// Message that receives the error reply if the upload fails
    pub reply_to: MessageRef,
    #[builder(into)]
    pub caption: String,
    /// Source file; deleted once the upload finishes, whatever the outcome
    #[builder(into)]
    pub file: PathBuf,
    #[builder(default = Thumbnail::Generate)]
    pub thumbnail: Thumbnail,
    #[builder(into)]
    pub display_name: String,
    /// Download progress message, removed when the upload starts
    pub progress_message: MessageRef,
    pub channel_id: ChatId,
}

/// Outcome of a finished upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadReport {
    /// Number of files sent (1 when no split happened)
    pub parts: usize,
    pub video_sent: usize,
    pub document_fallbacks: usize,
}

/// Uploads finished downloads to a channel.
pub struct Uploader<'a> {
    client: &'a dyn ChannelClient,
    tool: &'a dyn ExternalTool,
    settings: UploadSettings,
}

impl<'a> Uploader<'a> {
    pub fn new(client: &'a dyn ChannelClient, tool: &'a dyn ExternalTool, settings: UploadSettings) -> Self {
        Self { client, tool, settings }
    }

    /// Runs the whole upload for `request`.
    ///
    /// Errors are logged and replied to `request.reply_to` as
    /// `❌ Upload Error: {error}`, then returned. The source file is deleted on
    /// both paths.
    pub async fn upload(&self, request: UploadRequest) -> AppResult<UploadReport> {
        let source = temp::adopt(&request.file);

        match self.try_upload(&request, &source).await {
            Ok(report) => {
                temp::discard(source);
                log::info!(
                    "Upload of {} finished: {} part(s), {} as video, {} as document",
                    request.display_name,
                    report.parts,
                    report.video_sent,
                    report.document_fallbacks
                );
                Ok(report)
            }
            Err(e) => {
                log::error!("Upload of {} failed: {}", request.file.display(), e);
                let text = format!("❌ Upload Error: {}", e);
                if let Err(reply_err) = self.client.reply_text(request.reply_to, &text).await {
                    log::error!("Failed to report upload error: {}", reply_err);
                }
                Err(e)
            }
        }
    }

    async fn try_upload(&self, request: &UploadRequest, source: &Path) -> AppResult<UploadReport> {
        let thumbnail = resolve_thumbnail(self.tool, source, &request.thumbnail, &self.settings.temp_dir).await;

        if let Err(e) = self.client.delete(request.progress_message).await {
            log::warn!("Failed to delete progress message: {}", e);
        }
        let status = self
            .client
            .send_text(request.channel_id, &uploading_header(&request.display_name))
            .await?;

        let size = fs_err::tokio::metadata(source).await?.len();
        let mut report = UploadReport::default();

        if size > self.settings.split_trigger_bytes {
            log::info!(
                "{} is {} bytes, above the {} byte limit",
                source.display(),
                size,
                self.settings.split_trigger_bytes
            );
            self.edit_status(status, SPLITTING_STATUS).await;

            let parts = split_if_needed(self.tool, source, self.settings.split_part_max_mb).await?;
            if parts.len() == 1 && parts[0] == source {
                self.upload_unit(request, source, &request.display_name, &thumbnail, status, &mut report)
                    .await?;
            } else {
                // Owned before the first upload, so the rest is removed if one fails.
                let segments: Vec<TempPath> = parts.into_iter().map(temp::adopt).collect();
                if segments.is_empty() {
                    return Err(AppError::Media(format!(
                        "Splitting {} produced no parts",
                        source.display()
                    )));
                }

                let total = segments.len();
                for (i, segment) in segments.into_iter().enumerate() {
                    let label = format!("{} (part {}/{})", request.display_name, i + 1, total);
                    self.upload_unit(request, &segment, &label, &thumbnail, status, &mut report)
                        .await?;
                    temp::discard(segment);
                }
            }
        } else {
            self.upload_unit(request, source, &request.display_name, &thumbnail, status, &mut report)
                .await?;
        }

        thumbnail.cleanup();
        if let Err(e) = self.client.delete(status).await {
            log::warn!("Failed to delete upload status message: {}", e);
        }

        Ok(report)
    }

    /// Sends one file as a video, falling back to a document once if that fails.
    async fn upload_unit(
        &self,
        request: &UploadRequest,
        path: &Path,
        label: &str,
        thumbnail: &ResolvedThumbnail,
        status: MessageRef,
        report: &mut UploadReport,
    ) -> AppResult<()> {
        let duration = probe_duration(self.tool, path).await;
        let total = fs_err::tokio::metadata(path).await?.len();
        report.parts += 1;

        let video = VideoUpload {
            chat_id: request.channel_id,
            file: path,
            caption: &request.caption,
            duration_secs: duration.as_whole_secs(),
            thumbnail: thumbnail.path(),
        };
        let progress = UploadProgress::new();
        let started = Instant::now();

        let send = self.client.send_video(video, progress.clone());
        tokio::pin!(send);

        let mut ticker = tokio::time::interval(self.settings.progress_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        let mut last_text = String::new();

        let result = loop {
            tokio::select! {
                result = &mut send => break result,
                _ = ticker.tick() => {
                    let stats = UploadStats::compute(progress.bytes_sent(), total, started.elapsed());
                    let text = format_upload_status(label, &stats);
                    if text != last_text {
                        self.edit_status(status, &text).await;
                        last_text = text;
                    }
                }
            }
        };

        match result {
            Ok(_) => {
                log::info!(
                    "Sent {} as video in {:.1}s",
                    path.display(),
                    started.elapsed().as_secs_f64()
                );
                report.video_sent += 1;
            }
            Err(e) => {
                log::error!("Video upload of {} failed: {}, sending as document", path.display(), e);
                self.client
                    .send_document(request.channel_id, path, &request.caption)
                    .await?;
                report.document_fallbacks += 1;
            }
        }

        Ok(())
    }

    async fn edit_status(&self, status: MessageRef, text: &str) {
        if let Err(e) = self.client.edit_text(status, text).await {
            log::warn!("Failed to update upload status: {}", e);
        }
    }
}
