//! Relay job: one link in, one channel post out.

use std::path::PathBuf;
use std::sync::Arc;

use teloxide::types::ChatId;
use url::Url;

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::core::utils::{escape_filename, unix_micros};
use crate::download::send::{UploadReport, UploadRequest, UploadSettings, Uploader};
use crate::download::thumbnail::Thumbnail;
use crate::download::tools::{ExternalTool, FfmpegTool};
use crate::download::ytdlp::{base_command, CommandRunner, Downloader, ShellRunner};
use crate::telegram::client::{ChannelClient, MessageRef};

/// A parsed `<url>` or `<url> | <name>` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayRequest {
    pub url: Url,
    pub display_name: String,
}

impl RelayRequest {
    /// Parses a message text. Only http and https links are accepted.
    pub fn parse(text: &str) -> AppResult<Self> {
        let (link, name) = match text.split_once('|') {
            Some((link, name)) => (link.trim(), name.trim()),
            None => (text.trim(), ""),
        };

        if link.is_empty() {
            return Err(AppError::Validation("Send a video link".to_string()));
        }
        let url = Url::parse(link).map_err(|e| AppError::Validation(format!("Invalid link: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Validation(format!(
                "Unsupported link scheme: {}",
                url.scheme()
            )));
        }

        let display_name = if name.is_empty() {
            format!("video_{}", unix_micros() / 1000)
        } else {
            name.to_string()
        };

        Ok(Self { url, display_name })
    }

    /// Download path without extension, inside `folder`.
    pub fn output_name(&self, folder: &str) -> String {
        PathBuf::from(folder)
            .join(escape_filename(&self.display_name))
            .display()
            .to_string()
    }
}

/// True when `allowed` is empty or contains `user_id`.
pub fn is_authorized(user_id: i64, allowed: &[i64]) -> bool {
    allowed.is_empty() || allowed.contains(&user_id)
}

/// Everything a relay job needs, shared by all requests.
pub struct RelayContext<R: CommandRunner = ShellRunner> {
    pub client: Arc<dyn ChannelClient>,
    pub tool: Arc<dyn ExternalTool>,
    pub downloader: Downloader<R>,
    pub channel_id: ChatId,
    pub download_folder: String,
    pub ytdl_bin: String,
    pub ytdl_format: String,
    pub thumbnail: Thumbnail,
    pub upload_settings: UploadSettings,
}

impl RelayContext<ShellRunner> {
    pub fn from_config(client: Arc<dyn ChannelClient>) -> Self {
        Self {
            client,
            tool: Arc::new(FfmpegTool::from_config()),
            downloader: Downloader::from_config(),
            channel_id: ChatId(*config::CHANNEL_ID),
            download_folder: config::DOWNLOAD_FOLDER.clone(),
            ytdl_bin: config::YTDL_BIN.clone(),
            ytdl_format: config::YTDL_FORMAT.clone(),
            thumbnail: Thumbnail::from_arg(&config::DEFAULT_THUMB),
            upload_settings: UploadSettings::default(),
        }
    }
}

impl<R: CommandRunner> RelayContext<R> {
    /// Downloads `request` and uploads the result to the channel.
    ///
    /// `origin` is the user's message; status and errors are replied to it.
    pub async fn run(&self, request: RelayRequest, origin: MessageRef) -> AppResult<UploadReport> {
        let progress = self
            .client
            .reply_text(origin, &format!("⏳ Downloading: {}", request.display_name))
            .await?;

        fs_err::tokio::create_dir_all(&self.download_folder).await?;
        let output = request.output_name(&self.download_folder);
        let command = base_command(&self.ytdl_bin, &self.ytdl_format, &output, request.url.as_str());

        let path = self.downloader.download(request.url.as_str(), &command, &output).await;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            let text = format!("❌ Download failed: {}", request.display_name);
            if let Err(e) = self.client.edit_text(progress, &text).await {
                log::warn!("Failed to report download failure: {}", e);
            }
            return Err(AppError::Download(format!("No output file for {}", request.url)));
        }

        let upload = UploadRequest::builder()
            .reply_to(origin)
            .caption(request.display_name.clone())
            .file(path)
            .thumbnail(self.thumbnail.clone())
            .display_name(request.display_name.clone())
            .progress_message(progress)
            .channel_id(self.channel_id)
            .build();

        Uploader::new(self.client.as_ref(), self.tool.as_ref(), self.upload_settings.clone())
            .upload(upload)
            .await
    }
}
