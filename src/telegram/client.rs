//! Channel client seam between the upload pipeline and the Bot API.
//!
//! The uploader only talks to [`ChannelClient`], so tests can record calls
//! without a network. [`TelegramClient`] is the teloxide-backed implementation.

use std::path::Path;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId, ReplyParameters};
use tokio::fs::File as TokioFile;

use crate::core::error::AppResult;
use crate::download::progress::{ProgressReader, UploadProgress};
use crate::telegram::Bot;

/// Address of a sent message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

impl MessageRef {
    pub fn new(chat_id: ChatId, message_id: MessageId) -> Self {
        Self { chat_id, message_id }
    }

    pub fn of(msg: &Message) -> Self {
        Self::new(msg.chat.id, msg.id)
    }
}

/// Everything needed for one `sendVideo` call.
#[derive(Debug, Clone, Copy)]
pub struct VideoUpload<'a> {
    pub chat_id: ChatId,
    pub file: &'a Path,
    pub caption: &'a str,
    /// Whole seconds; 0 when the duration is unknown
    pub duration_secs: u32,
    pub thumbnail: Option<&'a Path>,
}

#[async_trait]
pub trait ChannelClient: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> AppResult<MessageRef>;

    async fn edit_text(&self, message: MessageRef, text: &str) -> AppResult<()>;

    async fn delete(&self, message: MessageRef) -> AppResult<()>;

    /// Sends `text` as a reply to `to`.
    async fn reply_text(&self, to: MessageRef, text: &str) -> AppResult<MessageRef>;

    /// Streams `video.file` as a video, adding read bytes to `progress`.
    async fn send_video(&self, video: VideoUpload<'_>, progress: UploadProgress) -> AppResult<MessageRef>;

    async fn send_document(&self, chat_id: ChatId, file: &Path, caption: &str) -> AppResult<MessageRef>;
}

/// [`ChannelClient`] backed by a teloxide [`Bot`].
#[derive(Clone)]
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// Opens `path` as an `InputFile` whose reads are counted in `progress`.
pub async fn input_file_with_progress(path: &Path, progress: UploadProgress) -> AppResult<InputFile> {
    let file = TokioFile::open(path).await?;
    let mut input_file = InputFile::read(ProgressReader::new(file, progress));
    if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
        input_file = input_file.file_name(name.to_string());
    }
    Ok(input_file)
}

#[async_trait]
impl ChannelClient for TelegramClient {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> AppResult<MessageRef> {
        let msg = self.bot.send_message(chat_id, text).await?;
        Ok(MessageRef::of(&msg))
    }

    async fn edit_text(&self, message: MessageRef, text: &str) -> AppResult<()> {
        self.bot
            .edit_message_text(message.chat_id, message.message_id, text)
            .await?;
        Ok(())
    }

    async fn delete(&self, message: MessageRef) -> AppResult<()> {
        self.bot.delete_message(message.chat_id, message.message_id).await?;
        Ok(())
    }

    async fn reply_text(&self, to: MessageRef, text: &str) -> AppResult<MessageRef> {
        let msg = self
            .bot
            .send_message(to.chat_id, text)
            .reply_parameters(ReplyParameters::new(to.message_id))
            .await?;
        Ok(MessageRef::of(&msg))
    }

    async fn send_video(&self, video: VideoUpload<'_>, progress: UploadProgress) -> AppResult<MessageRef> {
        log::info!("Uploading video {} to chat {}", video.file.display(), video.chat_id);
        let input_file = input_file_with_progress(video.file, progress).await?;

        let mut request = self
            .bot
            .send_video(video.chat_id, input_file)
            .caption(video.caption)
            .duration(video.duration_secs)
            .supports_streaming(true);
        if let Some(thumb) = video.thumbnail {
            log::info!("[THUMBNAIL] Attaching {}", thumb.display());
            request = request.thumbnail(InputFile::file(thumb));
        }

        let msg = request.await?;
        Ok(MessageRef::of(&msg))
    }

    async fn send_document(&self, chat_id: ChatId, file: &Path, caption: &str) -> AppResult<MessageRef> {
        log::info!("Uploading document {} to chat {}", file.display(), chat_id);
        let msg = self
            .bot
            .send_document(chat_id, InputFile::file(file))
            .caption(caption)
            .await?;
        Ok(MessageRef::of(&msg))
    }
}
