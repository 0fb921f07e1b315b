//! Channel client that records Telegram API interactions
//!
//! Every call is stored as an [`ApiCall`] together with what was on disk at
//! the time, so tests can check ordering and cleanup without a network.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use teloxide::types::{ChatId, MessageId};
use tokio::io::AsyncReadExt;
use vidrelay::core::error::{AppError, AppResult};
use vidrelay::download::progress::{ProgressReader, UploadProgress};
use vidrelay::telegram::client::{ChannelClient, MessageRef, VideoUpload};

/// One recorded Bot API call
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    SendText {
        chat_id: ChatId,
        text: String,
    },
    Edit {
        message: MessageRef,
        text: String,
    },
    Delete {
        message: MessageRef,
    },
    Reply {
        to: MessageRef,
        text: String,
    },
    Video {
        chat_id: ChatId,
        file: PathBuf,
        caption: String,
        duration_secs: u32,
        thumbnail: Option<PathBuf>,
        /// Whether the thumbnail was on disk during the call
        thumbnail_existed: bool,
        /// Bytes counted by the progress tracker
        bytes_sent: u64,
    },
    Document {
        chat_id: ChatId,
        file: PathBuf,
        caption: String,
    },
}

/// In-memory [`ChannelClient`]
pub struct RecordingClient {
    calls: Mutex<Vec<ApiCall>>,
    next_id: AtomicI32,
    fail_video: bool,
    fail_document: bool,
    fail_status: bool,
    video_delay: Duration,
}

impl Default for RecordingClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingClient {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(100),
            fail_video: false,
            fail_document: false,
            fail_status: false,
            video_delay: Duration::ZERO,
        }
    }

    /// Every `send_video` call fails
    pub fn failing_video(mut self) -> Self {
        self.fail_video = true;
        self
    }

    /// Every `send_document` call fails
    pub fn failing_document(mut self) -> Self {
        self.fail_document = true;
        self
    }

    /// Every `edit_text` and `delete` call fails after being recorded
    pub fn failing_status(mut self) -> Self {
        self.fail_status = true;
        self
    }

    /// `send_video` takes this long before answering
    pub fn slow_video(mut self, delay: Duration) -> Self {
        self.video_delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn video_files(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::Video { file, .. } => Some(file),
                _ => None,
            })
            .collect()
    }

    pub fn document_files(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::Document { file, .. } => Some(file),
                _ => None,
            })
            .collect()
    }

    pub fn edits(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::Edit { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn replies(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::Reply { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_ref(&self, chat_id: ChatId) -> MessageRef {
        MessageRef::new(chat_id, MessageId(self.next_id.fetch_add(1, Ordering::Relaxed)))
    }
}

#[async_trait]
impl ChannelClient for RecordingClient {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> AppResult<MessageRef> {
        self.record(ApiCall::SendText {
            chat_id,
            text: text.to_string(),
        });
        Ok(self.next_ref(chat_id))
    }

    async fn edit_text(&self, message: MessageRef, text: &str) -> AppResult<()> {
        self.record(ApiCall::Edit {
            message,
            text: text.to_string(),
        });
        if self.fail_status {
            return Err(AppError::Download("Bad Request: message to edit not found".to_string()));
        }
        Ok(())
    }

    async fn delete(&self, message: MessageRef) -> AppResult<()> {
        self.record(ApiCall::Delete { message });
        if self.fail_status {
            return Err(AppError::Download("Bad Request: message to delete not found".to_string()));
        }
        Ok(())
    }

    async fn reply_text(&self, to: MessageRef, text: &str) -> AppResult<MessageRef> {
        self.record(ApiCall::Reply {
            to,
            text: text.to_string(),
        });
        Ok(self.next_ref(to.chat_id))
    }

    async fn send_video(&self, video: VideoUpload<'_>, progress: UploadProgress) -> AppResult<MessageRef> {
        // Drain the file through the progress reader like the real upload does.
        if let Ok(file) = tokio::fs::File::open(video.file).await {
            let mut reader = ProgressReader::new(file, progress.clone());
            let mut sink = Vec::new();
            let _ = reader.read_to_end(&mut sink).await;
        }
        if !self.video_delay.is_zero() {
            tokio::time::sleep(self.video_delay).await;
        }

        self.record(ApiCall::Video {
            chat_id: video.chat_id,
            file: video.file.to_path_buf(),
            caption: video.caption.to_string(),
            duration_secs: video.duration_secs,
            thumbnail: video.thumbnail.map(Path::to_path_buf),
            thumbnail_existed: video.thumbnail.is_some_and(Path::exists),
            bytes_sent: progress.bytes_sent(),
        });

        if self.fail_video {
            return Err(AppError::Download("Bad Request: wrong file type".to_string()));
        }
        Ok(self.next_ref(video.chat_id))
    }

    async fn send_document(&self, chat_id: ChatId, file: &Path, caption: &str) -> AppResult<MessageRef> {
        self.record(ApiCall::Document {
            chat_id,
            file: file.to_path_buf(),
            caption: caption.to_string(),
        });

        if self.fail_document {
            return Err(AppError::Download("Request Entity Too Large".to_string()));
        }
        Ok(self.next_ref(chat_id))
    }
}
