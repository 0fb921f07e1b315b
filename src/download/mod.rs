//! Download, split and upload pipeline

pub mod probe;
pub mod progress;
pub mod send;
pub mod split;
pub mod temp;
pub mod thumbnail;
pub mod tools;
pub mod ytdlp;

// Re-exports for convenience
pub use probe::{probe_duration, MediaDuration};
pub use send::{UploadReport, UploadRequest, UploadSettings, Uploader};
pub use split::split_if_needed;
pub use thumbnail::Thumbnail;
pub use tools::{ExternalTool, FfmpegTool};
pub use ytdlp::{CommandRunner, Downloader, DownloaderSettings, RunStatus, ShellRunner};
