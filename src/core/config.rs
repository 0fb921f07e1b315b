use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

use crate::core::error::{AppError, AppResult};

/// Configuration values for the relay bot.
///
/// Everything is read once from the environment (a `.env` file is loaded by
/// `main` before first access) and cached for the lifetime of the process.
fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name).ok().and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// Parses a list of Telegram user ids separated by commas or whitespace.
/// Unparsable entries are ignored.
pub fn parse_user_ids(raw: &str) -> Vec<i64> {
    raw.split([',', ' ', '\n', '\t'])
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

/// yt-dlp binary path
/// Read from YTDL_BIN, defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env_or("YTDL_BIN", "yt-dlp"));

/// Format selector passed to yt-dlp with `-f` for bot requests
pub static YTDL_FORMAT: Lazy<String> = Lazy::new(|| env_or("YTDL_FORMAT", "bestvideo+bestaudio/best"));

/// Cookies file handed to the downloader when it exists.
/// Read from YTDL_COOKIES_FILE, defaults to `youtube_cookies.txt` in the working directory.
pub static YTDL_COOKIES_FILE: Lazy<String> =
    Lazy::new(|| shellexpand::tilde(&env_or("YTDL_COOKIES_FILE", "youtube_cookies.txt")).to_string());

/// ffmpeg binary path
pub static FFMPEG_BIN: Lazy<String> = Lazy::new(|| env_or("FFMPEG_BIN", "ffmpeg"));

/// ffprobe binary path
pub static FFPROBE_BIN: Lazy<String> = Lazy::new(|| env_or("FFPROBE_BIN", "ffprobe"));

/// Folder where downloads land. Supports tilde (~) expansion.
pub static DOWNLOAD_FOLDER: Lazy<String> =
    Lazy::new(|| shellexpand::tilde(&env_or("DOWNLOAD_FOLDER", "downloads")).to_string());

/// Directory for generated thumbnails
/// Read from TEMP_FILES_DIR, defaults to the system temp dir
pub static TEMP_FILES_DIR: Lazy<String> = Lazy::new(|| {
    let default = env::temp_dir().display().to_string();
    shellexpand::tilde(&env_or("TEMP_FILES_DIR", &default)).to_string()
});

/// Thumbnail argument used for bot requests; "/d" or "no" means generate one
pub static DEFAULT_THUMB: Lazy<String> = Lazy::new(|| env_or("DEFAULT_THUMB", "/d"));

/// Log file path
pub static LOG_FILE_PATH: Lazy<String> = Lazy::new(|| env_or("LOG_FILE_PATH", "vidrelay.log"));

/// Log level name (error, warn, info, debug, trace)
pub static LOG_LEVEL: Lazy<String> = Lazy::new(|| env_or("LOG_LEVEL", "info"));

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_default()
});

/// Channel that receives the uploads
/// Read from CHANNEL_ID; 0 when unset
pub static CHANNEL_ID: Lazy<i64> = Lazy::new(|| env_parse("CHANNEL_ID", 0));

/// Checks that a target channel is configured. Uploads to chat 0 always fail.
pub fn require_channel_id(id: i64) -> AppResult<i64> {
    if id == 0 {
        return Err(AppError::Config("CHANNEL_ID is not set".to_string()));
    }
    Ok(id)
}

/// Users allowed to submit links. Empty means everyone.
pub static AUTHORIZED_USERS: Lazy<Vec<i64>> =
    Lazy::new(|| env::var("AUTHORIZED_USERS").map(|raw| parse_user_ids(&raw)).unwrap_or_default());

/// Upload and split thresholds
pub mod upload {
    use super::{env_parse, Duration, Lazy};

    /// Bytes in one MiB
    pub const MIB: u64 = 1024 * 1024;

    /// Files above this size (MiB) are split before upload
    pub static SPLIT_TRIGGER_MB: Lazy<u64> = Lazy::new(|| env_parse("SPLIT_TRIGGER_MB", 2000));

    /// Maximum size (MiB) of one segment when splitting
    pub static SPLIT_PART_MAX_MB: Lazy<u64> = Lazy::new(|| env_parse("SPLIT_PART_MAX_MB", DEFAULT_PART_MAX_MB));

    /// Default segment size limit used by the splitter
    pub const DEFAULT_PART_MAX_MB: u64 = 1900;

    /// Offset of the frame grabbed for generated thumbnails
    pub const THUMBNAIL_OFFSET_SECS: u64 = 5;

    /// Marker values meaning "no thumbnail provided"
    pub const THUMBNAIL_SENTINELS: [&str; 2] = ["/d", "no"];

    pub fn split_trigger_bytes() -> u64 {
        *SPLIT_TRIGGER_MB * MIB
    }

    static PROGRESS_UPDATE_SECS: Lazy<u64> = Lazy::new(|| env_parse("PROGRESS_UPDATE_SECS", 5));

    /// Interval between upload progress edits of the status message
    pub fn progress_interval() -> Duration {
        Duration::from_secs((*PROGRESS_UPDATE_SECS).max(1))
    }
}

/// Downloader configuration
pub mod download {
    /// Extensions probed (in order) when resolving the downloaded file
    pub const OUTPUT_EXTENSIONS: [&str; 4] = ["mp4", "mkv", "webm", "ts"];

    /// Extension used when nothing was found on disk
    pub const FALLBACK_EXTENSION: &str = "mp4";

    /// Headers required by the content provider's access control
    pub const REFERER: &str = "https://web.classplusapp.com/";
    pub const ORIGIN: &str = "https://web.classplusapp.com";
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    /// aria2c connection settings: 16 connections per server, 32 parallel downloads
    pub const ARIA2C_CONNECTIONS: u32 = 16;
    pub const ARIA2C_PARALLEL: u32 = 32;
}

/// ffmpeg/ffprobe timeouts
pub mod ffmpeg {
    use super::{env_parse, Duration, Lazy};

    /// Timeout for ffprobe metadata queries (30 seconds)
    pub const FFPROBE_TIMEOUT: Duration = Duration::from_secs(30);

    /// Timeout for single-frame extraction (2 minutes)
    pub const FRAME_TIMEOUT: Duration = Duration::from_secs(120);

    static REMUX_TIMEOUT_SECS: Lazy<u64> = Lazy::new(|| env_parse("REMUX_TIMEOUT_SECS", 1800));

    /// Timeout for one stream-copy remux of a segment
    pub fn remux_timeout() -> Duration {
        Duration::from_secs(*REMUX_TIMEOUT_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API requests (in seconds)
    /// Large uploads through a local Bot API server take minutes
    pub const REQUEST_TIMEOUT_SECS: u64 = 900; // 15 minutes

    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Bot API server configuration utilities
pub mod bot_api {
    /// Returns the BOT_API_URL environment variable if set.
    pub fn get_url() -> Option<String> {
        std::env::var("BOT_API_URL").ok().filter(|url| !url.trim().is_empty())
    }

    /// Returns true if the URL doesn't point at api.telegram.org.
    pub fn is_local_url(url: &str) -> bool {
        !url.contains("api.telegram.org")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_ids_mixed_separators() {
        assert_eq!(parse_user_ids("1, 2\n3\t-100500"), vec![1, 2, 3, -100500]);
    }

    #[test]
    fn test_parse_user_ids_skips_garbage() {
        assert_eq!(parse_user_ids("abc,,42, x7"), vec![42]);
        assert!(parse_user_ids("").is_empty());
    }

    #[test]
    fn test_is_local_url() {
        assert!(bot_api::is_local_url("http://localhost:8081"));
        assert!(!bot_api::is_local_url("https://api.telegram.org"));
    }

    #[test]
    fn test_require_channel_id() {
        assert_eq!(require_channel_id(-1001234567890).unwrap(), -1001234567890);

        let err = require_channel_id(0).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(err.to_string(), "Configuration error: CHANNEL_ID is not set");
    }

    #[test]
    fn test_default_thresholds() {
        assert_eq!(upload::DEFAULT_PART_MAX_MB, 1900);
        assert_eq!(upload::MIB, 1_048_576);
        assert_eq!(download::OUTPUT_EXTENSIONS, ["mp4", "mkv", "webm", "ts"]);
    }
}
