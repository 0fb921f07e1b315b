use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Replaces characters that break file paths or shell templates.
///
/// Path separators, Windows-reserved characters, quotes, `%` (yt-dlp template
/// marker) and control characters become `_`. Leading/trailing whitespace and dots
/// are trimmed; an empty result becomes `"unnamed"`.
///
/// # Example
///
/// ```
/// use vidrelay::core::utils::escape_filename;
///
/// assert_eq!(escape_filename("Lecture 1/2: Intro?"), "Lecture 1_2_ Intro_");
/// ```
pub fn escape_filename(filename: &str) -> String {
    let mut result = String::with_capacity(filename.len());

    for c in filename.chars() {
        match c {
            '/' | '\\' => result.push('_'),
            ':' | '*' | '?' | '<' | '>' | '|' | '%' => result.push('_'),
            '"' | '\'' | '`' => result.push('_'),
            c if c.is_control() => result.push('_'),
            _ => result.push(c),
        }
    }

    let result = result.trim_matches(|c: char| c.is_whitespace() || c == '.');

    if result.is_empty() {
        "unnamed".to_string()
    } else {
        result.to_string()
    }
}

/// Strips the final extension from a path, keeping directories intact.
///
/// `downloads/video.mp4` -> `downloads/video`; a path without extension is returned as-is.
pub fn strip_extension(path: &Path) -> PathBuf {
    match path.extension() {
        Some(_) => path.with_extension(""),
        None => path.to_path_buf(),
    }
}

/// Microseconds since the Unix epoch, used for collision-resistant temp names.
pub fn unix_micros() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros()
}

/// Formats a byte count as MB with one decimal.
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
}

/// Formats seconds as `1h 02m 03s`, `2m 05s` or `7s`.
pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
