//! yt-dlp invocation: command composition, one fallback retry, output resolution.
//!
//! The caller supplies a base command line (binary, format, output template and
//! URL). This module appends the provider headers, an optional cookie file,
//! certificate-check bypass and the aria2c accelerator, runs it through a shell,
//! and retries once without the accelerator when the first run fails.

use async_trait::async_trait;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::core::config;
use crate::core::error::AppResult;

/// Exit status of one downloader run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    pub code: Option<i32>,
}

impl RunStatus {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs a composed shell command line.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command_line: &str) -> AppResult<RunStatus>;
}

/// Runs command lines with `sh -c`, inheriting stdio so yt-dlp progress stays visible.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command_line: &str) -> AppResult<RunStatus> {
        let status = Command::new("sh")
            .arg("-c")
            .arg(command_line)
            .stdin(Stdio::null())
            .status()
            .await?;
        Ok(RunStatus { code: status.code() })
    }
}

/// Per-downloader settings.
#[derive(Debug, Clone)]
pub struct DownloaderSettings {
    /// Cookie file passed with `--cookies` when it exists
    pub cookies_file: PathBuf,
}

impl Default for DownloaderSettings {
    fn default() -> Self {
        Self {
            cookies_file: PathBuf::from(config::YTDL_COOKIES_FILE.as_str()),
        }
    }
}

/// A base command plus the arguments this module appends to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadCommand {
    base: String,
    args: Vec<String>,
}

impl DownloadCommand {
    /// Base command with provider headers, optional cookies and `--no-check-certificate`.
    pub fn new(base: &str, cookies_file: Option<&Path>) -> Self {
        let mut args = Vec::new();
        for (name, value) in [
            ("Referer", config::download::REFERER),
            ("User-Agent", config::download::USER_AGENT),
            ("Origin", config::download::ORIGIN),
        ] {
            args.push("--add-header".to_string());
            args.push(format!("{}:{}", name, value));
        }
        if let Some(cookies) = cookies_file {
            args.push("--cookies".to_string());
            args.push(cookies.display().to_string());
        }
        args.push("--no-check-certificate".to_string());

        Self {
            base: base.trim().to_string(),
            args,
        }
    }

    /// Adds the aria2c multi-connection downloader arguments.
    pub fn with_accelerator(mut self) -> Self {
        self.args.push("--external-downloader".to_string());
        self.args.push("aria2c".to_string());
        self.args.push("--downloader-args".to_string());
        self.args.push(format!(
            "aria2c: -x {} -j {}",
            config::download::ARIA2C_CONNECTIONS,
            config::download::ARIA2C_PARALLEL
        ));
        self
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The full shell line: the base verbatim, appended arguments shell-escaped.
    pub fn to_shell_line(&self) -> String {
        let mut line = self.base.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&shell_escape::escape(Cow::Borrowed(arg.as_str())));
        }
        line
    }
}

/// Builds the base yt-dlp command line used for bot requests.
///
/// `{bin} -f {format} -o {output_name}.%(ext)s {url}`, every part shell-escaped.
pub fn base_command(bin: &str, format: &str, output_name: &str, url: &str) -> String {
    let template = format!("{}.%(ext)s", output_name);
    [bin, "-f", format, "-o", template.as_str(), url]
        .iter()
        .map(|part| shell_escape::escape(Cow::Borrowed(*part)).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves the file yt-dlp produced for `output_name`.
///
/// Tries `{name}.mp4`, the literal name, then `.mkv`, `.webm` and `.ts`. If
/// nothing exists, returns `{name}.mp4` anyway; callers must check existence.
pub fn resolve_output(output_name: &str) -> PathBuf {
    for (i, ext) in config::download::OUTPUT_EXTENSIONS.iter().enumerate() {
        let candidate = PathBuf::from(format!("{}.{}", output_name, ext));
        if candidate.is_file() {
            return candidate;
        }
        if i == 0 {
            let literal = PathBuf::from(output_name);
            if literal.is_file() {
                return literal;
            }
        }
    }

    PathBuf::from(format!("{}.{}", output_name, config::download::FALLBACK_EXTENSION))
}

/// yt-dlp downloader with a single fallback run.
pub struct Downloader<R: CommandRunner = ShellRunner> {
    runner: R,
    settings: DownloaderSettings,
}

impl Downloader<ShellRunner> {
    pub fn from_config() -> Self {
        Self::new(ShellRunner, DownloaderSettings::default())
    }
}

impl<R: CommandRunner> Downloader<R> {
    pub fn new(runner: R, settings: DownloaderSettings) -> Self {
        Self { runner, settings }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn cookies_file(&self) -> Option<&Path> {
        let path = self.settings.cookies_file.as_path();
        if path.is_file() {
            Some(path)
        } else {
            None
        }
    }

    async fn attempt(&self, command: &DownloadCommand) -> bool {
        let line = command.to_shell_line();
        log::debug!("Running downloader: {}", line);
        match self.runner.run(&line).await {
            Ok(status) if status.is_success() => true,
            Ok(status) => {
                log::warn!("Downloader exited with {:?}", status.code);
                false
            }
            Err(e) => {
                log::warn!("Failed to start downloader: {}", e);
                false
            }
        }
    }

    /// Downloads `url` with `base_command` and returns the resolved output path.
    ///
    /// The first run uses the aria2c accelerator; if it fails, one plain run
    /// follows. Resolution happens regardless of the final status, so the
    /// returned path may not exist.
    pub async fn download(&self, url: &str, base_command: &str, output_name: &str) -> PathBuf {
        log::info!("Downloading: {} ({})", output_name, url);

        let plain = DownloadCommand::new(base_command, self.cookies_file());
        let accelerated = plain.clone().with_accelerator();

        if !self.attempt(&accelerated).await {
            log::warn!("Aria2c failed, retrying with native downloader...");
            if !self.attempt(&plain).await {
                log::error!("Download failed after retry: {}", url);
            }
        }

        let resolved = resolve_output(output_name);
        log::info!("Resolved download output: {}", resolved.display());
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_command_headers_and_flags() {
        let cmd = DownloadCommand::new("yt-dlp URL", None);
        let args = cmd.args();
        assert_eq!(args[0], "--add-header");
        assert_eq!(args[1], "Referer:https://web.classplusapp.com/");
        assert!(args[3].starts_with("User-Agent:Mozilla/5.0"));
        assert_eq!(args[5], "Origin:https://web.classplusapp.com");
        assert_eq!(args.last().map(String::as_str), Some("--no-check-certificate"));
        assert!(!args.iter().any(|a| a == "--cookies"));
        assert!(!args.iter().any(|a| a == "--external-downloader"));
    }

    #[test]
    fn test_command_with_cookies_and_accelerator() {
        let cmd = DownloadCommand::new("yt-dlp URL", Some(Path::new("youtube_cookies.txt"))).with_accelerator();
        let line = cmd.to_shell_line();
        assert!(line.starts_with("yt-dlp URL --add-header "));
        assert!(line.contains("--cookies youtube_cookies.txt"));
        assert!(line.contains("--no-check-certificate --external-downloader aria2c"));
        assert!(line.ends_with("--downloader-args 'aria2c: -x 16 -j 32'"));
    }

    #[test]
    fn test_header_values_are_quoted() {
        let line = DownloadCommand::new("yt-dlp URL", None).to_shell_line();
        assert!(line.contains("'User-Agent:Mozilla/5.0 (Windows NT 10.0; Win64; x64)"));
    }

    #[test]
    fn test_base_command_escapes_parts() {
        let cmd = base_command("yt-dlp", "best", "downloads/My Lecture", "https://example.com/v?id=1&x=2");
        assert_eq!(
            cmd,
            "yt-dlp -f best -o 'downloads/My Lecture.%(ext)s' 'https://example.com/v?id=1&x=2'"
        );
    }

    #[test]
    fn test_resolve_output_prefers_extension_order() {
        let dir = tempfile::tempdir().unwrap();
        let name = dir.path().join("clip");
        let name = name.to_str().unwrap();
        std::fs::write(format!("{}.webm", name), b"w").unwrap();
        std::fs::write(format!("{}.mkv", name), b"m").unwrap();

        assert_eq!(resolve_output(name), PathBuf::from(format!("{}.mkv", name)));
    }

    #[test]
    fn test_resolve_output_literal_name() {
        let dir = tempfile::tempdir().unwrap();
        let name = dir.path().join("clip.bin");
        std::fs::write(&name, b"x").unwrap();
        let name = name.to_str().unwrap();

        assert_eq!(resolve_output(name), PathBuf::from(name));
    }

    #[test]
    fn test_resolve_output_literal_name_beats_later_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let name = dir.path().join("clip");
        let name = name.to_str().unwrap();
        std::fs::write(name, b"x").unwrap();
        std::fs::write(format!("{}.mkv", name), b"m").unwrap();

        assert_eq!(resolve_output(name), PathBuf::from(name));

        std::fs::write(format!("{}.mp4", name), b"v").unwrap();
        assert_eq!(resolve_output(name), PathBuf::from(format!("{}.mp4", name)));
    }

    #[test]
    fn test_resolve_output_fallback_does_not_exist() {
        let dir = tempfile::tempdir().unwrap();
        let name = dir.path().join("missing");
        let name = name.to_str().unwrap();

        let resolved = resolve_output(name);
        assert_eq!(resolved, PathBuf::from(format!("{}.mp4", name)));
        assert!(!resolved.exists());
    }
}
