//! Fake external tools and command runners
//!
//! Both record every call so tests can assert on the exact sequence of
//! process invocations without ffmpeg or yt-dlp installed.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use vidrelay::core::error::{AppError, AppResult};
use vidrelay::download::tools::ExternalTool;
use vidrelay::download::ytdlp::{CommandRunner, RunStatus};

/// One recorded tool invocation
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    Probe(PathBuf),
    Remux {
        input: PathBuf,
        start_secs: u64,
        length_secs: u64,
        output: PathBuf,
    },
    Frame {
        input: PathBuf,
        offset_secs: u64,
        output: PathBuf,
    },
}

/// [`ExternalTool`] that writes small placeholder files instead of running ffmpeg
pub struct FakeTool {
    /// Probed duration; `None` makes every probe fail
    duration: Option<f64>,
    /// 1-based remux call numbers that fail without writing output
    failing_remuxes: HashSet<usize>,
    /// Whether frame extraction writes a thumbnail
    frames: bool,
    calls: Mutex<Vec<ToolCall>>,
}

impl FakeTool {
    pub fn with_duration(secs: f64) -> Self {
        Self {
            duration: Some(secs),
            failing_remuxes: HashSet::new(),
            frames: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A tool whose probe always fails
    pub fn unknown_duration() -> Self {
        Self {
            duration: None,
            ..Self::with_duration(0.0)
        }
    }

    pub fn failing_remux(mut self, call_number: usize) -> Self {
        self.failing_remuxes.insert(call_number);
        self
    }

    pub fn without_frames(mut self) -> Self {
        self.frames = false;
        self
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn remux_calls(&self) -> Vec<ToolCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, ToolCall::Remux { .. }))
            .collect()
    }

    fn record(&self, call: ToolCall) -> usize {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        calls.iter().filter(|c| matches!(c, ToolCall::Remux { .. })).count()
    }
}

#[async_trait]
impl ExternalTool for FakeTool {
    async fn probe_duration(&self, path: &Path) -> AppResult<f64> {
        self.record(ToolCall::Probe(path.to_path_buf()));
        self.duration
            .ok_or_else(|| AppError::Media("ffprobe exited with status 1".to_string()))
    }

    async fn remux(&self, input: &Path, start_secs: u64, length_secs: u64, output: &Path) -> AppResult<()> {
        let call_number = self.record(ToolCall::Remux {
            input: input.to_path_buf(),
            start_secs,
            length_secs,
            output: output.to_path_buf(),
        });
        if self.failing_remuxes.contains(&call_number) {
            return Err(AppError::Media("ffmpeg exited with status 1".to_string()));
        }
        std::fs::write(output, vec![0u8; 4096])?;
        Ok(())
    }

    async fn extract_frame(&self, input: &Path, offset_secs: u64, output: &Path) -> AppResult<()> {
        self.record(ToolCall::Frame {
            input: input.to_path_buf(),
            offset_secs,
            output: output.to_path_buf(),
        });
        if !self.frames {
            return Err(AppError::Media("no video stream".to_string()));
        }
        std::fs::write(output, b"\xff\xd8\xff\xe0jpeg")?;
        Ok(())
    }
}

/// Scripted outcome of one downloader run
#[derive(Debug, Clone, Copy)]
pub enum RunScript {
    Exit(RunStatus),
    /// The process could not be started
    SpawnError,
}

/// [`CommandRunner`] that replays scripted outcomes and records command lines
pub struct FakeRunner {
    script: Mutex<VecDeque<RunScript>>,
    lines: Mutex<Vec<String>>,
    /// File written on every successful run, standing in for the download
    creates: Option<PathBuf>,
}

impl FakeRunner {
    /// Runs succeed once the script is exhausted
    pub fn new(script: Vec<RunScript>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            lines: Mutex::new(Vec::new()),
            creates: None,
        }
    }

    pub fn exits(codes: &[i32]) -> Self {
        Self::new(
            codes
                .iter()
                .map(|&code| RunScript::Exit(RunStatus { code: Some(code) }))
                .collect(),
        )
    }

    pub fn creating(mut self, path: impl Into<PathBuf>) -> Self {
        self.creates = Some(path.into());
        self
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, command_line: &str) -> AppResult<RunStatus> {
        self.lines.lock().unwrap().push(command_line.to_string());
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(RunScript::Exit(RunStatus::success()));

        match next {
            RunScript::SpawnError => Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "sh: not found",
            ))),
            RunScript::Exit(status) => {
                if status.is_success() {
                    if let Some(path) = &self.creates {
                        std::fs::write(path, vec![1u8; 2048])?;
                    }
                }
                Ok(status)
            }
        }
    }
}
