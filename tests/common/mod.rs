//! Common test utilities
//!
//! This module is shared across all integration tests

pub mod fakes;
pub mod recorder;

#[allow(unused_imports)]
pub use fakes::{FakeRunner, FakeTool, RunScript, ToolCall};
#[allow(unused_imports)]
pub use recorder::{ApiCall, RecordingClient};

use std::path::Path;

/// Bytes in one MiB
#[allow(dead_code)]
pub const MIB: u64 = 1024 * 1024;

/// Creates a sparse file of `size` bytes, so multi-GiB fixtures cost no disk space.
#[allow(dead_code)]
pub fn sparse_file(path: &Path, size: u64) {
    let file = std::fs::File::create(path).unwrap();
    file.set_len(size).unwrap();
}
