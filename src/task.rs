//! Validated description of one shift run.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::marker;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("to offset {to} must be smaller than from offset {from}")]
    EmptyGap { from: u64, to: u64 },
    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,
    #[error("queue depth must be greater than zero")]
    ZeroQueueDepth,
    #[error("marker size must be greater than zero")]
    ZeroMarkerSize,
    #[error("file path is empty")]
    EmptyPath,
}

/// Immutable parameters of a shift: bytes in `[to_offset, from_offset)` are
/// removed by moving everything from `from_offset` onward down by the gap.
#[derive(Debug, Clone)]
pub struct ShiftTask {
    pub file_path: PathBuf,
    pub from_offset: u64,
    pub to_offset: u64,
    pub chunk_size: usize,
    pub queue_depth: usize,
    pub marker_size: usize,
    pub search_mark: bool,
    pub search_offset: u64,
}

impl ShiftTask {
    /// Task with the default chunk size, queue depth and marker size.
    pub fn new(file_path: impl Into<PathBuf>, from_offset: u64, to_offset: u64) -> Self {
        Self {
            file_path: file_path.into(),
            from_offset,
            to_offset,
            chunk_size: crate::config::DEFAULT_CHUNK_SIZE,
            queue_depth: crate::config::DEFAULT_QUEUE_DEPTH,
            marker_size: crate::config::DEFAULT_MARKER_SIZE,
            search_mark: false,
            search_offset: 0,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_queue_depth(mut self, queue_depth: usize) -> Self {
        self.queue_depth = queue_depth;
        self
    }

    pub fn with_marker_size(mut self, marker_size: usize) -> Self {
        self.marker_size = marker_size;
        self
    }

    /// Enable the resume scan, starting at `search_offset`.
    pub fn with_search(mut self, search_offset: u64) -> Self {
        self.search_mark = true;
        self.search_offset = search_offset;
        self
    }

    /// Check the task before any file is touched.
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.file_path.as_os_str().is_empty() {
            return Err(TaskError::EmptyPath);
        }
        if self.to_offset >= self.from_offset {
            return Err(TaskError::EmptyGap {
                from: self.from_offset,
                to: self.to_offset,
            });
        }
        if self.chunk_size == 0 {
            return Err(TaskError::ZeroChunkSize);
        }
        if self.queue_depth == 0 {
            return Err(TaskError::ZeroQueueDepth);
        }
        if self.marker_size == 0 {
            return Err(TaskError::ZeroMarkerSize);
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn gap(&self) -> u64 {
        self.from_offset.saturating_sub(self.to_offset)
    }

    pub fn marker_len(&self) -> usize {
        marker::marker_len(self.gap(), self.marker_size)
    }
}
