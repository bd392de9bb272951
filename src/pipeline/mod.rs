//! # Pipeline Module
//!
//! Wires the shift together: optional resume scan, then a reader on the
//! calling thread feeding a writer thread over a bounded chunk queue, with
//! both reporting to the status aggregator over a bounded status queue.

pub mod events;
pub mod status;
pub mod workers;

use std::io;
use std::path::PathBuf;
use std::thread;

use chrono::{DateTime, Utc};
use crossbeam_channel::bounded;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::chunk::Chunk;
use crate::marker::build_marker;
use crate::resume::{self, ResumeError};
use crate::task::{ShiftTask, TaskError};

use events::StatusEvent;
use status::{ProgressConfig, RunningTotals};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid task: {0}")]
    Task(#[from] TaskError),
    #[error("resume failed: {0}")]
    Resume(#[from] ResumeError),
    #[error("{stage} failed at offset {offset}: {source}")]
    Io {
        stage: &'static str,
        offset: u64,
        #[source]
        source: io::Error,
    },
    #[error("chunk at source offset {source_offset} precedes destination start {to_offset}")]
    Protocol { source_offset: u64, to_offset: u64 },
    #[error("status channel closed before the shift finished")]
    StatusChannelClosed,
    #[error("{0} thread panicked")]
    WorkerPanicked(&'static str),
}

impl PipelineError {
    pub(crate) fn io(stage: &'static str, offset: u64, source: io::Error) -> Self {
        Self::Io {
            stage,
            offset,
            source,
        }
    }
}

/// Outcome of a completed shift.
#[derive(Debug, Clone, Serialize)]
pub struct ShiftSummary {
    pub file_path: PathBuf,
    pub started_at: DateTime<Utc>,
    pub requested_from: u64,
    pub requested_to: u64,
    pub from_offset: u64,
    pub to_offset: u64,
    pub gap: u64,
    pub marker_len: usize,
    pub resumed: bool,
    pub elapsed_seconds: f64,
    pub totals: RunningTotals,
}

/// Run one shift to completion.
///
/// The task is validated before any file is opened. Any I/O or protocol
/// error from the resume scan, reader or writer aborts the whole run; the
/// marker left on disk lets a later run pick up with `search_mark` set.
pub fn run_shift(task: &ShiftTask, progress: ProgressConfig) -> Result<ShiftSummary, PipelineError> {
    task.validate()?;
    let started_at = Utc::now();
    let clock = std::time::Instant::now();

    let (status_tx, status_rx) = bounded::<StatusEvent>(task.queue_depth);
    let aggregator = status::spawn_status_aggregator(status_rx, progress);

    let point = match resume::resolve_offsets(task, |count, elapsed| {
        let _ = status_tx.send(StatusEvent::Scanned { count, elapsed });
    }) {
        Ok(point) => point,
        Err(err) => {
            warn!("search marker not found: {err}");
            let _ = status_tx.send(StatusEvent::Failed(err.into()));
            drop(status_tx);
            return Err(match join_aggregator(aggregator) {
                Err(err) => err,
                Ok(_) => PipelineError::StatusChannelClosed,
            });
        }
    };

    let gap = point.gap();
    let marker = build_marker(gap, task.marker_size);
    let marker_len = marker.len();
    info!(
        "shifting {} from={} to={} gap={} chunk_size={} queue_depth={} marker_len={}",
        task.path().display(),
        point.from_offset,
        point.to_offset,
        gap,
        task.chunk_size,
        task.queue_depth,
        marker_len
    );

    let (chunk_tx, chunk_rx) = bounded::<Chunk>(task.queue_depth);
    let writer = workers::spawn_writer(
        task.file_path.clone(),
        point.from_offset,
        point.to_offset,
        marker,
        chunk_rx,
        status_tx.clone(),
    );
    workers::run_reader(
        task.path(),
        point.from_offset,
        task.chunk_size,
        marker_len,
        chunk_tx,
        status_tx,
    );

    let totals = join_aggregator(aggregator);
    if writer.join().is_err() {
        return Err(PipelineError::WorkerPanicked("writer"));
    }
    let totals = totals?;

    let summary = ShiftSummary {
        file_path: task.file_path.clone(),
        started_at,
        requested_from: task.from_offset,
        requested_to: task.to_offset,
        from_offset: point.from_offset,
        to_offset: point.to_offset,
        gap,
        marker_len,
        resumed: point.resumed,
        elapsed_seconds: clock.elapsed().as_secs_f64(),
        totals,
    };
    info!(
        "shift finished read_bytes={} write_bytes={} elapsed={:.3}s",
        summary.totals.read_bytes, summary.totals.write_bytes, summary.elapsed_seconds
    );
    Ok(summary)
}

fn join_aggregator(
    handle: thread::JoinHandle<Result<RunningTotals, PipelineError>>,
) -> Result<RunningTotals, PipelineError> {
    handle
        .join()
        .map_err(|_| PipelineError::WorkerPanicked("status"))?
}
