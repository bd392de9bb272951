//! # Resume Scan
//!
//! Locates the marker left behind by an interrupted run and derives the
//! offsets the next run continues from. The byte after the marker is the
//! next unwritten destination offset; the matching unread source offset is
//! one gap further on.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use crate::marker::{MarkerMatcher, build_marker};
use crate::task::ShiftTask;

#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("io error during marker search: {0}")]
    Io(#[from] io::Error),
    #[error(
        "marker of {marker_len} bytes not found after offset {search_offset} ({scanned} bytes scanned)"
    )]
    NotFound {
        marker_len: usize,
        search_offset: u64,
        scanned: u64,
    },
}

/// Offsets a run actually uses after the optional resume scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePoint {
    pub from_offset: u64,
    pub to_offset: u64,
    /// True when the offsets came from a located marker.
    pub resumed: bool,
}

impl ResumePoint {
    pub fn gap(&self) -> u64 {
        self.from_offset - self.to_offset
    }
}

/// Offsets for this run: the task's own offsets, or the ones recovered from
/// the marker when `search_mark` is set.
pub fn resolve_offsets<F>(task: &ShiftTask, on_progress: F) -> Result<ResumePoint, ResumeError>
where
    F: FnMut(u64, Duration),
{
    if !task.search_mark {
        return Ok(ResumePoint {
            from_offset: task.from_offset,
            to_offset: task.to_offset,
            resumed: false,
        });
    }
    scan_for_marker(task, on_progress)
}

/// Scan from `task.search_offset` for the first complete marker.
///
/// `on_progress` receives the size and duration of every read.
pub fn scan_for_marker<F>(task: &ShiftTask, mut on_progress: F) -> Result<ResumePoint, ResumeError>
where
    F: FnMut(u64, Duration),
{
    let gap = task.gap();
    let marker = build_marker(gap, task.marker_size);
    let marker_len = marker.len();
    let not_found = |scanned| ResumeError::NotFound {
        marker_len,
        search_offset: task.search_offset,
        scanned,
    };
    let mut matcher = MarkerMatcher::new(marker).ok_or_else(|| not_found(0))?;

    info!(
        "searching marker len={} from offset {} (to={} from={})",
        marker_len, task.search_offset, task.to_offset, task.from_offset
    );

    let mut file = File::open(task.path())?;
    file.seek(SeekFrom::Start(task.search_offset))?;

    let mut buf = vec![0u8; task.chunk_size];
    let mut file_pos = task.search_offset;
    loop {
        let start = Instant::now();
        let count = match file.read(&mut buf) {
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        on_progress(count as u64, start.elapsed());
        if count == 0 {
            return Err(not_found(file_pos - task.search_offset));
        }

        if let Some(idx) = matcher.find(&buf[..count]) {
            let last = file_pos + idx as u64;
            let to_offset = last + 1 - marker_len as u64;
            let point = ResumePoint {
                from_offset: to_offset + gap,
                to_offset,
                resumed: true,
            };
            info!(
                "found marker ending at {}: to={} from={}",
                last, point.to_offset, point.from_offset
            );
            return Ok(point);
        }
        file_pos += count as u64;
        debug!("marker search at {} partial={}", file_pos, matcher.partial());
    }
}
