//! # Pipeline Workers
//!
//! Reader and writer halves of the shift. Each opens the file on its own and
//! seeks explicitly before every operation; the two cursors stay one gap
//! apart and the writer never touches bytes the reader has not consumed.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

use crate::chunk::Chunk;

use super::PipelineError;
use super::events::StatusEvent;

/// Stream the file from `from_offset` to end of file into `chunk_tx`.
///
/// Runs on the caller's thread. Errors are reported as
/// [`StatusEvent::Failed`]; a closed channel means the run is already being
/// torn down, so the reader just stops.
pub fn run_reader(
    path: &Path,
    from_offset: u64,
    chunk_size: usize,
    marker_len: usize,
    chunk_tx: Sender<Chunk>,
    status_tx: Sender<StatusEvent>,
) {
    if let Err(err) = read_loop(
        path,
        from_offset,
        chunk_size,
        marker_len,
        &chunk_tx,
        &status_tx,
    ) {
        warn!("reader stopped: {err}");
        let _ = status_tx.send(StatusEvent::Failed(err));
    }
}

fn read_loop(
    path: &Path,
    from_offset: u64,
    chunk_size: usize,
    marker_len: usize,
    chunk_tx: &Sender<Chunk>,
    status_tx: &Sender<StatusEvent>,
) -> Result<(), PipelineError> {
    let mut file = File::open(path).map_err(|e| PipelineError::io("open", from_offset, e))?;
    file.seek(SeekFrom::Start(from_offset))
        .map_err(|e| PipelineError::io("seek", from_offset, e))?;

    let mut offset = from_offset;
    loop {
        let mut chunk = Chunk::with_capacity(offset, chunk_size, marker_len);
        let start = Instant::now();
        let count = fill_buffer(&mut file, &mut chunk.payload)
            .map_err(|e| PipelineError::io("read", offset, e))?;
        let elapsed = start.elapsed();

        if count == 0 {
            debug!("reader reached end of file at {offset}");
            if chunk_tx.send(Chunk::end()).is_err() {
                return Ok(());
            }
            let _ = status_tx.send(StatusEvent::ReadDone);
            return Ok(());
        }

        chunk.payload.truncate(count);
        offset += count as u64;
        let event = StatusEvent::Read {
            count: count as u64,
            elapsed,
            offset_after: offset,
        };
        if status_tx.send(event).is_err() || chunk_tx.send(chunk).is_err() {
            debug!("reader channels closed at {offset}");
            return Ok(());
        }
    }
}

/// Read until `buf` is full or the file ends.
fn fill_buffer(file: &mut File, buf: &mut [u8]) -> io::Result<usize> {
    let mut read = 0usize;
    while read < buf.len() {
        match file.read(&mut buf[read..]) {
            Ok(0) => break,
            Ok(n) => read += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(read)
}

/// Spawn the writer thread.
///
/// Every chunk is written together with `marker` at `source_offset - gap`.
/// The next chunk's payload covers that marker again, so after the last
/// write the marker sits exactly where an interrupted run would resume.
pub fn spawn_writer(
    path: PathBuf,
    from_offset: u64,
    to_offset: u64,
    marker: Vec<u8>,
    chunk_rx: Receiver<Chunk>,
    status_tx: Sender<StatusEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        if let Err(err) = write_loop(
            &path,
            from_offset,
            to_offset,
            &marker,
            &chunk_rx,
            &status_tx,
        ) {
            warn!("writer stopped: {err}");
            let _ = status_tx.send(StatusEvent::Failed(err));
        }
    })
}

fn write_loop(
    path: &Path,
    from_offset: u64,
    to_offset: u64,
    marker: &[u8],
    chunk_rx: &Receiver<Chunk>,
    status_tx: &Sender<StatusEvent>,
) -> Result<(), PipelineError> {
    let mut file = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|e| PipelineError::io("open", to_offset, e))?;
    let gap = from_offset - to_offset;

    for chunk in chunk_rx {
        if chunk.is_end() {
            file.sync_data()
                .map_err(|e| PipelineError::io("sync", to_offset, e))?;
            let _ = status_tx.send(StatusEvent::WriteDone);
            return Ok(());
        }

        let protocol_error = PipelineError::Protocol {
            source_offset: chunk.source_offset,
            to_offset,
        };
        if chunk.source_offset < to_offset {
            return Err(protocol_error);
        }
        let dest = chunk.destination(gap).ok_or(protocol_error)?;
        let count = chunk.len() as u64;
        let buf = chunk.seal(marker);

        let start = Instant::now();
        file.seek(SeekFrom::Start(dest))
            .map_err(|e| PipelineError::io("seek", dest, e))?;
        file.write_all(&buf)
            .map_err(|e| PipelineError::io("write", dest, e))?;
        let elapsed = start.elapsed();

        let event = StatusEvent::Write {
            count,
            elapsed,
            offset: dest,
        };
        if status_tx.send(event).is_err() {
            debug!("status channel closed, writer stopping at {dest}");
            return Ok(());
        }
    }

    debug!("chunk channel closed before end of stream");
    Ok(())
}
