//! # Pipeline Events
//!
//! Status events reported by the reader, writer and resume scan to the
//! status aggregator.

use std::time::Duration;

use super::PipelineError;

/// Events sent to the status aggregator thread
#[derive(Debug)]
pub enum StatusEvent {
    /// The reader filled a chunk; `offset_after` is the source cursor after it
    Read {
        count: u64,
        elapsed: Duration,
        offset_after: u64,
    },
    /// The writer stored a chunk at destination `offset`
    Write {
        count: u64,
        elapsed: Duration,
        offset: u64,
    },
    /// The resume scan consumed a block while looking for the marker
    Scanned { count: u64, elapsed: Duration },
    /// The reader hit end of file and sent the terminal chunk
    ReadDone,
    /// The writer consumed the terminal chunk
    WriteDone,
    /// A fatal error; the run stops
    Failed(PipelineError),
}
