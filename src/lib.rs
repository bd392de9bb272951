//! Streaming, resumable in-place removal of a byte range from a file.
//!
//! [`pipeline::run_shift`] moves every byte from `from_offset` onward down to
//! `to_offset` with bounded memory. A marker written after each chunk lets an
//! interrupted run be resumed by [`resume::scan_for_marker`].
//!
//! ```rust,no_run
//! use shiftpart::pipeline::{self, status::ProgressConfig};
//! use shiftpart::task::ShiftTask;
//!
//! let task = ShiftTask::new("disk.img", 4096, 512).with_chunk_size(64 * 1024);
//! let summary = pipeline::run_shift(&task, ProgressConfig::default())?;
//! println!("moved {} bytes", summary.totals.write_bytes);
//! # Ok::<(), shiftpart::pipeline::PipelineError>(())
//! ```

pub mod chunk;
pub mod cli;
pub mod config;
pub mod logging;
pub mod marker;
pub mod pipeline;
pub mod resume;
pub mod task;
