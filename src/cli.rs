use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::task::ShiftTask;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CliOptions {
    /// File to shift in place
    #[arg(long)]
    pub filename: PathBuf,

    /// First byte that is kept; everything from here moves down
    #[arg(long)]
    pub from: u64,

    /// Destination of the byte at --from
    #[arg(long)]
    pub to: u64,

    /// Chunk size in bytes (overrides config)
    #[arg(long = "buffer")]
    pub chunk_size: Option<usize>,

    /// Chunk and status queue depth (overrides config)
    #[arg(long = "qsize")]
    pub queue_depth: Option<usize>,

    /// Maximum marker length in bytes (overrides config)
    #[arg(long)]
    pub marker_size: Option<usize>,

    /// Resume an interrupted run by locating its marker first
    #[arg(long)]
    pub search_mark: bool,

    /// Offset where the marker search starts (overrides config)
    #[arg(long)]
    pub search_offset: Option<u64>,

    /// Interval between progress lines, in milliseconds
    #[arg(long)]
    pub progress_interval_ms: Option<u64>,

    /// Optional path to config file (YAML)
    #[arg(long)]
    pub config_path: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Write the final run summary as JSON to this path
    #[arg(long)]
    pub summary_json: Option<PathBuf>,
}

impl CliOptions {
    /// Merge flags over config defaults.
    pub fn to_task(&self, cfg: &Config) -> ShiftTask {
        let mut task = ShiftTask::new(self.filename.clone(), self.from, self.to)
            .with_chunk_size(self.chunk_size.unwrap_or(cfg.chunk_size))
            .with_queue_depth(self.queue_depth.unwrap_or(cfg.queue_depth))
            .with_marker_size(self.marker_size.unwrap_or(cfg.marker_size));
        task.search_offset = self.search_offset.unwrap_or(cfg.search_offset);
        task.search_mark = self.search_mark;
        task
    }
}

pub fn parse() -> CliOptions {
    CliOptions::parse()
}
