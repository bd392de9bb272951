//! Shared helpers for the shift integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use shiftpart::marker::build_marker;
use shiftpart::pipeline::status::{ProgressConfig, ProgressReporter, ProgressSnapshot};

/// Bytes that never line up with the marker alphabet over any useful length.
pub fn sample_data(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 7 + 3) % 251) as u8).collect()
}

pub fn write_input(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).expect("write input");
    path
}

/// Expected content of `[0, len - gap)` after a complete shift.
pub fn expected_prefix(original: &[u8], from: usize, to: usize) -> Vec<u8> {
    let mut out = original[..to].to_vec();
    out.extend_from_slice(&original[from..]);
    out
}

/// File content after the first `chunks` writes of an interrupted run.
///
/// Source bytes are never overwritten before the reader consumes them, so
/// every payload is the original content at its source offset.
pub fn interrupted_state(
    original: &[u8],
    from: usize,
    to: usize,
    chunk_size: usize,
    marker_size: usize,
    chunks: usize,
) -> Vec<u8> {
    let gap = from - to;
    let marker = build_marker(gap as u64, marker_size);
    let mut state = original.to_vec();
    for i in 0..chunks {
        let src = from + i * chunk_size;
        if src >= original.len() {
            break;
        }
        let end = (src + chunk_size).min(original.len());
        let mut block = original[src..end].to_vec();
        block.extend_from_slice(&marker);
        let dest = src - gap;
        state[dest..dest + block.len()].copy_from_slice(&block);
    }
    state
}

#[derive(Default)]
pub struct CollectingReporter(pub Mutex<Vec<ProgressSnapshot>>);

impl ProgressReporter for CollectingReporter {
    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        self.0.lock().expect("reporter lock").push(snapshot.clone());
    }
}

/// Progress config that in practice only records the final report.
pub fn quiet_progress() -> (Arc<CollectingReporter>, ProgressConfig) {
    let reporter = Arc::new(CollectingReporter::default());
    let cfg = ProgressConfig {
        reporter: reporter.clone(),
        interval: Duration::from_secs(3600),
    };
    (reporter, cfg)
}
