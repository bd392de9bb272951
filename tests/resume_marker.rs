mod common;

use std::fs;

use shiftpart::marker::build_marker;
use shiftpart::pipeline::{self, PipelineError};
use shiftpart::resume::{self, ResumeError};
use shiftpart::task::ShiftTask;

use common::{expected_prefix, interrupted_state, quiet_progress, sample_data, write_input};

const CHUNK: usize = 4096;
const MARKER: usize = 512;

#[test]
fn resume_after_interruption_matches_uninterrupted_run() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let original = sample_data(120_000);
    let (from, to) = (30_000usize, 2_000usize);

    let reference = write_input(temp_dir.path(), "reference.bin", &original);
    let task = ShiftTask::new(&reference, from as u64, to as u64).with_chunk_size(CHUNK);
    let (_reporter, progress) = quiet_progress();
    pipeline::run_shift(&task, progress).expect("reference shift");

    let written_chunks = 9;
    let state = interrupted_state(&original, from, to, CHUNK, MARKER, written_chunks);
    let interrupted = write_input(temp_dir.path(), "interrupted.bin", &state);

    let task = ShiftTask::new(&interrupted, from as u64, to as u64)
        .with_chunk_size(CHUNK)
        .with_search(0);
    let (_reporter, progress) = quiet_progress();
    let summary = pipeline::run_shift(&task, progress).expect("resumed shift");

    assert!(summary.resumed);
    assert_eq!(summary.to_offset, (to + written_chunks * CHUNK) as u64);
    assert_eq!(summary.from_offset, (from + written_chunks * CHUNK) as u64);
    assert_eq!(summary.gap, (from - to) as u64);
    assert!(summary.totals.scanned_bytes > 0);

    let resumed = fs::read(&interrupted).expect("read resumed");
    assert_eq!(resumed, fs::read(&reference).expect("read reference"));
    let keep = original.len() - (from - to);
    assert_eq!(&resumed[..keep], &expected_prefix(&original, from, to)[..]);
}

#[test]
fn resume_after_complete_run_is_a_no_op() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let original = sample_data(50_000);
    let path = write_input(temp_dir.path(), "input.bin", &original);
    let (from, to) = (10_000u64, 1_000u64);

    let task = ShiftTask::new(&path, from, to).with_chunk_size(CHUNK);
    let (_reporter, progress) = quiet_progress();
    pipeline::run_shift(&task, progress).expect("first shift");
    let after_first = fs::read(&path).expect("read back");

    let task = task.with_search(0);
    let (_reporter, progress) = quiet_progress();
    let summary = pipeline::run_shift(&task, progress).expect("resume");

    assert!(summary.resumed);
    assert_eq!(summary.to_offset, original.len() as u64 - (from - to));
    assert_eq!(summary.from_offset, original.len() as u64);
    assert_eq!(summary.totals.write_bytes, 0);
    assert_eq!(fs::read(&path).expect("read back"), after_first);
}

#[test]
fn scan_reports_offset_before_full_size_marker() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let marker = build_marker(2_048, MARKER);
    assert_eq!(marker.len(), MARKER);

    let marker_start = 7_777usize;
    let mut data = sample_data(marker_start);
    data.extend_from_slice(&marker);
    data.extend_from_slice(&sample_data(1_000));
    let path = write_input(temp_dir.path(), "input.bin", &data);

    let task = ShiftTask::new(&path, 3_048, 1_000)
        .with_chunk_size(1_000)
        .with_search(0);
    let point = resume::scan_for_marker(&task, |_, _| {}).expect("found");

    let last_marker_byte = (marker_start + MARKER - 1) as u64;
    assert_eq!(point.to_offset, last_marker_byte + 1 - MARKER as u64);
    assert_eq!(point.from_offset, point.to_offset + 2_048);
}

#[test]
fn missing_marker_aborts_without_writing() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let original = sample_data(40_000);
    let path = write_input(temp_dir.path(), "input.bin", &original);

    let task = ShiftTask::new(&path, 8_000, 0)
        .with_chunk_size(CHUNK)
        .with_search(0);
    let (reporter, progress) = quiet_progress();
    match pipeline::run_shift(&task, progress) {
        Err(PipelineError::Resume(ResumeError::NotFound { scanned, .. })) => {
            assert_eq!(scanned, original.len() as u64);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(fs::read(&path).expect("read back"), original);

    let reports = reporter.0.lock().expect("reports");
    let last = reports.last().expect("final report");
    assert!(!last.done());
    assert_eq!(last.totals.write_bytes, 0);
}
