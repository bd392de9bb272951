//! # Status Aggregation
//!
//! One thread folds status events into [`RunningTotals`]; a second prints
//! progress on a fixed interval. The fold loop stops once both directions
//! report done (or on the first failure), closes the snapshot channel and
//! joins the reporter before handing its result back.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, never, select, tick, unbounded};
use serde::Serialize;
use tracing::{info, warn};

use super::PipelineError;
use super::events::StatusEvent;

const MIB: f64 = 1024.0 * 1024.0;

/// Cumulative counters for one run, owned by the fold loop.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunningTotals {
    pub read_bytes: u64,
    pub read_calls: u64,
    pub read_time: Duration,
    pub read_offset: u64,
    pub write_bytes: u64,
    pub write_calls: u64,
    pub write_time: Duration,
    pub write_offset: u64,
    pub scanned_bytes: u64,
    pub scan_time: Duration,
    pub read_done: bool,
    pub write_done: bool,
}

impl RunningTotals {
    pub fn apply(&mut self, event: &StatusEvent) {
        match event {
            StatusEvent::Read {
                count,
                elapsed,
                offset_after,
            } => {
                self.read_bytes += count;
                self.read_time += *elapsed;
                if *count > 0 {
                    self.read_calls += 1;
                }
                if *offset_after > 0 {
                    self.read_offset = *offset_after;
                }
            }
            StatusEvent::Write {
                count,
                elapsed,
                offset,
            } => {
                self.write_bytes += count;
                self.write_time += *elapsed;
                if *count > 0 {
                    self.write_calls += 1;
                }
                if *offset > 0 {
                    self.write_offset = *offset;
                }
            }
            StatusEvent::Scanned { count, elapsed } => {
                self.scanned_bytes += count;
                self.scan_time += *elapsed;
            }
            StatusEvent::ReadDone => self.read_done = true,
            StatusEvent::WriteDone => self.write_done = true,
            StatusEvent::Failed(_) => {}
        }
    }

    pub fn is_done(&self) -> bool {
        self.read_done && self.write_done
    }
}

/// Progress snapshot reported during a run.
#[derive(Debug, Clone, Default)]
pub struct ProgressSnapshot {
    pub totals: RunningTotals,
    pub elapsed_seconds: f64,
    pub read_mib_per_sec: f64,
    pub write_mib_per_sec: f64,
}

impl ProgressSnapshot {
    pub fn new(totals: &RunningTotals, elapsed: Duration) -> Self {
        let elapsed_seconds = elapsed.as_secs_f64();
        let rate = |bytes: u64| {
            if elapsed_seconds > 0.0 {
                bytes as f64 / MIB / elapsed_seconds
            } else {
                0.0
            }
        };
        Self {
            totals: totals.clone(),
            elapsed_seconds,
            read_mib_per_sec: rate(totals.read_bytes),
            write_mib_per_sec: rate(totals.write_bytes),
        }
    }

    pub fn done(&self) -> bool {
        self.totals.is_done()
    }
}

/// Progress callback trait for long-running shifts.
pub trait ProgressReporter: Send + Sync {
    fn on_progress(&self, snapshot: &ProgressSnapshot);
}

/// Writes one `info!` line per report.
pub struct LogProgressReporter;

impl ProgressReporter for LogProgressReporter {
    fn on_progress(&self, s: &ProgressSnapshot) {
        let t = &s.totals;
        info!(
            "read: ofs:{} {}({}-{:.3}s) write: ofs:{} {}({}-{:.3}s) scanned:{} {:.1}/{:.1} MiB/s done:{}",
            t.read_offset,
            t.read_bytes,
            t.read_calls,
            t.read_time.as_secs_f64(),
            t.write_offset,
            t.write_bytes,
            t.write_calls,
            t.write_time.as_secs_f64(),
            t.scanned_bytes,
            s.read_mib_per_sec,
            s.write_mib_per_sec,
            s.done()
        );
    }
}

pub struct ProgressConfig {
    pub reporter: Arc<dyn ProgressReporter>,
    /// Zero reports every snapshot instead of ticking.
    pub interval: Duration,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            reporter: Arc::new(LogProgressReporter),
            interval: Duration::from_secs(1),
        }
    }
}

/// Spawn the aggregator. The handle yields the final totals, or the first
/// error any producer reported.
pub fn spawn_status_aggregator(
    rx: Receiver<StatusEvent>,
    progress: ProgressConfig,
) -> thread::JoinHandle<Result<RunningTotals, PipelineError>> {
    thread::spawn(move || {
        info!("started status");
        let started = Instant::now();
        let (snapshot_tx, snapshot_rx) = unbounded::<ProgressSnapshot>();
        let reporter = spawn_reporter(snapshot_rx, progress);

        let result = fold_events(&rx, &snapshot_tx, started);

        // Closing both ends wakes the reporter and fails any pending send
        // from the reader or writer.
        drop(snapshot_tx);
        drop(rx);
        if reporter.join().is_err() {
            warn!("progress reporter panicked");
        }
        info!("status stopped");
        result
    })
}

fn fold_events(
    rx: &Receiver<StatusEvent>,
    snapshots: &Sender<ProgressSnapshot>,
    started: Instant,
) -> Result<RunningTotals, PipelineError> {
    let mut totals = RunningTotals::default();
    for event in rx {
        match event {
            StatusEvent::Failed(err) => return Err(err),
            event => totals.apply(&event),
        }
        let _ = snapshots.send(ProgressSnapshot::new(&totals, started.elapsed()));
        if totals.is_done() {
            return Ok(totals);
        }
    }
    Err(PipelineError::StatusChannelClosed)
}

fn spawn_reporter(
    rx: Receiver<ProgressSnapshot>,
    progress: ProgressConfig,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let report_each = progress.interval.is_zero();
        let ticker = if report_each {
            never()
        } else {
            tick(progress.interval)
        };
        let mut latest = ProgressSnapshot::default();
        loop {
            select! {
                recv(rx) -> msg => match msg {
                    Ok(snapshot) => {
                        latest = snapshot;
                        if report_each {
                            progress.reporter.on_progress(&latest);
                        }
                    }
                    Err(_) => {
                        if !report_each {
                            progress.reporter.on_progress(&latest);
                        }
                        break;
                    }
                },
                recv(ticker) -> _ => progress.reporter.on_progress(&latest),
            }
        }
    })
}
