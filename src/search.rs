//! Parallel brute-force search for the lowest reachable location.
//!
//! Seed ranges are cut into work units and fed through a bounded queue to a
//! fixed pool of worker threads. A worker pulls the next unit as soon as it
//! finishes the previous one, scans every seed in it, and reports the unit's
//! minimum to a single aggregator. Nothing is shared between threads except
//! the read-only almanac and the two channels.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::almanac::{Almanac, SeedRange};
use crate::cancel::CancelToken;
use crate::error::{AlmanacError, Result};
use crate::progress::ProgressSink;

/// Seeds scanned between checks of the cancel token
const CANCEL_CHECK_INTERVAL: u64 = 1 << 16;

/// Queue slots per worker
const QUEUE_DEPTH_PER_WORKER: usize = 2;

/// How the lowest location is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Evaluate every seed through the chain.
    #[default]
    Scan,
    /// Push whole intervals through each stage.
    Intervals,
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scan" | "brute" => Ok(Strategy::Scan),
            "intervals" | "ranges" => Ok(Strategy::Intervals),
            other => Err(format!("unknown strategy '{other}', use scan or intervals")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Number of worker threads, at least one
    pub concurrency: usize,
    /// Upper bound on seeds per work unit; `None` makes each seed range one unit
    pub batch_size: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            concurrency: num_cpus::get(),
            batch_size: None,
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// `Some(0)` is treated as unset.
    pub fn with_batch_size(mut self, batch_size: Option<u64>) -> Self {
        self.batch_size = batch_size.filter(|&b| b > 0);
        self
    }
}

/// A sub-range of one seed range, handed to a single worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkItem {
    /// Position in dispatch order
    pub index: usize,
    /// Seed range this unit was cut from
    pub range_index: usize,
    pub start: u64,
    pub length: u64,
}

impl WorkItem {
    /// Exclusive end, widened so a unit ending at `u64::MAX` can be shown.
    pub fn end(&self) -> u128 {
        u128::from(self.start) + u128::from(self.length)
    }
}

/// Lazily cut seed ranges into work units of at most `batch_size` seeds.
///
/// Empty ranges produce no units. Without a batch size every non-empty range
/// is a single unit.
pub fn work_items(
    ranges: &[SeedRange],
    batch_size: Option<u64>,
) -> impl Iterator<Item = WorkItem> + '_ {
    ranges
        .iter()
        .enumerate()
        .filter(|(_, range)| !range.is_empty())
        .flat_map(move |(range_index, range)| {
            let step = batch_size.filter(|&b| b > 0).unwrap_or(range.length);
            let (start, length) = (range.start, range.length);
            // Offsets into the range keep the arithmetic inside u64 even when
            // the range reaches u64::MAX
            std::iter::successors(Some(0u64), move |&offset| {
                offset.checked_add(step).filter(|&next| next < length)
            })
            .map(move |offset| (range_index, start + offset, step.min(length - offset)))
        })
        .enumerate()
        .map(|(index, (range_index, start, length))| WorkItem {
            index,
            range_index,
            start,
            length,
        })
}

/// Result of a completed search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Lowest location reached
    pub location: u64,
    /// First seed (in seed-range order) reaching `location`
    pub seed: u64,
    /// Work units evaluated
    pub units: usize,
    /// Seeds accounted for across all units
    pub seeds_covered: u64,
}

/// Best `(location, seed)` with the dispatch index it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Candidate {
    location: u64,
    unit: usize,
    seed: u64,
}

enum UnitReport {
    Done {
        worker: usize,
        item: WorkItem,
        best: (u64, u64),
        elapsed: Duration,
    },
    Abandoned,
    Failed {
        worker: usize,
        reason: String,
    },
}

/// Scan every seed of `item`, checking `cancel` periodically. `None` if abandoned.
fn scan_unit(almanac: &Almanac, item: &WorkItem, cancel: &CancelToken) -> Option<(u64, u64)> {
    let mut best: Option<(u64, u64)> = None;
    let mut offset = 0u64;
    while offset < item.length {
        if cancel.is_cancelled() {
            return None;
        }
        let chunk = CANCEL_CHECK_INTERVAL.min(item.length - offset);
        if let Some(found) = almanac.lowest_location_in(item.start + offset, chunk) {
            if best.map_or(true, |(lowest, _)| found.0 < lowest) {
                best = Some(found);
            }
        }
        offset += chunk;
    }
    best
}

fn panic_reason(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Brute-force searcher over an almanac's seed domain.
pub struct Searcher<'a> {
    almanac: &'a Almanac,
    config: SearchConfig,
    cancel: CancelToken,
    progress: ProgressSink,
}

impl<'a> Searcher<'a> {
    pub fn new(almanac: &'a Almanac, config: SearchConfig) -> Self {
        Searcher {
            almanac,
            config,
            cancel: CancelToken::new(),
            progress: ProgressSink::discard(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    /// Run the search to completion.
    ///
    /// Fails with [`AlmanacError::EmptyDomain`] when there is nothing to scan,
    /// [`AlmanacError::WorkerFailed`] if any unit fails, and
    /// [`AlmanacError::Cancelled`] if the cancel token fires before every unit
    /// has reported. No partial minimum is ever returned.
    pub fn run(&self) -> Result<SearchOutcome> {
        let ranges = self.almanac.seed_ranges();
        if self.almanac.total_seed_count() == 0 {
            return Err(AlmanacError::EmptyDomain);
        }

        let concurrency = self.config.concurrency.max(1);
        let started = Instant::now();
        log::info!(
            "searching {} seeds in {} ranges with {} workers (batch size {})",
            self.almanac.total_seed_count(),
            ranges.len(),
            concurrency,
            self.config
                .batch_size
                .map_or_else(|| "unbatched".to_string(), |b| b.to_string())
        );

        let (work_tx, work_rx) = mpsc::sync_channel::<WorkItem>(concurrency * QUEUE_DEPTH_PER_WORKER);
        let work_rx = Arc::new(Mutex::new(work_rx));
        let (result_tx, result_rx) = mpsc::channel::<UnitReport>();

        thread::scope(move |scope| -> Result<SearchOutcome> {
            let dispatcher = thread::Builder::new()
                .name("almanac-dispatch".to_string())
                .spawn_scoped(scope, move || self.dispatch(work_tx))?;

            let mut workers = Vec::with_capacity(concurrency);
            for worker in 0..concurrency {
                let result_tx = result_tx.clone();
                let queue = Arc::clone(&work_rx);
                let handle = thread::Builder::new()
                    .name(format!("almanac-worker-{worker}"))
                    .spawn_scoped(scope, move || self.work(worker, &queue, result_tx));
                match handle {
                    Ok(handle) => workers.push(handle),
                    Err(e) => {
                        // With no receiver left the dispatcher's blocked send
                        // fails; started workers drain the queue.
                        drop(work_rx);
                        self.cancel.cancel();
                        return Err(AlmanacError::Io(e));
                    }
                }
            }
            drop(work_rx); // only the workers hold the queue
            drop(result_tx); // aggregator's copy

            let mut best: Option<Candidate> = None;
            let mut completed = 0usize;
            let mut seeds_covered = 0u64;
            let mut abandoned = 0usize;
            let mut failure: Option<AlmanacError> = None;

            for report in result_rx {
                match report {
                    UnitReport::Done {
                        worker,
                        item,
                        best: (location, seed),
                        elapsed,
                    } => {
                        completed += 1;
                        seeds_covered = seeds_covered.saturating_add(item.length);
                        log::debug!(
                            "worker {worker} unit #{} ({} -> {}) = {location} in {elapsed:?}",
                            item.index,
                            item.start,
                            item.end()
                        );
                        self.progress.line(format_args!(
                            "[worker: {worker}] unit #{} ({} -> {}) = {location} {elapsed:?}",
                            item.index,
                            item.start,
                            item.end()
                        ));
                        let candidate = Candidate {
                            location,
                            unit: item.index,
                            seed,
                        };
                        if best.map_or(true, |b| candidate < b) {
                            best = Some(candidate);
                        }
                    }
                    UnitReport::Abandoned => abandoned += 1,
                    UnitReport::Failed { worker, reason } => {
                        log::error!("worker {worker} failed: {reason}");
                        self.cancel.cancel();
                        if failure.is_none() {
                            failure = Some(AlmanacError::WorkerFailed { worker, reason });
                        }
                    }
                }
            }

            let (dispatched, exhausted) = dispatcher.join().map_err(|payload| {
                AlmanacError::WorkerFailed {
                    worker: concurrency,
                    reason: format!("dispatcher panicked: {}", panic_reason(payload)),
                }
            })?;
            for (worker, handle) in workers.into_iter().enumerate() {
                if let Err(payload) = handle.join() {
                    failure.get_or_insert(AlmanacError::WorkerFailed {
                        worker,
                        reason: panic_reason(payload),
                    });
                }
            }

            if let Some(failure) = failure {
                return Err(failure);
            }
            if !exhausted || abandoned > 0 || completed < dispatched {
                log::warn!("search cancelled: {completed} of {dispatched} units completed");
                return Err(AlmanacError::Cancelled {
                    completed,
                    dispatched,
                });
            }

            let best = best.ok_or(AlmanacError::EmptyDomain)?;
            log::info!(
                "lowest location {} from seed {} ({} units, {:?})",
                best.location,
                best.seed,
                completed,
                started.elapsed()
            );
            Ok(SearchOutcome {
                location: best.location,
                seed: best.seed,
                units: completed,
                seeds_covered,
            })
        })
    }

    /// Feed work units into the queue. Returns how many were sent and whether
    /// every unit was sent.
    fn dispatch(&self, work_tx: mpsc::SyncSender<WorkItem>) -> (usize, bool) {
        let ranges = self.almanac.seed_ranges();
        let mut dispatched = 0usize;
        let mut current: Option<(usize, Instant)> = None;

        for item in work_items(ranges, self.config.batch_size) {
            if self.cancel.is_cancelled() {
                return (dispatched, false);
            }
            if current.map(|(range_index, _)| range_index) != Some(item.range_index) {
                if let Some((range_index, since)) = current {
                    self.report_range(range_index, since);
                }
                current = Some((item.range_index, Instant::now()));
            }
            if work_tx.send(item).is_err() {
                // Every worker is gone
                return (dispatched, false);
            }
            dispatched += 1;
        }
        if let Some((range_index, since)) = current {
            self.report_range(range_index, since);
        }
        (dispatched, true)
    }

    fn report_range(&self, range_index: usize, since: Instant) {
        let ranges = self.almanac.seed_ranges();
        let range = &ranges[range_index];
        self.progress.line(format_args!(
            "Range {} of {} ({}->{}) dispatched {:?}",
            range_index + 1,
            ranges.len(),
            range.start,
            range.end(),
            since.elapsed()
        ));
    }

    fn work(
        &self,
        worker: usize,
        work_rx: &Mutex<Receiver<WorkItem>>,
        result_tx: mpsc::Sender<UnitReport>,
    ) {
        loop {
            let item = match work_rx.lock() {
                Ok(rx) => rx.recv(),
                Err(_) => return,
            };
            // Queue closed: no more work
            let Ok(item) = item else {
                return;
            };

            let unit_started = Instant::now();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                scan_unit(self.almanac, &item, &self.cancel)
            }));
            let report = match outcome {
                Ok(Some(best)) => UnitReport::Done {
                    worker,
                    item,
                    best,
                    elapsed: unit_started.elapsed(),
                },
                Ok(None) => UnitReport::Abandoned,
                Err(payload) => UnitReport::Failed {
                    worker,
                    reason: panic_reason(payload),
                },
            };
            if result_tx.send(report).is_err() {
                return;
            }
        }
    }
}

/// Lowest location over the whole seed domain using the brute-force scan.
pub fn find_global_minimum(almanac: &Almanac, config: SearchConfig) -> Result<SearchOutcome> {
    Searcher::new(almanac, config).run()
}
