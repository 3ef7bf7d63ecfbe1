//! Runtime counters for the logging engine.
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::trace;

/// Counters owned by one `LoggingEngine`.
///
/// `record_success` is only called by the engine's dispatcher task; the
/// accumulator is atomic regardless so snapshots never tear.
#[derive(Debug, Default)]
pub struct Metrics {
    accepted: AtomicU64,
    failed: AtomicU64,
    flushes: AtomicU64,
    flush_time_nanos: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one entry accepted by the engine's filter.
    pub fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the wall-clock duration of one completed flush.
    pub fn record_success(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.flush_time_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one failed sink write. Only the count is kept.
    pub fn record_error(&self, err: &dyn std::error::Error) {
        trace!("Discarding sink error detail: {}", err);
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time copy of the counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            accepted: self.accepted.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            total_flush_time: Duration::from_nanos(self.flush_time_nanos.load(Ordering::Relaxed)),
        }
    }
}

/// A copy of the engine counters at one moment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Entries that passed the filter and were enqueued.
    pub accepted: u64,
    /// Sink write attempts that returned an error.
    pub failed: u64,
    /// Non-empty batches delivered to the sinks.
    pub flushes: u64,
    /// Cumulative duration of all flushes.
    pub total_flush_time: Duration,
}

impl MetricsSnapshot {
    /// Cumulative flush time divided by the accepted-entry count.
    ///
    /// Returns zero when nothing has been accepted yet.
    pub fn average_time(&self) -> Duration {
        if self.accepted == 0 {
            return Duration::ZERO;
        }
        let nanos = self.total_flush_time.as_nanos() / u128::from(self.accepted);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Logs: {}, Errors: {}, Avg Time: {:.3} ms",
            self.accepted,
            self.failed,
            self.average_time().as_secs_f64() * 1000.0
        )
    }
}
