//! This module contains the background loop that drains the log queue.
use super::config::FanOut;
use super::{EngineState, SinkList};
use crate::logging::sink::LogSink;
use crate::logging::{LogEntry, Metrics, SinkError};
use futures::future::join_all;
use futures::FutureExt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::select;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace, warn};

/// The single consumer of an engine's queue.
pub(super) struct Dispatcher {
    pub(super) queue: mpsc::UnboundedReceiver<LogEntry>,
    pub(super) sinks: Arc<RwLock<SinkList>>,
    pub(super) metrics: Arc<Metrics>,
    pub(super) state: Arc<watch::Sender<EngineState>>,
    pub(super) batch_size: usize,
    pub(super) flush_interval: Duration,
    pub(super) fan_out: FanOut,
}

impl Dispatcher {
    /// Runs until the queue is closed and every queued entry has been flushed.
    ///
    /// A batch is flushed when it reaches `batch_size` entries or when
    /// `flush_interval` has passed since the previous flush, whichever comes
    /// first. Closing the queue drains what is left, flushes the final partial
    /// batch and marks the engine `Drained`.
    pub(super) async fn run(mut self) {
        debug!(
            "Log dispatcher started (batch size {}, flush interval {:?})",
            self.batch_size, self.flush_interval
        );

        let mut batch = Vec::with_capacity(self.batch_size);
        let mut deadline = Instant::now() + self.flush_interval;

        loop {
            select! {
                biased;

                received = self.queue.recv() => {
                    match received {
                        Some(entry) => {
                            batch.push(entry);
                            if batch.len() >= self.batch_size {
                                self.flush(&mut batch).await;
                                deadline = Instant::now() + self.flush_interval;
                            }
                        }
                        None => break,
                    }
                }

                _ = sleep_until(deadline) => {
                    if !batch.is_empty() {
                        self.flush(&mut batch).await;
                    }
                    deadline = Instant::now() + self.flush_interval;
                }
            }
        }

        if !batch.is_empty() {
            self.flush(&mut batch).await;
        }

        self.state.send_replace(EngineState::Drained);
        debug!("Log queue closed and drained, dispatcher exiting");
    }

    /// Delivers a batch to every registered sink and empties it.
    async fn flush(&self, batch: &mut Vec<LogEntry>) {
        let sinks = Arc::clone(&*self.sinks.read().unwrap_or_else(PoisonError::into_inner));
        let entries: &[LogEntry] = batch;
        let started = std::time::Instant::now();

        match self.fan_out {
            FanOut::Sequential => {
                for sink in sinks.iter() {
                    deliver(sink.as_ref(), entries, &self.metrics).await;
                }
            }
            FanOut::Parallel => {
                join_all(
                    sinks
                        .iter()
                        .map(|sink| deliver(sink.as_ref(), entries, &self.metrics)),
                )
                .await;
            }
        }

        let elapsed = started.elapsed();
        self.metrics.record_success(elapsed);
        trace!(
            "Flushed {} entries to {} sinks in {:?}",
            entries.len(),
            sinks.len(),
            elapsed
        );
        batch.clear();
    }
}

/// Writes the entries a sink accepts, in order, counting each failed write.
///
/// A sink whose category predicate panics is skipped for this batch and
/// counted once as a failure.
async fn deliver(sink: &dyn LogSink, entries: &[LogEntry], metrics: &Metrics) {
    let accepted = panic::catch_unwind(AssertUnwindSafe(|| {
        entries
            .iter()
            .filter(|e| sink.accepts(&e.category))
            .collect::<Vec<_>>()
    }));
    let accepted = match accepted {
        Ok(accepted) => accepted,
        Err(_) => {
            let e = SinkError::Unavailable("sink panicked while filtering".to_string());
            warn!("Skipping log sink for this batch: {}", e);
            metrics.record_error(&e);
            return;
        }
    };

    for entry in accepted {
        let result = match AssertUnwindSafe(sink.write(entry)).catch_unwind().await {
            Ok(result) => result,
            Err(_) => Err(SinkError::Unavailable(
                "sink panicked while writing".to_string(),
            )),
        };

        if let Err(e) = result {
            warn!("Log sink write failed: {}", e);
            metrics.record_error(&e);
        }
    }
}
