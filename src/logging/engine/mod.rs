//! This module defines the `LoggingEngine`, the producer-facing API of the
//! pipeline.
//!
//! Producers call `log` from any thread. Accepted entries go onto an unbounded
//! queue that a single background dispatcher drains in batches, fanning each
//! batch out to the registered sinks.
pub mod config;
mod dispatcher;

pub use config::{EngineConfig, FanOut};

use super::sink::LogSink;
use super::{EngineError, ErrorInfo, LogEntry, LogLevel, Metrics, MetricsSnapshot};
use dispatcher::Dispatcher;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// The sinks a flush is delivered to. Replaced wholesale on `add_sink`.
pub(crate) type SinkList = Arc<Vec<Arc<dyn LogSink>>>;

/// Lifecycle of an engine. States only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Queue open, dispatcher not yet scheduled.
    Created,
    /// Dispatcher scheduled and consuming.
    Running,
    /// Queue closed; the dispatcher is draining what was accepted.
    ShuttingDown,
    /// Every accepted entry has been flushed and the dispatcher has exited.
    Drained,
}

enum DispatcherSlot {
    Idle(Dispatcher),
    Running(JoinHandle<()>),
    Finished,
}

struct Shared {
    min_level: AtomicU8,
    categories: RwLock<HashMap<String, bool>>,
    sinks: Arc<RwLock<SinkList>>,
    metrics: Arc<Metrics>,
    /// `None` once shutdown has begun.
    queue: RwLock<Option<mpsc::UnboundedSender<LogEntry>>>,
    dispatcher: Mutex<DispatcherSlot>,
    state: Arc<watch::Sender<EngineState>>,
}

/// An asynchronous, batched, multi-sink logger.
///
/// The engine is a cheap handle: clone it and pass it to whatever needs to
/// log. Dropping every handle without calling `shutdown` closes the queue and
/// lets a running dispatcher drain in the background.
///
/// # Example
///
/// ```ignore
/// let engine = LoggingEngine::spawn(EngineConfig::default())?;
/// engine.add_sink(Arc::new(ConsoleSink::stdout()));
/// engine.log(LogLevel::Info, "Console", "started", None);
/// engine.shutdown().await;
/// ```
#[derive(Clone)]
pub struct LoggingEngine {
    shared: Arc<Shared>,
}

impl LoggingEngine {
    /// Creates an engine in the `Created` state.
    ///
    /// Entries logged before `start` are queued and flushed once the
    /// dispatcher runs.
    pub fn new(config: EngineConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(EngineState::Created);
        let state = Arc::new(state);
        let sinks: Arc<RwLock<SinkList>> = Arc::new(RwLock::new(Arc::new(Vec::new())));
        let metrics = Arc::new(Metrics::new());

        let dispatcher = Dispatcher {
            queue: rx,
            sinks: Arc::clone(&sinks),
            metrics: Arc::clone(&metrics),
            state: Arc::clone(&state),
            batch_size: config.batch_size.max(1),
            flush_interval: config.flush_interval,
            fan_out: config.fan_out,
        };

        Self {
            shared: Arc::new(Shared {
                min_level: AtomicU8::new(config.min_level.as_u8()),
                categories: RwLock::new(config.categories),
                sinks,
                metrics,
                queue: RwLock::new(Some(tx)),
                dispatcher: Mutex::new(DispatcherSlot::Idle(dispatcher)),
                state,
            }),
        }
    }

    /// Creates an engine and starts its dispatcher on the current runtime.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NoRuntime` when called outside a tokio runtime.
    pub fn spawn(config: EngineConfig) -> Result<Self, EngineError> {
        let engine = Self::new(config);
        engine.start()?;
        Ok(engine)
    }

    /// Schedules the background dispatcher on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// * `EngineError::NoRuntime` - Not called from within a tokio runtime.
    /// * `EngineError::AlreadyStarted` - The dispatcher is already running.
    /// * `EngineError::ShutDown` - `shutdown` has already been called.
    pub fn start(&self) -> Result<(), EngineError> {
        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;

        let mut slot = self
            .shared
            .dispatcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match std::mem::replace(&mut *slot, DispatcherSlot::Finished) {
            DispatcherSlot::Idle(dispatcher) => {
                *slot = DispatcherSlot::Running(runtime.spawn(dispatcher.run()));
                // A concurrent shutdown may already have moved past `Created`.
                self.shared.state.send_if_modified(|state| {
                    let created = *state == EngineState::Created;
                    if created {
                        *state = EngineState::Running;
                    }
                    created
                });
                info!("Logging engine started");
                Ok(())
            }
            running @ DispatcherSlot::Running(_) => {
                *slot = running;
                Err(EngineError::AlreadyStarted)
            }
            DispatcherSlot::Finished => Err(EngineError::ShutDown),
        }
    }

    /// Submits an entry.
    ///
    /// The entry is accepted when `level` is at least the minimum level, the
    /// category is not disabled, and shutdown has not begun. Rejected entries
    /// are silently discarded; this never blocks and never fails.
    pub fn log(
        &self,
        level: LogLevel,
        category: &str,
        message: impl Into<String>,
        error: Option<ErrorInfo>,
    ) {
        self.submit(level, category, message.into(), error, None);
    }

    /// Submits an entry labelled with the object that emitted it.
    pub fn log_from(
        &self,
        originator: &dyn fmt::Display,
        level: LogLevel,
        category: &str,
        message: impl Into<String>,
        error: Option<ErrorInfo>,
    ) {
        self.submit(
            level,
            category,
            message.into(),
            error,
            Some(originator.to_string()),
        );
    }

    /// Submits the same message once per category, each filtered on its own.
    pub fn log_to_categories(
        &self,
        level: LogLevel,
        categories: &[&str],
        message: &str,
        error: Option<ErrorInfo>,
    ) {
        for category in categories {
            self.submit(level, category, message.to_string(), error.clone(), None);
        }
    }

    fn submit(
        &self,
        level: LogLevel,
        category: &str,
        message: String,
        error: Option<ErrorInfo>,
        originator: Option<String>,
    ) {
        if !self.is_accepted(level, category) {
            return;
        }

        let queue = self
            .shared
            .queue
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = queue.as_ref() else {
            debug!("Dropping log entry for '{}': engine is shutting down", category);
            return;
        };

        let entry = LogEntry::new(level, category, message, error, originator);
        if tx.send(entry).is_err() {
            debug!("Dropping log entry for '{}': dispatcher is gone", category);
            return;
        }
        self.shared.metrics.record_accepted();
    }

    fn is_accepted(&self, level: LogLevel, category: &str) -> bool {
        level >= self.min_level() && self.is_category_enabled(category)
    }

    /// Registers a sink. It receives entries from the next flush on.
    pub fn add_sink(&self, sink: Arc<dyn LogSink>) {
        let mut sinks = self
            .shared
            .sinks
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut next = Vec::clone(&sinks);
        next.push(sink);
        *sinks = Arc::new(next);
    }

    /// Number of registered sinks.
    pub fn sink_count(&self) -> usize {
        self.shared
            .sinks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn min_level(&self) -> LogLevel {
        LogLevel::from_u8(self.shared.min_level.load(Ordering::Relaxed)).unwrap_or(LogLevel::Debug)
    }

    pub fn set_min_level(&self, level: LogLevel) {
        self.shared.min_level.store(level.as_u8(), Ordering::Relaxed);
    }

    /// Returns whether entries of `category` are currently accepted.
    ///
    /// Categories that were never configured are enabled.
    pub fn is_category_enabled(&self, category: &str) -> bool {
        self.shared
            .categories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(category)
            .copied()
            .unwrap_or(true)
    }

    pub fn set_category_enabled(&self, category: &str, enabled: bool) {
        self.shared
            .categories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(category.to_string(), enabled);
    }

    /// Returns a snapshot of the engine's counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    pub fn state(&self) -> EngineState {
        *self.shared.state.borrow()
    }

    /// Closes the queue and waits until every accepted entry is flushed.
    ///
    /// Entries logged after this call starts are dropped. If the dispatcher
    /// was never started the queue is drained on the calling task. Calling
    /// `shutdown` again, or concurrently, just waits for the drain to finish.
    pub async fn shutdown(&self) {
        let closed = self
            .shared
            .queue
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if closed.is_some() {
            info!("Logging engine shutting down");
            self.shared.state.send_if_modified(|state| {
                if matches!(state, EngineState::Created | EngineState::Running) {
                    *state = EngineState::ShuttingDown;
                    true
                } else {
                    false
                }
            });
        }
        // Dropping the last sender is what lets the dispatcher see the end
        // of the queue.
        drop(closed);

        let slot = {
            let mut slot = self
                .shared
                .dispatcher
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *slot, DispatcherSlot::Finished)
        };

        match slot {
            DispatcherSlot::Idle(dispatcher) => {
                debug!("Dispatcher never started, draining log queue inline");
                dispatcher.run().await;
            }
            DispatcherSlot::Running(handle) => {
                if let Err(e) = handle.await {
                    error!("Log dispatcher terminated abnormally: {}", e);
                    self.shared.state.send_replace(EngineState::Drained);
                }
            }
            DispatcherSlot::Finished => {
                let mut state = self.shared.state.subscribe();
                let _ = state.wait_for(|s| *s == EngineState::Drained).await;
            }
        }
    }
}
