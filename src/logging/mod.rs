//! This module contains the asynchronous logging pipeline.
//!
//! Producers submit entries to a `LoggingEngine`, which filters them, queues
//! them and hands them in batches to a background dispatcher. The dispatcher
//! fans every batch out to the registered sinks (console, rotating files,
//! category filters, in-memory buffers) and records the outcome in `Metrics`.
pub mod collector;
pub mod engine;
pub mod entry;
pub mod error;
pub mod format;
pub mod metrics;
pub mod sink;

pub use collector::EngineLayer;
pub use engine::{EngineConfig, EngineState, FanOut, LoggingEngine};
pub use entry::{ErrorInfo, LogEntry, LogLevel};
pub use error::{EngineError, SinkError};
pub use format::{FormatKind, Formatter, JsonFormatter, TextFormatter, XmlFormatter};
pub use metrics::{Metrics, MetricsSnapshot};
pub use sink::{CategoryFilterSink, ConsoleSink, FileSink, FileSinkConfig, LogSink, MemorySink};
