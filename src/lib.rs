//! An asynchronous, batched, multi-sink logging pipeline.
//!
//! See [`logging::LoggingEngine`] for the producer API.
pub mod logging;

pub use logging::{
    CategoryFilterSink, ConsoleSink, EngineConfig, EngineError, EngineLayer, EngineState,
    ErrorInfo, FanOut, FileSink, FileSinkConfig, FormatKind, Formatter, LogEntry, LogLevel,
    LogSink, LoggingEngine, MemorySink, MetricsSnapshot, SinkError,
};
