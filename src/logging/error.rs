//! Error types for the logging pipeline.
use std::path::PathBuf;
use thiserror::Error;

/// An error raised by a sink while writing an entry.
///
/// Sink errors never reach the producer; the engine counts them in its metrics.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error writing log entry: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to rotate log file in {dir}: {source}")]
    Rotation {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// An error raised by misuse of the engine lifecycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("logging engine dispatcher is already started")]
    AlreadyStarted,

    #[error("logging engine has been shut down")]
    ShutDown,

    #[error("logging engine must be started from within a tokio runtime")]
    NoRuntime,
}
