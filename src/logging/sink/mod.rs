//! This module defines the sink interface and the built-in sinks.
//!
//! A sink decides which categories it accepts and records the entries the
//! engine hands it. Writes may suspend; the engine awaits each one.
pub mod console;
pub mod file;
pub mod filter;
pub mod memory;

pub use console::ConsoleSink;
pub use file::{FileSink, FileSinkConfig};
pub use filter::CategoryFilterSink;
pub use memory::MemorySink;

use super::{LogEntry, SinkError};
use async_trait::async_trait;

/// A destination for log entries.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Returns whether this sink wants entries of the given category.
    fn accepts(&self, category: &str) -> bool;

    /// Records a single entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry could not be recorded. The engine counts
    /// the failure and carries on with the next entry and the next sink.
    async fn write(&self, entry: &LogEntry) -> Result<(), SinkError>;
}
