//! This module provides an in-memory sink for recent log entries.
//!
//! The `MemorySink` keeps the most recent entries in a circular buffer so an
//! in-process view (or a test) can read back what was logged.
use super::LogSink;
use crate::logging::format::{Formatter, TextFormatter};
use crate::logging::{LogEntry, SinkError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// A bounded buffer of the most recent log entries.
pub struct MemorySink {
    /// The circular buffer of log entries.
    entries: Mutex<VecDeque<LogEntry>>,
    /// The maximum number of entries to keep.
    max_size: usize,
    /// Used by `lines` to render the buffered entries.
    formatter: Arc<dyn Formatter>,
}

impl MemorySink {
    /// Creates a new `MemorySink`.
    ///
    /// # Arguments
    ///
    /// * `max_size` - The maximum number of entries to store in the buffer.
    pub fn new(max_size: usize) -> Self {
        Self::with_formatter(max_size, Arc::new(TextFormatter))
    }

    pub fn with_formatter(max_size: usize, formatter: Arc<dyn Formatter>) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(max_size)),
            max_size: max_size.max(1),
            formatter,
        }
    }

    /// Returns the buffered entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().iter().cloned().collect()
    }

    /// Returns the buffered entries rendered by this sink's formatter.
    pub fn lines(&self) -> Vec<String> {
        self.lock()
            .iter()
            .map(|entry| self.formatter.format(entry))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LogSink for MemorySink {
    fn accepts(&self, category: &str) -> bool {
        !category.is_empty()
    }

    async fn write(&self, entry: &LogEntry) -> Result<(), SinkError> {
        let mut entries = self.lock();
        if entries.len() >= self.max_size {
            entries.pop_front();
        }
        entries.push_back(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;

    #[tokio::test]
    async fn evicts_oldest_when_full() {
        let sink = MemorySink::new(2);
        for message in ["a", "b", "c"] {
            sink.write(&LogEntry::new(LogLevel::Info, "Console", message, None, None))
                .await
                .unwrap();
        }

        let messages: Vec<_> = sink.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["b", "c"]);
        assert_eq!(sink.len(), 2);
    }

    #[tokio::test]
    async fn renders_lines_with_formatter() {
        let sink = MemorySink::new(4);
        assert!(sink.is_empty());
        sink.write(&LogEntry::new(LogLevel::Debug, "Console", "hello", None, None))
            .await
            .unwrap();

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("[Debug] hello"));
    }
}
