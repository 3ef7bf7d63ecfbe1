use super::LogSink;
use crate::logging::{LogEntry, SinkError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

/// Narrows an inner sink to an explicit set of categories.
///
/// Entries outside the allow-set are dropped without reaching the inner sink.
pub struct CategoryFilterSink {
    inner: Arc<dyn LogSink>,
    allowed: HashSet<String>,
}

impl CategoryFilterSink {
    pub fn new<I, S>(inner: Arc<dyn LogSink>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner,
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl LogSink for CategoryFilterSink {
    fn accepts(&self, category: &str) -> bool {
        self.allowed.contains(category)
    }

    async fn write(&self, entry: &LogEntry) -> Result<(), SinkError> {
        if !self.accepts(&entry.category) {
            return Ok(());
        }
        self.inner.write(entry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::sink::MemorySink;
    use crate::logging::LogLevel;

    #[tokio::test]
    async fn delivers_only_allowed_categories() {
        let inner = Arc::new(MemorySink::new(16));
        let filter = CategoryFilterSink::new(inner.clone(), ["File"]);

        assert!(filter.accepts("File"));
        assert!(!filter.accepts("Console"));

        for category in ["File", "Console", "File"] {
            let entry = LogEntry::new(LogLevel::Info, category, category, None, None);
            filter.write(&entry).await.unwrap();
        }

        let delivered = inner.entries();
        assert_eq!(delivered.len(), 2);
        assert!(delivered.iter().all(|e| e.category == "File"));
    }

    #[tokio::test]
    async fn empty_allow_set_drops_everything() {
        let inner = Arc::new(MemorySink::new(16));
        let filter = CategoryFilterSink::new(inner.clone(), Vec::<String>::new());

        let entry = LogEntry::new(LogLevel::Critical, "File", "x", None, None);
        filter.write(&entry).await.unwrap();

        assert!(!filter.accepts("File"));
        assert!(inner.entries().is_empty());
    }
}
