//! Formatters turn a `LogEntry` into its textual representation.
//!
//! Every formatter is total: missing fields degrade to empty output instead of
//! failing, so a formatting problem can never abort a flush.
pub mod json;
pub mod text;
pub mod xml;

pub use json::JsonFormatter;
pub use text::TextFormatter;
pub use xml::XmlFormatter;

use super::LogEntry;
use std::sync::Arc;

/// Converts a log entry into a string. Implementations must be pure.
pub trait Formatter: Send + Sync {
    fn format(&self, entry: &LogEntry) -> String;
}

/// Selects one of the built-in formatters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    #[default]
    Text,
    Json,
    Xml,
}

impl FormatKind {
    /// Creates the formatter this kind names.
    pub fn formatter(self) -> Arc<dyn Formatter> {
        match self {
            FormatKind::Text => Arc::new(TextFormatter),
            FormatKind::Json => Arc::new(JsonFormatter),
            FormatKind::Xml => Arc::new(XmlFormatter),
        }
    }
}

/// Timestamp layout shared by the text and XML formatters.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[cfg(test)]
pub(crate) mod test_support {
    use crate::logging::{ErrorInfo, LogEntry, LogLevel};
    use chrono::{Local, TimeZone};

    /// A fixed entry so formatter output is deterministic.
    pub fn sample_entry(error: Option<ErrorInfo>, originator: Option<&str>) -> LogEntry {
        LogEntry {
            timestamp: Local
                .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
                .single()
                .expect("unambiguous local time"),
            level: LogLevel::Warning,
            category: "File".to_string(),
            message: "disk <almost> full & slow".to_string(),
            error,
            originator: originator.map(str::to_string),
        }
    }
}
