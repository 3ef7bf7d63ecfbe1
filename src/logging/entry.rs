//! This module defines the structure for a single log entry and its severity.
use chrono::{DateTime, Local};
use std::fmt;
use std::str::FromStr;

/// The severity of a log entry, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Deserialize)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
    Critical = 4,
}

impl LogLevel {
    /// Returns the level's display name.
    pub const fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "Debug",
            LogLevel::Info => "Info",
            LogLevel::Warning => "Warning",
            LogLevel::Error => "Error",
            LogLevel::Critical => "Critical",
        }
    }

    pub(crate) const fn as_u8(self) -> u8 {
        self as u8
    }

    pub(crate) const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(LogLevel::Debug),
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Warning),
            3 => Some(LogLevel::Error),
            4 => Some(LogLevel::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            "critical" => Ok(LogLevel::Critical),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// The error attached to a log entry: its message and a stack trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub message: String,
    pub stack_trace: String,
}

impl ErrorInfo {
    pub fn new(message: impl Into<String>, stack_trace: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack_trace: stack_trace.into(),
        }
    }

    /// Builds an `ErrorInfo` from any error, walking its `source()` chain.
    ///
    /// The message is the error's `Display` output and the trace lists one
    /// cause per line, outermost first.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(format!("caused by: {}", cause));
            source = cause.source();
        }
        Self::new(err.to_string(), causes.join("\n"))
    }
}

impl From<&anyhow::Error> for ErrorInfo {
    fn from(err: &anyhow::Error) -> Self {
        let stack_trace = err
            .chain()
            .skip(1)
            .map(|cause| format!("caused by: {}", cause))
            .collect::<Vec<_>>()
            .join("\n");
        Self::new(err.to_string(), stack_trace)
    }
}

/// Represents a single log event, captured when `log` is called.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// The timestamp when the log entry was created.
    pub timestamp: DateTime<Local>,
    /// The severity of the entry.
    pub level: LogLevel,
    /// The routing label used by sinks and the engine's category filter.
    pub category: String,
    /// The log message content.
    pub message: String,
    /// The error that accompanied the event, if any.
    pub error: Option<ErrorInfo>,
    /// A display label for the object that emitted the entry.
    pub originator: Option<String>,
}

impl LogEntry {
    /// Creates a new entry stamped with the current local time.
    pub fn new(
        level: LogLevel,
        category: impl Into<String>,
        message: impl Into<String>,
        error: Option<ErrorInfo>,
        originator: Option<String>,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            category: category.into(),
            message: message.into(),
            error,
            originator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("disk full")
        }
    }

    impl std::error::Error for Inner {}

    #[derive(Debug)]
    struct Outer(Inner);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("write failed")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Critical);
    }

    #[test]
    fn level_parses_case_insensitively() {
        assert_eq!("INFO".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn level_u8_conversion() {
        for level in [
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warning,
            LogLevel::Error,
            LogLevel::Critical,
        ] {
            assert_eq!(LogLevel::from_u8(level.as_u8()), Some(level));
        }
        assert_eq!(LogLevel::from_u8(9), None);
    }

    #[test]
    fn error_info_walks_source_chain() {
        let info = ErrorInfo::from_error(&Outer(Inner));
        assert_eq!(info.message, "write failed");
        assert_eq!(info.stack_trace, "caused by: disk full");
    }

    #[test]
    fn error_info_from_anyhow() {
        let err = anyhow::Error::new(Inner).context("rotating log file");
        let info = ErrorInfo::from(&err);
        assert_eq!(info.message, "rotating log file");
        assert_eq!(info.stack_trace, "caused by: disk full");
    }
}
