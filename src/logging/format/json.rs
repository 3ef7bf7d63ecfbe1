use super::Formatter;
use crate::logging::LogEntry;
use serde::Serialize;

/// Emits one JSON object per entry.
///
/// Category and originator are not part of the JSON record.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonRecord<'a> {
    timestamp: String,
    level: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack_trace: Option<&'a str>,
}

impl Formatter for JsonFormatter {
    fn format(&self, entry: &LogEntry) -> String {
        let record = JsonRecord {
            timestamp: entry.timestamp.to_rfc3339(),
            level: entry.level.as_str(),
            message: &entry.message,
            error: entry.error.as_ref().map(|e| e.message.as_str()),
            stack_trace: entry.error.as_ref().map(|e| e.stack_trace.as_str()),
        };

        serde_json::to_string(&record).unwrap_or_default()
    }
}
