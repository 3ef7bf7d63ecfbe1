use super::{Formatter, TIMESTAMP_FORMAT};
use crate::logging::LogEntry;

/// Plain text layout: `<timestamp> <originator> [<level>] <message>`.
///
/// When an error is attached, an `Exception:` / `Stack Trace:` block follows
/// on separate lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format(&self, entry: &LogEntry) -> String {
        let mut line = format!(
            "{} {} [{}] {}",
            entry.timestamp.format(TIMESTAMP_FORMAT),
            entry.originator.as_deref().unwrap_or_default(),
            entry.level,
            entry.message
        );

        if let Some(error) = &entry.error {
            line.push_str(&format!(
                "\nException: {}\nStack Trace: {}",
                error.message, error.stack_trace
            ));
        }

        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::format::test_support::sample_entry;
    use crate::logging::ErrorInfo;

    #[test]
    fn formats_plain_entry() {
        let entry = sample_entry(None, Some("Player#1"));
        assert_eq!(
            TextFormatter.format(&entry),
            "2024-03-09 14:05:07.000 Player#1 [Warning] disk <almost> full & slow"
        );
    }

    #[test]
    fn missing_originator_degrades_to_empty() {
        let entry = sample_entry(None, None);
        assert_eq!(
            TextFormatter.format(&entry),
            "2024-03-09 14:05:07.000  [Warning] disk <almost> full & slow"
        );
    }

    #[test]
    fn appends_exception_block() {
        let entry = sample_entry(Some(ErrorInfo::new("boom", "at main")), None);
        let text = TextFormatter.format(&entry);
        assert!(text.ends_with("\nException: boom\nStack Trace: at main"));
    }
}
