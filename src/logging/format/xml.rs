use super::{Formatter, TIMESTAMP_FORMAT};
use crate::logging::LogEntry;
use std::fmt::Write;

/// Serializes every field of an entry as a `<LogEntry>` element.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlFormatter;

impl Formatter for XmlFormatter {
    fn format(&self, entry: &LogEntry) -> String {
        let mut out = String::from("<LogEntry>");

        push_element(
            &mut out,
            "Timestamp",
            &entry.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        );
        push_element(&mut out, "Level", entry.level.as_str());
        push_element(&mut out, "Category", &entry.category);
        push_element(&mut out, "Message", &entry.message);
        push_element(
            &mut out,
            "Originator",
            entry.originator.as_deref().unwrap_or_default(),
        );

        if let Some(error) = &entry.error {
            out.push_str("<Error>");
            push_element(&mut out, "Message", &error.message);
            push_element(&mut out, "StackTrace", &error.stack_trace);
            out.push_str("</Error>");
        }

        out.push_str("</LogEntry>");
        out
    }
}

fn push_element(out: &mut String, name: &str, value: &str) {
    if value.is_empty() {
        let _ = write!(out, "<{} />", name);
    } else {
        let _ = write!(out, "<{name}>{}</{name}>", escape(value));
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            // Not representable in XML 1.0, even as character references.
            c if !is_xml_char(c) => escaped.push(char::REPLACEMENT_CHARACTER),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{FFFD}' | '\u{10000}'..)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::format::test_support::sample_entry;
    use crate::logging::ErrorInfo;

    #[test]
    fn serializes_all_fields_escaped() {
        let entry = sample_entry(None, Some("Player#1"));
        assert_eq!(
            XmlFormatter.format(&entry),
            "<LogEntry><Timestamp>2024-03-09 14:05:07.000</Timestamp>\
             <Level>Warning</Level><Category>File</Category>\
             <Message>disk &lt;almost&gt; full &amp; slow</Message>\
             <Originator>Player#1</Originator></LogEntry>"
        );

        let mut entry = sample_entry(None, None);
        entry.message = "\u{1b}[31mred\u{1b}[0m\u{0}\tdone".to_string();
        assert!(XmlFormatter
            .format(&entry)
            .contains("<Message>\u{FFFD}[31mred\u{FFFD}[0m\u{FFFD}\tdone</Message>"));
    }

    #[test]
    fn nests_error_element() {
        let entry = sample_entry(Some(ErrorInfo::new("boom", "")), None);
        let xml = XmlFormatter.format(&entry);
        assert!(xml.contains("<Originator />"));
        assert!(xml.contains("<Error><Message>boom</Message><StackTrace /></Error>"));
    }
}
