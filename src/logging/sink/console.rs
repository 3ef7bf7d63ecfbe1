//! A sink that prints each entry as one colored line.
use super::LogSink;
use crate::logging::format::{Formatter, TextFormatter};
use crate::logging::{LogEntry, LogLevel, SinkError};
use async_trait::async_trait;
use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Writes formatted entries to stdout (or any injected writer), one per line.
///
/// Colors are emitted as ANSI sequences when enabled; the default `stdout`
/// sink enables them. Writes run on the blocking pool, so a stalled stdout
/// pipe holds up this sink but not the runtime's workers.
pub struct ConsoleSink {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
    formatter: Arc<dyn Formatter>,
    colored: bool,
}

impl ConsoleSink {
    /// Creates a colored console sink on stdout using the text formatter.
    pub fn stdout() -> Self {
        Self::with_writer(Box::new(std::io::stdout()), Arc::new(TextFormatter), true)
    }

    /// Creates a console sink on stdout with the given formatter.
    pub fn with_formatter(formatter: Arc<dyn Formatter>) -> Self {
        Self::with_writer(Box::new(std::io::stdout()), formatter, true)
    }

    /// Creates a console sink writing to an arbitrary writer.
    ///
    /// # Arguments
    ///
    /// * `out` - Where lines are written.
    /// * `formatter` - How entries are rendered.
    /// * `colored` - Whether each line is wrapped in a level color.
    pub fn with_writer(
        out: Box<dyn Write + Send>,
        formatter: Arc<dyn Formatter>,
        colored: bool,
    ) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
            formatter,
            colored,
        }
    }

    fn level_color(level: LogLevel) -> Color {
        match level {
            LogLevel::Critical => Color::Magenta,
            LogLevel::Error => Color::Red,
            LogLevel::Warning => Color::Yellow,
            LogLevel::Info => Color::Blue,
            LogLevel::Debug => Color::DarkGrey,
        }
    }
}

#[async_trait]
impl LogSink for ConsoleSink {
    fn accepts(&self, category: &str) -> bool {
        !category.is_empty()
    }

    async fn write(&self, entry: &LogEntry) -> Result<(), SinkError> {
        let line = self.formatter.format(entry);
        let color = self.colored.then(|| Self::level_color(entry.level));
        let out = Arc::clone(&self.out);

        tokio::task::spawn_blocking(move || write_line(&out, line, color))
            .await
            .map_err(|e| SinkError::Unavailable(format!("console writer task failed: {}", e)))?
    }
}

fn write_line(
    out: &Mutex<Box<dyn Write + Send>>,
    line: String,
    color: Option<Color>,
) -> Result<(), SinkError> {
    let mut guard = out
        .lock()
        .map_err(|_| SinkError::Unavailable("console writer lock poisoned".to_string()))?;
    let out = &mut *guard;

    match color {
        Some(color) => queue!(
            out,
            SetForegroundColor(color),
            Print(line),
            ResetColor,
            Print("\n")
        )?,
        None => writeln!(out, "{}", line)?,
    }
    out.flush()?;
    Ok(())
}
