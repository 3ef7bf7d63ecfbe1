//! This module provides a `tracing` layer that forwards events into a
//! `LoggingEngine`.
use super::{LogLevel, LoggingEngine};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    layer::{Context, SubscriberExt},
    registry::LookupSpan,
    Layer,
};

/// Events from the pipeline itself are never fed back into it.
const OWN_TARGET: &str = module_path!();

/// A `tracing` layer that turns events into engine log entries.
///
/// The category is the last segment of the event's module path and the
/// message is the `message` field followed by any other fields as
/// `key=value` pairs.
pub struct EngineLayer {
    engine: LoggingEngine,
}

impl EngineLayer {
    /// Creates a new `EngineLayer`.
    ///
    /// # Arguments
    ///
    /// * `engine` - The engine that receives the forwarded events.
    pub fn new(engine: LoggingEngine) -> Self {
        Self { engine }
    }

    /// Installs a global subscriber that only forwards into `engine`.
    ///
    /// # Errors
    ///
    /// This function will return an error if a global default subscriber is
    /// already set.
    pub fn init_subscriber(
        engine: LoggingEngine,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let subscriber = tracing_subscriber::registry().with(EngineLayer::new(engine));
        tracing::subscriber::set_global_default(subscriber)?;
        Ok(())
    }

    fn level(level: &Level) -> LogLevel {
        match *level {
            Level::ERROR => LogLevel::Error,
            Level::WARN => LogLevel::Warning,
            Level::INFO => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }

    fn is_own_event(target: &str) -> bool {
        let pipeline = OWN_TARGET.rsplit_once("::").map_or(OWN_TARGET, |(head, _)| head);
        target.starts_with(pipeline)
    }
}

impl<S> Layer<S> for EngineLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target();
        if Self::is_own_event(target) {
            return;
        }

        let mut message = String::new();
        event.record(&mut MessageVisitor(&mut message));

        let category = metadata
            .module_path()
            .and_then(|path| path.rsplit("::").next())
            .unwrap_or(target);

        self.engine
            .log(Self::level(metadata.level()), category, message, None);
    }
}

/// A `tracing::field::Visit` implementation for extracting the message from an event.
struct MessageVisitor<'a>(&'a mut String);

impl MessageVisitor<'_> {
    fn push_field(&mut self, name: &str, value: &dyn std::fmt::Display) {
        if !self.0.is_empty() {
            self.0.push(' ');
        }
        self.0.push_str(&format!("{}={}", name, value));
    }
}

impl tracing::field::Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let rest = std::mem::take(self.0);
            *self.0 = format!("{:?}", value);
            if !rest.is_empty() {
                self.0.push(' ');
                self.0.push_str(&rest);
            }
        } else {
            self.push_field(field.name(), &format_args!("{:?}", value));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.record_debug(field, &format_args!("{}", value));
        } else {
            self.push_field(field.name(), &value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::sink::MemorySink;
    use crate::logging::EngineConfig;
    use std::sync::Arc;

    #[test]
    fn recognises_pipeline_targets() {
        assert!(EngineLayer::is_own_event("logflow::logging::engine::dispatcher"));
        assert!(EngineLayer::is_own_event("logflow::logging::sink::file"));
        assert!(!EngineLayer::is_own_event("logflow::app::setup"));
        assert!(!EngineLayer::is_own_event("player::decoder"));
    }

    #[test]
    fn maps_tracing_levels() {
        assert_eq!(EngineLayer::level(&Level::TRACE), LogLevel::Debug);
        assert_eq!(EngineLayer::level(&Level::DEBUG), LogLevel::Debug);
        assert_eq!(EngineLayer::level(&Level::INFO), LogLevel::Info);
        assert_eq!(EngineLayer::level(&Level::WARN), LogLevel::Warning);
        assert_eq!(EngineLayer::level(&Level::ERROR), LogLevel::Error);
    }

    #[tokio::test]
    async fn forwards_events_with_fields() {
        let engine = LoggingEngine::spawn(EngineConfig::default()).unwrap();
        let sink = Arc::new(MemorySink::new(8));
        engine.add_sink(sink.clone());

        let subscriber = tracing_subscriber::registry().with(EngineLayer::new(engine.clone()));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "player::net", peer = 7, "connected to {}", "relay");
            tracing::debug!(target: "player::net", "below the engine's minimum level");
            tracing::warn!("emitted from inside the pipeline");
        });
        engine.shutdown().await;

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, LogLevel::Info);
        assert_eq!(entries[0].category, "tests");
        assert_eq!(entries[0].message, "connected to relay peer=7");
    }
}
