//! Construction-time settings for the logging engine.
use crate::logging::LogLevel;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5);

/// How a flush is spread across the registered sinks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FanOut {
    /// One sink at a time, in registration order.
    #[default]
    Sequential,
    /// All sinks concurrently; each sink still sees its entries in order.
    Parallel,
}

/// Settings for a `LoggingEngine`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Entries below this level are discarded at the call site.
    pub min_level: LogLevel,
    /// Initial per-category switches. Categories not listed are enabled.
    pub categories: HashMap<String, bool>,
    /// A batch is flushed as soon as it holds this many entries.
    pub batch_size: usize,
    /// A non-empty batch is flushed once this much time passed since the last flush.
    #[serde(rename = "flush_interval_ms", deserialize_with = "duration_from_millis")]
    pub flush_interval: Duration,
    pub fan_out: FanOut,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            categories: HashMap::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            fan_out: FanOut::Sequential,
        }
    }
}

fn duration_from_millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.min_level, LogLevel::Info);
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.flush_interval, Duration::from_secs(5));
        assert_eq!(config.fan_out, FanOut::Sequential);
        assert!(config.categories.is_empty());
    }

    #[test]
    fn deserializes_partial_config() {
        let config: EngineConfig = serde_json::from_str(
            r#"{ "min_level": "Warning", "flush_interval_ms": 250, "fan_out": "parallel",
                 "categories": { "Console": false } }"#,
        )
        .unwrap();

        assert_eq!(config.min_level, LogLevel::Warning);
        assert_eq!(config.flush_interval, Duration::from_millis(250));
        assert_eq!(config.fan_out, FanOut::Parallel);
        assert_eq!(config.categories.get("Console"), Some(&false));
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    }
}
