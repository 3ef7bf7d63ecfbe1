//! This module submits a burst of entries and shows how they are flushed.
use super::args::AppArgs;
use anyhow::{bail, Result};
use logflow::{ErrorInfo, FileSink, LogLevel, LoggingEngine};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Submits `args.count` entries round-robin over the requested categories.
///
/// A full batch is printed right away; the remainder appears when the flush
/// interval elapses (unless `--no-wait` is given). Ctrl-C during the wait
/// shuts down early, still draining everything that was accepted.
///
/// # Arguments
///
/// * `args` - The command-line arguments.
/// * `engine` - The started engine with its sinks registered.
/// * `file_sink` - The rotating file sink, if one was configured.
///
/// # Errors
///
/// This function will return an error if no category was given or waiting
/// for Ctrl-C fails.
pub async fn run(
    args: AppArgs,
    engine: LoggingEngine,
    file_sink: Option<Arc<FileSink>>,
) -> Result<()> {
    let categories: Vec<&str> = args.categories.iter().map(String::as_str).collect();
    if categories.is_empty() {
        bail!("at least one --category is required");
    }
    info!("Submitting {} entries to {:?}", args.count, categories);

    for i in 0..args.count {
        let category = categories[i % categories.len()];
        engine.log_from(
            &"demo",
            args.min_level,
            category,
            format!("entry {} of {}", i + 1, args.count),
            None,
        );
    }

    if args.with_error {
        let failure = anyhow::anyhow!("segment 42 unavailable").context("playback stalled");
        engine.log(
            LogLevel::Error,
            categories[0],
            "sample failure",
            Some(ErrorInfo::from(&failure)),
        );
    }

    if !args.no_wait {
        let linger = Duration::from_millis(args.flush_interval_ms) + Duration::from_millis(100);
        tokio::select! {
            _ = tokio::time::sleep(linger) => {}
            result = tokio::signal::ctrl_c() => {
                result?;
                warn!("Interrupted, shutting down the logging engine");
            }
        }
    }

    engine.shutdown().await;

    eprintln!();
    eprintln!("{}", engine.metrics());
    if let Some(sink) = file_sink {
        match sink.retained_files().await {
            Ok(files) => {
                eprintln!("Retained log files:");
                for file in files {
                    eprintln!("  {}", file.display());
                }
            }
            Err(e) => eprintln!("Could not list log files: {}", e),
        }
    }

    Ok(())
}
