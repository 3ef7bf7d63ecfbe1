//! This module builds the logging engine and its sinks from the command line.
use super::args::AppArgs;
use anyhow::{bail, Result};
use logflow::{
    CategoryFilterSink, ConsoleSink, EngineConfig, EngineLayer, FileSink, FileSinkConfig,
    LogSink, LoggingEngine,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Everything `run` needs.
pub struct PreparedApp {
    /// The command-line arguments.
    pub args: AppArgs,
    /// The started engine. This is the only instance in the process.
    pub engine: LoggingEngine,
    /// The rotating file sink, if a log directory was given.
    pub file_sink: Option<Arc<FileSink>>,
}

/// Prepares the application for running.
///
/// This function performs the following steps:
/// 1. Validates the thresholds.
/// 2. Builds and starts the engine.
/// 3. Registers the console sink and, when configured, the file sink.
/// 4. Configures diagnostics logging.
/// 5. Prints a start banner.
///
/// # Errors
///
/// This function will return an error if the arguments are invalid or the
/// engine cannot be started.
pub fn prepare(args: AppArgs) -> Result<PreparedApp> {
    if args.batch_size == 0 {
        bail!("--batch-size must be at least 1");
    }
    if args.max_files == 0 {
        bail!("--max-files must be at least 1");
    }

    let engine = LoggingEngine::spawn(engine_config(&args))?;

    let console = if args.no_color {
        ConsoleSink::with_writer(Box::new(std::io::stdout()), args.format.formatter(), false)
    } else {
        ConsoleSink::with_formatter(args.format.formatter())
    };
    engine.add_sink(Arc::new(console));

    let file_sink = resolve_log_dir(&args).map(|directory| {
        Arc::new(FileSink::new(FileSinkConfig {
            directory,
            prefix: args.prefix.clone(),
            max_file_size: args.max_file_size,
            max_retained_files: args.max_files,
            format: args.format,
        }))
    });

    if let Some(sink) = &file_sink {
        let sink: Arc<dyn LogSink> = sink.clone();
        if args.file_categories.is_empty() {
            engine.add_sink(sink);
        } else {
            engine.add_sink(Arc::new(CategoryFilterSink::new(
                sink,
                args.file_categories.iter().cloned(),
            )));
        }
    }

    configure_logging(&args, &engine);
    print_start_banner(&args);

    Ok(PreparedApp {
        args,
        engine,
        file_sink,
    })
}

fn engine_config(args: &AppArgs) -> EngineConfig {
    let categories: HashMap<String, bool> = args
        .disabled_categories
        .iter()
        .map(|category| (category.clone(), false))
        .collect();

    EngineConfig {
        min_level: args.min_level,
        categories,
        batch_size: args.batch_size,
        flush_interval: Duration::from_millis(args.flush_interval_ms),
        fan_out: args.fan_out,
    }
}

/// Configures diagnostics logging.
///
/// Diagnostics go to stderr so they never interleave with console sink output.
/// With `--capture-tracing` this program's own events are also forwarded into
/// the engine.
fn configure_logging(args: &AppArgs, engine: &LoggingEngine) {
    let filter = if args.verbose {
        EnvFilter::new("info,logflow=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);

    let result = if args.capture_tracing {
        tracing_subscriber::registry()
            .with(fmt)
            .with(EngineLayer::new(engine.clone()))
            .try_init()
    } else {
        tracing_subscriber::registry().with(fmt).try_init()
    };

    if let Err(e) = result {
        eprintln!("Diagnostics logging unavailable: {}", e);
    }
}

/// Prints a banner with startup information.
fn print_start_banner(args: &AppArgs) {
    eprintln!("Starting logflow");
    eprintln!(
        "Batch size: {}, flush interval: {} ms, fan-out: {:?}",
        args.batch_size, args.flush_interval_ms, args.fan_out
    );
    if let Some(dir) = resolve_log_dir(args) {
        eprintln!(
            "Log files: {}/{}_*.txt (max {} bytes, keep {})",
            dir.display(),
            args.prefix,
            args.max_file_size,
            args.max_files
        );
    }
    eprintln!();
}

/// Resolves the log directory.
///
/// The directory can be provided via a command-line argument or an environment variable.
fn resolve_log_dir(args: &AppArgs) -> Option<PathBuf> {
    args.log_dir
        .clone()
        .or_else(|| std::env::var("LOGFLOW_LOG_DIR").ok())
        .map(PathBuf::from)
}
