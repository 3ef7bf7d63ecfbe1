use clap::Parser;
use logflow::{FanOut, FormatKind, LogLevel};

#[derive(Parser, Debug, Clone)]
#[command(name = "logflow")]
#[command(about = "Drive the batched logging pipeline with a burst of entries")]
pub struct AppArgs {
    #[arg(long, default_value = "info", help = "Minimum level accepted by the engine")]
    pub min_level: LogLevel,

    #[arg(long, default_value_t = 10, help = "Entries per batch before a flush")]
    pub batch_size: usize,

    #[arg(long, default_value_t = 5000, help = "Milliseconds between time-triggered flushes")]
    pub flush_interval_ms: u64,

    #[arg(long, value_enum, default_value_t = FanOut::Sequential, help = "How flushes reach the sinks")]
    pub fan_out: FanOut,

    #[arg(long, value_enum, default_value_t = FormatKind::Text, help = "Formatter for all sinks")]
    pub format: FormatKind,

    #[arg(long, default_value_t = 12, help = "Number of entries to submit")]
    pub count: usize,

    #[arg(long = "category", default_value = "File", help = "Category for submitted entries (repeatable)")]
    pub categories: Vec<String>,

    #[arg(long = "disable", help = "Category to switch off in the engine (repeatable)")]
    pub disabled_categories: Vec<String>,

    #[arg(long, help = "Also write to rotating files here (or set LOGFLOW_LOG_DIR)")]
    pub log_dir: Option<String>,

    #[arg(long, default_value = "log", help = "Log file name prefix")]
    pub prefix: String,

    #[arg(long, default_value_t = 1024 * 1024, help = "Rotate files past this many bytes")]
    pub max_file_size: u64,

    #[arg(long, default_value_t = 5, help = "Maximum number of log files kept")]
    pub max_files: usize,

    #[arg(long = "file-only", help = "Restrict the file sink to these categories (repeatable)")]
    pub file_categories: Vec<String>,

    #[arg(long, help = "Follow the burst with an Error entry carrying an error chain")]
    pub with_error: bool,

    #[arg(long, help = "Print console lines without colors")]
    pub no_color: bool,

    #[arg(long, help = "Shut down right after submitting instead of waiting one flush interval")]
    pub no_wait: bool,

    #[arg(long, help = "Forward this program's own tracing events into the engine")]
    pub capture_tracing: bool,

    #[arg(short, long, help = "Print pipeline diagnostics to stderr")]
    pub verbose: bool,
}

impl AppArgs {
    pub fn from_cli() -> Self {
        <Self as Parser>::parse()
    }
}
