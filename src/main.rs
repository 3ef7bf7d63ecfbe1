//! The main entry point for the logflow demo binary.
mod app;

use anyhow::Result;

/// The main function of the application.
///
/// Builds the logging engine from command-line arguments, submits a burst of
/// entries and shuts the engine down once they have been flushed.
///
/// # Errors
///
/// Returns an error if the arguments are invalid or the engine cannot start.
#[tokio::main]
async fn main() -> Result<()> {
    app::launch().await
}
