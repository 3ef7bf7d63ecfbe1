pub mod args;
mod demo;
mod setup;

pub use args::AppArgs;

use anyhow::Result;

pub async fn launch() -> Result<()> {
    launch_with_args(AppArgs::from_cli()).await
}

pub async fn launch_with_args(args: AppArgs) -> Result<()> {
    let setup::PreparedApp {
        args,
        engine,
        file_sink,
    } = setup::prepare(args)?;

    demo::run(args, engine, file_sink).await
}
