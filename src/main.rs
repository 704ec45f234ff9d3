mod app;
mod batch;
mod cli;
mod components;
mod event;
mod loader;
mod logging;
mod model;
mod screens;
mod table;
mod ui;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use logging::LogTarget;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::View { data_dir, view } => {
            logging::init(&cli.log, LogTarget::Terminal)?;
            app::run(data_dir, view).await
        }
        Command::Export(args) => {
            logging::init(&cli.log, LogTarget::Headless)?;
            let rows = batch::run(&args).await?;
            tracing::info!(rows, screen = args.screen.slug(), "export complete");
            Ok(())
        }
    }
}
