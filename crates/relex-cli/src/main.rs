//! Relex CLI - Command-line interface for the relation extraction pipeline.

use clap::Parser;
use relex_cli::commands;
use relex_cli::{Cli, Command, Config, Formatter};
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> relex_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load config; a missing file means defaults
    let config = Config::load(cli.config.as_deref().map(Path::new))?;

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    // Handle commands
    match cli.command {
        Command::Run(args) => commands::execute_run(args, &config, &formatter).await?,
        Command::Schema(args) => commands::execute_schema(args, &formatter)?,
    }

    Ok(())
}
