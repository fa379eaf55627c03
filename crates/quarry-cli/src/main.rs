//! Quarry CLI - extract structured fields from a text corpus.

use clap::Parser;
use quarry_cli::commands;
use quarry_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> quarry_cli::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quarry=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref())?;

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Ingest(args) => {
            commands::execute_ingest(args, &config, cli.offline, &formatter)
        }
        Command::Analyze(args) => {
            // The analyst is async; everything else runs on plain threads
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(commands::execute_analyze(args, &config, cli.offline, &formatter))
        }
        Command::Search(args) => {
            commands::execute_search(args, &config, cli.offline, &formatter)
        }
        Command::Stats(args) => {
            commands::execute_stats(args, &config, cli.offline, &formatter)
        }
    }
}
