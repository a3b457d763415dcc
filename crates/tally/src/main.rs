use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tally::cli::Cli;
use tally::config::Config;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_env("TALLY_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(config.log_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    init_tracing(&config);

    let styled = console::Term::stdout().features().colors_supported();
    let stdout = io::stdout();
    let stderr = io::stderr();
    tally::run(
        cli.command,
        &config,
        styled,
        &mut stdout.lock(),
        &mut stderr.lock(),
    )
}
