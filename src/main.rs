//! Atelier CLI entry point.

use anyhow::Context;
use clap::Parser;

use atelier::cli::{commands, handle_error, Cli, Commands};
use atelier::infrastructure::config::ConfigLoader;
use atelier::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load_with(cli.config.as_deref())
        .context("Failed to load configuration")
    {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LogConfig::from_settings(&config.logging)
        .and_then(|log_config| LoggerImpl::init(&log_config))
    {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Readiness(args) => commands::readiness::execute(args, &config, cli.json).await,
        Commands::Plan(args) => commands::plan::execute(args, &config, cli.json).await,
        Commands::Classify(args) => commands::classify::execute(args, &config, cli.json).await,
        Commands::Design(args) => commands::design::execute(args, &config, cli.json).await,
        Commands::Config => commands::config::execute(&config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
