//! agent-cache CLI entry point.

use anyhow::Result;
use clap::Parser;

use agent_response_cache::cli::commands::{config, inspect, invalidate, key};
use agent_response_cache::cli::{handle_error, Cli, Commands};
use agent_response_cache::domain::models::Config;
use agent_response_cache::infrastructure::config::ConfigLoader;
use agent_response_cache::infrastructure::logging::{LogConfig, LoggerImpl};

fn load_config(cli: &Cli) -> Result<Config> {
    match cli.config {
        Some(ref path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => Some(logger),
        Err(err) => {
            eprintln!("Warning: logging disabled: {err}");
            None
        }
    };

    let result = match cli.command {
        Commands::Key(args) => key::execute(args, &config, cli.json).await,
        Commands::Invalidate(args) => invalidate::execute(args, &config, cli.json).await,
        Commands::Inspect(args) => inspect::execute(args, &config, cli.json).await,
        Commands::Config(args) => config::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
