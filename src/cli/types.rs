//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::config::ConfigArgs;
use super::commands::inspect::InspectArgs;
use super::commands::invalidate::InvalidateArgs;
use super::commands::key::KeyArgs;

#[derive(Parser, Debug)]
#[command(name = "agent-cache")]
#[command(about = "Inspect and invalidate cached AI-agent responses", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .agent-cache/config.yaml and .agent-cache/local.yaml)
    #[arg(short, long, global = true, env = "AGENT_CACHE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the cache key a request payload maps to
    Key(KeyArgs),

    /// Delete every cached response of an agent, or of one agent version
    Invalidate(InvalidateArgs),

    /// Show the cached response for a request payload, if any
    Inspect(InspectArgs),

    /// Configuration commands
    Config(ConfigArgs),
}
