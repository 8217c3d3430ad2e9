//! # Casefile CLI Module
//!
//! This module implements the CLI interface for Casefile.
//!
//! ## Available Commands
//!
//! - `evidence` - Show a page of the evidence register
//! - `search` - Search entities with type facets
//! - `route` - Resolve the route a search hit opens
//! - `config` - Show the effective configuration

mod commands;

use crate::config::Config;
use casefile_core::CasefileError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Casefile - evidence register and entity search client
///
/// Read-only views over an investigative record API.
#[derive(Parser, Debug)]
#[command(name = "casefile")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML config file (default: ./casefile.toml if present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Record API base URL (overrides config and CASEFILE_URL)
    #[arg(short = 'U', long, global = true)]
    pub url: Option<String>,

    /// API key sent as Bearer token (overrides config and CASEFILE_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a page of the evidence register
    Evidence {
        /// Page to show (clamped to the available pages)
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Records per page
        #[arg(long)]
        page_size: Option<usize>,

        /// Evidence id whose chain of custody to expand
        #[arg(short, long)]
        expand: Option<String>,

        /// Retry a failed load this many times
        #[arg(long, default_value = "0")]
        retries: usize,
    },

    /// Search entities
    Search {
        /// Search text (at least two characters)
        query: String,

        /// Only show these entity types (repeatable)
        #[arg(short = 't', long = "type")]
        types: Vec<String>,

        /// Issue one search per typed prefix, as a search box would
        #[arg(long)]
        incremental: bool,

        /// Delay between typed prefixes in milliseconds
        #[arg(long, default_value = "150")]
        keystroke_ms: u64,

        /// Retry a failed search this many times
        #[arg(long, default_value = "0")]
        retries: usize,

        /// Open the first visible result
        #[arg(long)]
        open: bool,
    },

    /// Resolve the route a search hit opens
    Route {
        /// Entity type tag as sent by the API
        #[arg(short = 't', long = "type")]
        entity_type: String,

        /// Entity id
        #[arg(short, long)]
        id: String,
    },

    /// Show the effective configuration
    Config,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Resolve configuration layers for this invocation.
fn resolve_config(cli: &Cli, page_size: Option<usize>) -> Result<Config, CasefileError> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env();
    config.apply_overrides(cli.url.clone(), cli.api_key.clone(), page_size);
    config.validate()
}

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), CasefileError> {
    let json_mode = cli.json_mode;

    match &cli.command {
        Commands::Evidence {
            page,
            page_size,
            expand,
            retries,
        } => {
            let config = resolve_config(&cli, *page_size)?;
            cmd_evidence(&config, json_mode, *page, expand.as_deref(), *retries).await
        }
        Commands::Search {
            query,
            types,
            incremental,
            keystroke_ms,
            retries,
            open,
        } => {
            let config = resolve_config(&cli, None)?;
            let options = SearchOptions {
                types,
                incremental: *incremental,
                keystroke_ms: *keystroke_ms,
                retries: *retries,
                open: *open,
            };
            cmd_search(&config, json_mode, query, &options).await
        }
        Commands::Route { entity_type, id } => cmd_route(json_mode, entity_type, id),
        Commands::Config => {
            let config = resolve_config(&cli, None)?;
            cmd_config(&config, json_mode)
        }
    }
}
