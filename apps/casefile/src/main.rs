//! # Casefile - Evidence Register and Entity Search
//!
//! The command-line client for investigative record APIs.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   apps/casefile (THE BINARY)                 │
//! │                                                              │
//! │  ┌─────────────┐    ┌──────────────┐    ┌────────────────┐   │
//! │  │   CLI       │───►│   Driver     │───►│  RecordClient  │──►│── HTTP
//! │  │  (clap)     │    │ (tokio)      │    │  (reqwest)     │   │
//! │  └─────────────┘    └──────┬───────┘    └────────────────┘   │
//! │                            ▼                                 │
//! │                    ┌────────────────┐                        │
//! │                    │ casefile-core  │                        │
//! │                    │  (THE LOGIC)   │                        │
//! │                    └────────────────┘                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! casefile evidence --page 2 --expand 7f3c91
//! casefile search "roe" --type person --type event
//! casefile route --type person --id 42
//! ```

use casefile::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Initialize tracing: CASEFILE_LOG_FORMAT=json enables machine-parseable output.
    // Logs go to stderr; stdout carries the rendered views.
    let log_format = std::env::var("CASEFILE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_filter = if cli.verbose {
        "casefile=debug,casefile_core=debug"
    } else {
        "casefile=warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
