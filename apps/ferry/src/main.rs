//! # Ferry
//!
//! The main binary for the Ferry C++ interface extractor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              apps/ferry (THE BINARY)            │
//! │                                                 │
//! │   ┌─────────────┐        ┌──────────────────┐   │
//! │   │    CLI      │        │  Config (TOML)   │   │
//! │   │   (clap)    │        │                  │   │
//! │   └──────┬──────┘        └────────┬─────────┘   │
//! │          └──────────┬─────────────┘             │
//! │                     ▼                           │
//! │             ┌───────────────┐                   │
//! │             │  ferry-core   │                   │
//! │             │  (THE LOGIC)  │                   │
//! │             └───────────────┘                   │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! ferry extract src/api.cpp -I include -o catalog.json
//! ferry check src/api.cpp
//! ferry normalize "const std::vector<std::int32_t> &"
//! ```

use clap::Parser;
use ferry::cli::{self, Cli, Outcome};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status of `check` when entities were rejected.
const EXIT_REJECTIONS: i32 = 2;

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = Cli::parse();

    // FERRY_LOG_FORMAT=json enables machine-parseable output. Logs go to
    // stderr; stdout carries reports.
    let log_format = std::env::var("FERRY_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "ferry=debug,ferry_core=debug"
    } else if cli.quiet {
        "ferry=warn,ferry_core=warn"
    } else {
        "ferry=info,ferry_core=info"
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

    match cli::execute(cli) {
        Ok(Outcome::Clean) => {}
        Ok(Outcome::Rejections) => std::process::exit(EXIT_REJECTIONS),
        Err(e) => {
            tracing::error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
