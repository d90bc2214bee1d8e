//! # Ferry CLI Module
//!
//! This module implements the command-line interface for Ferry.
//!
//! ## Available Commands
//!
//! - `extract` - Write the JSON catalog report of one or more inputs
//! - `check` - Print rejection diagnostics; fail when anything was rejected
//! - `normalize` - Show the simple form and policy verdict of a type spelling

mod commands;

use crate::config::FerryConfig;
use clap::{Args, CommandFactory, Parser, Subcommand};
use ferry_core::FerryError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Ferry - C++ interface catalog extractor
///
/// Finds the functions and value types of a C++ source that can be carried
/// across a language boundary, and explains every one that cannot.
#[derive(Parser, Debug)]
#[command(name = "ferry")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (default: ./ferry.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Inputs and traversal flags shared by `extract` and `check`.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct InputArgs {
    /// C++ source files; each one is an independent run
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Inline C++ source text, processed like an input file
    #[arg(long = "source", value_name = "TEXT")]
    pub sources: Vec<String>,

    /// Additional include directory
    #[arg(short = 'I', long = "include-dir", value_name = "DIR")]
    pub include_dirs: Vec<PathBuf>,

    /// Only process the root file of each input
    #[arg(long)]
    pub no_follow_includes: bool,

    /// Follow an include only if its path matches (anchored regex)
    #[arg(long = "include-pattern", value_name = "RE")]
    pub include_patterns: Vec<String>,

    /// Never follow an include whose path matches (anchored regex)
    #[arg(long = "exclude-pattern", value_name = "RE")]
    pub exclude_patterns: Vec<String>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract the catalog of each input as a JSON report
    Extract {
        #[command(flatten)]
        input: InputArgs,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report rejected functions and structs
    Check {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Show how a type spelling is normalized and judged
    Normalize {
        /// A C++ type spelling, e.g. "const std::vector<int> &"
        spelling: String,
    },
}

/// How a successful command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    /// `check` found at least one rejected entity.
    Rejections,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<Outcome, FerryError> {
    let cwd = std::env::current_dir().map_err(|e| FerryError::Io(e.to_string()))?;
    let config = FerryConfig::load(cli.config.as_deref(), &cwd)?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Extract { input, output }) => {
            cmd_extract(&config, &input, output.as_deref())?;
            Ok(Outcome::Clean)
        }
        Some(Commands::Check { input }) => cmd_check(&config, &input, json_mode),
        Some(Commands::Normalize { spelling }) => {
            cmd_normalize(&config, &spelling, json_mode)?;
            Ok(Outcome::Clean)
        }
        None => {
            Cli::command()
                .print_help()
                .map_err(|e| FerryError::Io(e.to_string()))?;
            Ok(Outcome::Clean)
        }
    }
}
