//! # ferry
//!
//! Command-line front end of ferry-core: argument parsing, TOML
//! configuration and batch execution.

pub mod cli;
pub mod config;
