//! CLI module for the users API
//!
//! Provides command-line interface for:
//! - serve: Load configuration and run the HTTP server

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{init_logging, resolve_config, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
