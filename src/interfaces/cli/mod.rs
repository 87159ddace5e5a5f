//! CLI interface module
//!
//! Runs tracker operations against the configured record store without
//! starting the HTTP server.

pub mod commands;

use std::fmt;

use crate::cli::{Commands, ConfigCommands};
use crate::config::StaticConfig;

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::ReflinkerError> for CliError {
    fn from(err: crate::errors::ReflinkerError) -> Self {
        if err.is_storage_failure() {
            CliError::StorageError(err.message().to_string())
        } else {
            CliError::CommandError(err.format_simple())
        }
    }
}

/// Run a CLI command from clap-parsed input
///
/// `Serve` is handled by the caller.
pub async fn run_cli_command(cmd: Commands, config: &StaticConfig) -> Result<(), CliError> {
    match cmd {
        Commands::Serve => Err(CliError::CommandError(
            "serve is not a CLI command".to_string(),
        )),
        Commands::Shorten { url, code } => commands::shorten_url(config, url, code).await,
        Commands::Show { code, json } => commands::show_code(config, &code, json).await,
        Commands::List => commands::list_codes(config).await,
        Commands::Config { action } => match action {
            ConfigCommands::Generate { output_path, force } => {
                commands::config_generate(output_path, force)
            }
        },
    }
}
