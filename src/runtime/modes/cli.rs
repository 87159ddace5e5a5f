//! CLI mode

use crate::cli::Commands;
use crate::config::get_config;
use crate::interfaces::cli::CliError;

/// Run a one-shot CLI command against the configured record store
pub async fn run_cli(command: Commands) -> Result<(), CliError> {
    let config = get_config();
    crate::interfaces::cli::run_cli_command(command, &config).await
}
