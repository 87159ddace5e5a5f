//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// reflinker - URL shortener with per-code referral tracking
#[derive(Parser, Debug)]
#[command(name = "reflinker")]
#[command(version)]
#[command(about = "URL shortener with per-code referral tracking", long_about = None)]
pub struct Cli {
    /// Configuration file path (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server (default when no command is given)
    Serve,

    /// Shorten a URL
    ///
    /// An existing mapping under the same code is overwritten.
    Shorten {
        /// Destination URL
        url: String,

        /// Use this short code instead of a random one
        #[arg(long)]
        code: Option<String>,
    },

    /// Show the destination and referral counts of a short code
    Show {
        /// Short code
        code: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List persisted short codes (file backend)
    List,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
