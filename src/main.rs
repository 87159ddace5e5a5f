use clap::Parser;
use colored::Colorize;
use std::process;

use reflinker::cli::Cli;
use reflinker::config::{get_config, init_config, init_config_from};
use reflinker::runtime::modes::{self, Mode};
use reflinker::system::init_logging;

#[actix_web::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.config.as_deref() {
        Some(path) => init_config_from(path),
        None => init_config(),
    }

    match modes::detect_mode(cli.command.as_ref()) {
        Mode::Server => {
            let config = get_config();
            // guard 必须存活到进程结束
            let _guard = match init_logging(&config.logging) {
                Ok(guard) => guard,
                Err(e) => {
                    eprintln!("{} {:#}", "[ERROR]".red().bold(), e);
                    process::exit(1);
                }
            };

            if let Err(e) = modes::run_server().await {
                tracing::error!("Server exited with error: {:#}", e);
                eprintln!("{} {:#}", "[ERROR]".red().bold(), e);
                process::exit(1);
            }
        }
        Mode::Cli => {
            let Some(command) = cli.command else {
                return;
            };
            if let Err(e) = modes::run_cli(command).await {
                eprintln!("{}", e.format_colored());
                process::exit(1);
            }
        }
        Mode::Unknown => {
            eprintln!("No execution mode available for the given arguments");
            process::exit(2);
        }
    }
}
