//! Short code commands

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;

use crate::config::{StaticConfig, StorageBackendKind};
use crate::entity::{DEFAULT_DESTINATION, EntityRegistry};
use crate::interfaces::cli::CliError;
use crate::services::{ShortenRequest, TrackerService};
use crate::storage::{FileStoreFactory, StorageFactory};
use crate::system::DataDirLock;

async fn open_tracker(config: &StaticConfig) -> Result<TrackerService, CliError> {
    config.validate()?;
    let factory = StorageFactory::create(&config.storage).await?;
    let registry = Arc::new(EntityRegistry::new(factory));
    Ok(TrackerService::from_config(registry, &config.shortener))
}

pub async fn shorten_url(
    config: &StaticConfig,
    url: String,
    code: Option<String>,
) -> Result<(), CliError> {
    let tracker = open_tracker(config).await?;
    // 运行中的服务器持有锁时拒绝写入，避免覆盖其缓存
    let _lock = match config.storage.backend_kind()? {
        StorageBackendKind::File => Some(DataDirLock::acquire(Path::new(
            &config.storage.data_dir,
        ))?),
        StorageBackendKind::Memory => None,
    };
    let result = tracker.shorten(ShortenRequest { url: Some(url), code }).await?;

    println!(
        "{} {} -> {}",
        "✓".bold().green(),
        result.code.cyan(),
        result.destination_url.blue().underline()
    );
    if config.storage.backend_kind()? == StorageBackendKind::Memory {
        println!(
            "{} memory backend: this mapping is gone when the command exits",
            "⚠".bold().yellow()
        );
    }
    Ok(())
}

pub async fn show_code(config: &StaticConfig, code: &str, json: bool) -> Result<(), CliError> {
    let tracker = open_tracker(config).await?;
    let snapshot = tracker.inspect(code).await?;

    if json {
        let out = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| CliError::CommandError(format!("Failed to encode JSON: {}", e)))?;
        println!("{}", out);
        return Ok(());
    }

    let destination = snapshot
        .destination_url
        .as_deref()
        .unwrap_or(DEFAULT_DESTINATION);
    println!("{} {}", "Short code:".bold(), snapshot.code.cyan());
    println!("{} {}", "Destination:".bold(), destination.blue().underline());
    println!();

    if snapshot.referrals.is_empty() {
        println!("{} No referring pages found", "ℹ".bold().blue());
    } else {
        println!("{}", "Referring pages:".bold().green());
        for (referrer, count) in &snapshot.referrals {
            println!("  {} {}", referrer, count.to_string().cyan());
        }
        let total: u64 = snapshot.referrals.values().sum();
        println!();
        println!(
            "{} Total {} visits",
            "ℹ".bold().blue(),
            total.to_string().green()
        );
    }
    Ok(())
}

pub async fn list_codes(config: &StaticConfig) -> Result<(), CliError> {
    if config.storage.backend_kind()? != StorageBackendKind::File {
        return Err(CliError::CommandError(
            "list requires the file storage backend".to_string(),
        ));
    }

    let codes = FileStoreFactory::new(&config.storage.data_dir)
        .list_codes()
        .await?;

    if codes.is_empty() {
        println!("{} No short codes found", "ℹ".bold().blue());
    } else {
        for code in &codes {
            println!("  {}", code.cyan());
        }
        println!();
        println!(
            "{} Total {} short codes",
            "ℹ".bold().blue(),
            codes.len().to_string().green()
        );
    }
    Ok(())
}
