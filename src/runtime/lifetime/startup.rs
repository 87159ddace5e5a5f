use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::api::services::EdgeSettings;
use crate::config::{StaticConfig, StorageBackendKind};
use crate::entity::EntityRegistry;
use crate::services::TrackerService;
use crate::storage::StorageFactory;
use crate::system::DataDirLock;

pub struct StartupContext {
    pub registry: Arc<EntityRegistry>,
    pub tracker: Arc<TrackerService>,
    pub edge: EdgeSettings,
    /// 文件后端时持有，服务器退出前不能释放
    pub data_dir_lock: Option<DataDirLock>,
}

/// 准备服务器启动的上下文
/// 包括记录存储、Entity 注册表和业务服务
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    config.validate().context("Invalid configuration")?;

    let factory = StorageFactory::create(&config.storage)
        .await
        .context("Failed to create record store backend")?;
    info!("Using record store backend: {}", factory.backend_name());

    let data_dir_lock = match config.storage.backend_kind()? {
        StorageBackendKind::File => Some(
            DataDirLock::acquire(Path::new(&config.storage.data_dir))
                .context("Failed to lock data directory")?,
        ),
        StorageBackendKind::Memory => None,
    };

    let registry = Arc::new(EntityRegistry::new(factory));
    let tracker = Arc::new(TrackerService::from_config(
        Arc::clone(&registry),
        &config.shortener,
    ));

    let edge = EdgeSettings {
        public_base_url: config.server.public_base_url.clone(),
    };

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        registry,
        tracker,
        edge,
        data_dir_lock,
    })
}
