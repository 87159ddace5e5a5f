use std::sync::Arc;

use tracing::info;

use crate::config::{StorageBackendKind, StorageConfig};
use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::{
    FileRecordStore, FileStoreFactory, MemoryRecordStore, MemoryStoreFactory, RecordStore,
    RecordStoreFactory,
};
pub use models::{DESTINATION_KEY, REFERRAL_PREFIX, RecordKey, RecordValue};

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &StorageConfig) -> Result<Arc<dyn RecordStoreFactory>> {
        let factory: Arc<dyn RecordStoreFactory> = match config.backend_kind()? {
            StorageBackendKind::File => {
                let factory = FileStoreFactory::new(&config.data_dir);
                factory.ensure_data_dir().await?;
                info!("Record files stored under: {}", config.data_dir);
                Arc::new(factory)
            }
            StorageBackendKind::Memory => Arc::new(MemoryStoreFactory),
        };

        Ok(factory)
    }
}
