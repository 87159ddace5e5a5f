use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::trace;

use super::{RecordStore, RecordStoreFactory};
use crate::errors::Result;
use crate::storage::models::{RecordKey, RecordValue};

/// 进程内存储，重启后数据丢失
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    code: String,
    records: BTreeMap<RecordKey, RecordValue>,
}

impl MemoryRecordStore {
    pub fn new<T: Into<String>>(code: T) -> Self {
        Self {
            code: code.into(),
            records: BTreeMap::new(),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&mut self, key: &RecordKey) -> Result<Option<RecordValue>> {
        trace!("MemoryRecordStore[{}]: get {}", self.code, key);
        Ok(self.records.get(key).cloned())
    }

    async fn put(&mut self, key: RecordKey, value: RecordValue) -> Result<()> {
        trace!("MemoryRecordStore[{}]: put {}", self.code, key);
        self.records.insert(key, value);
        Ok(())
    }

    async fn list(&mut self) -> Result<BTreeMap<RecordKey, RecordValue>> {
        Ok(self.records.clone())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryStoreFactory;

impl RecordStoreFactory for MemoryStoreFactory {
    fn open(&self, code: &str) -> Box<dyn RecordStore> {
        Box::new(MemoryRecordStore::new(code))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
