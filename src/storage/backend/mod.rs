//! Record store backends
//!
//! Every short code owns exactly one record store. The store is opened by a
//! [`RecordStoreFactory`] and is then exclusively owned by its entity, so the
//! methods take `&mut self` and backends need no internal locking.

mod file;
mod memory;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::errors::Result;
use crate::storage::models::{RecordKey, RecordValue};

pub use file::{FileRecordStore, FileStoreFactory};
pub use memory::{MemoryRecordStore, MemoryStoreFactory};

/// Key-value persistence scoped to one short code.
///
/// A successful `put` is visible to every later `get`/`list` on the same
/// store. Each `put` is atomic; there is no multi-key atomicity.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&mut self, key: &RecordKey) -> Result<Option<RecordValue>>;

    async fn put(&mut self, key: RecordKey, value: RecordValue) -> Result<()>;

    async fn list(&mut self) -> Result<BTreeMap<RecordKey, RecordValue>>;

    fn backend_name(&self) -> &'static str;
}

/// Opens the record store belonging to a short code.
///
/// `open` must be cheap and infallible; backends defer I/O until the first
/// read or write so that the registry can create entities synchronously.
pub trait RecordStoreFactory: Send + Sync {
    fn open(&self, code: &str) -> Box<dyn RecordStore>;

    fn backend_name(&self) -> &'static str;
}
