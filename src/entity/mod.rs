//! Per short code consistency boundary
//!
//! An [`Entity`] owns the record store of one short code behind an async
//! mutex. Every operation takes the lock for its whole read-modify-write
//! sequence, so operations on the same code never interleave while different
//! codes never contend with each other.

pub mod registry;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::errors::{ReflinkerError, Result};
use crate::storage::{RecordKey, RecordStore, RecordValue};

pub use registry::EntityRegistry;

/// 未设置目标地址时 `get_destination` 返回的占位值
pub const DEFAULT_DESTINATION: &str = "";

/// 来源 -> 访问次数
pub type ReferralCounts = BTreeMap<String, u64>;

/// 同一把锁下读取的目标地址与来源计数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySnapshot {
    pub code: String,
    pub destination_url: Option<String>,
    pub referrals: ReferralCounts,
}

pub struct Entity {
    code: Arc<str>,
    store: Mutex<Box<dyn RecordStore>>,
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity").field("code", &self.code).finish()
    }
}

impl Entity {
    pub fn new<C: Into<Arc<str>>>(code: C, store: Box<dyn RecordStore>) -> Self {
        Self {
            code: code.into(),
            store: Mutex::new(store),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// 当前目标地址，未设置时为 `None`
    pub async fn destination(&self) -> Result<Option<String>> {
        let mut guard = self.store.lock().await;
        read_destination(&mut **guard).await
    }

    /// 当前目标地址，未设置时返回 [`DEFAULT_DESTINATION`]
    pub async fn get_destination(&self) -> Result<String> {
        Ok(self
            .destination()
            .await?
            .unwrap_or_else(|| DEFAULT_DESTINATION.to_string()))
    }

    /// 无条件覆盖目标地址
    pub async fn set_destination(&self, url: &str) -> Result<()> {
        let mut guard = self.store.lock().await;
        guard
            .put(RecordKey::Destination, RecordValue::Text(url.to_string()))
            .await?;
        debug!("Entity[{}]: destination set to {}", self.code, url);
        Ok(())
    }

    /// 来源计数加一，返回新的计数
    pub async fn record_referral(&self, referrer: &str) -> Result<u64> {
        let mut guard = self.store.lock().await;
        increment_referral(&self.code, &mut **guard, referrer).await
    }

    /// 所有来源计数的快照，不包含目标地址
    pub async fn list_referrals(&self) -> Result<ReferralCounts> {
        let mut guard = self.store.lock().await;
        read_referrals(&mut **guard).await
    }

    pub async fn snapshot(&self) -> Result<EntitySnapshot> {
        let mut guard = self.store.lock().await;
        let destination_url = read_destination(&mut **guard).await?;
        let referrals = read_referrals(&mut **guard).await?;
        Ok(EntitySnapshot {
            code: self.code.to_string(),
            destination_url,
            referrals,
        })
    }

    /// 记录一次来源并返回目标地址（同一把锁内完成）
    ///
    /// 即使没有目标地址也会计数。
    pub async fn track_and_resolve(&self, referrer: &str) -> Result<Option<String>> {
        let mut guard = self.store.lock().await;
        increment_referral(&self.code, &mut **guard, referrer).await?;
        read_destination(&mut **guard).await
    }

    pub async fn backend_name(&self) -> &'static str {
        self.store.lock().await.backend_name()
    }
}

async fn read_destination(store: &mut dyn RecordStore) -> Result<Option<String>> {
    match store.get(&RecordKey::Destination).await? {
        None => Ok(None),
        Some(RecordValue::Text(url)) => Ok(Some(url)),
        Some(RecordValue::Count(_)) => Err(ReflinkerError::serialization(
            "destination record holds a count instead of a URL",
        )),
    }
}

async fn read_referrals(store: &mut dyn RecordStore) -> Result<ReferralCounts> {
    let mut referrals = ReferralCounts::new();
    for (key, value) in store.list().await? {
        let RecordKey::Referral(referrer) = key else {
            continue;
        };
        let count = value.as_count().ok_or_else(|| {
            ReflinkerError::serialization(format!(
                "referral record for '{}' is not a count",
                referrer
            ))
        })?;
        referrals.insert(referrer, count);
    }
    Ok(referrals)
}

async fn increment_referral(code: &str, store: &mut dyn RecordStore, referrer: &str) -> Result<u64> {
    let key = RecordKey::referral(referrer);
    let current = match store.get(&key).await? {
        None => 0,
        Some(value) => value.as_count().ok_or_else(|| {
            ReflinkerError::serialization(format!(
                "referral record for '{}' is not a count",
                referrer
            ))
        })?,
    };
    let next = current.checked_add(1).ok_or_else(|| {
        ReflinkerError::storage(format!("referral count overflow for '{}'", referrer))
    })?;
    store.put(key, RecordValue::Count(next)).await?;
    trace!("Entity[{}]: referral '{}' -> {}", code, referrer, next);
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryRecordStore;

    fn entity(code: &str) -> Entity {
        Entity::new(code, Box::new(MemoryRecordStore::new(code)))
    }

    #[tokio::test]
    async fn test_unset_destination_uses_default() {
        let e = entity("fresh123");
        assert_eq!(e.destination().await.unwrap(), None);
        assert_eq!(e.get_destination().await.unwrap(), DEFAULT_DESTINATION);
    }

    #[tokio::test]
    async fn test_empty_destination_is_distinct_from_unset() {
        let e = entity("empty123");
        e.set_destination("").await.unwrap();
        assert_eq!(e.destination().await.unwrap(), Some(String::new()));
    }

    #[tokio::test]
    async fn test_referrals_exclude_destination() {
        let e = entity("abcdefgh");
        e.set_destination("https://example.org").await.unwrap();
        e.record_referral("destination_url").await.unwrap();

        let referrals = e.list_referrals().await.unwrap();
        assert_eq!(referrals.len(), 1);
        assert_eq!(referrals.get("destination_url"), Some(&1));
        assert_eq!(
            e.get_destination().await.unwrap(),
            "https://example.org"
        );
    }

    #[tokio::test]
    async fn test_track_and_resolve_counts_without_destination() {
        let e = entity("nodest12");
        assert_eq!(e.track_and_resolve("Direct").await.unwrap(), None);
        assert_eq!(e.list_referrals().await.unwrap().get("Direct"), Some(&1));
    }

    #[tokio::test]
    async fn test_corrupt_referral_value_is_reported() {
        let mut store = MemoryRecordStore::new("corrupt1");
        store
            .put(
                RecordKey::referral("Direct"),
                RecordValue::Text("oops".to_string()),
            )
            .await
            .unwrap();
        let e = Entity::new("corrupt1", Box::new(store));

        let err = e.record_referral("Direct").await.unwrap_err();
        assert!(matches!(err, ReflinkerError::Serialization(_)));
        assert!(e.list_referrals().await.is_err());
    }
}
