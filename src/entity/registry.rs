use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::Entity;
use crate::errors::{ReflinkerError, Result};
use crate::storage::RecordStoreFactory;

/// 短码 -> Entity 映射
///
/// 首次引用时创建，进程生命周期内保留。DashMap 的 entry 在分片锁内完成
/// get-or-create，并发首访同一个短码只会得到同一个实例。
pub struct EntityRegistry {
    entities: DashMap<Arc<str>, Arc<Entity>>,
    factory: Arc<dyn RecordStoreFactory>,
}

impl EntityRegistry {
    pub fn new(factory: Arc<dyn RecordStoreFactory>) -> Self {
        Self {
            entities: DashMap::new(),
            factory,
        }
    }

    /// 返回短码对应的 Entity，不存在时创建
    pub fn resolve(&self, code: &str) -> Result<Arc<Entity>> {
        if code.is_empty() {
            return Err(ReflinkerError::validation("short code must not be empty"));
        }

        // 热路径：已存在时不分配 Arc<str>
        if let Some(entity) = self.entities.get(code) {
            return Ok(Arc::clone(entity.value()));
        }

        let entity = self
            .entities
            .entry(Arc::from(code))
            .or_insert_with(|| {
                debug!("EntityRegistry: creating entity for {}", code);
                Arc::new(Entity::new(code, self.factory.open(code)))
            })
            .clone();
        Ok(entity)
    }

    /// 已创建的 Entity 数量
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entities.contains_key(code)
    }

    pub fn backend_name(&self) -> &'static str {
        self.factory.backend_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStoreFactory;

    #[test]
    fn test_resolve_reuses_instance() {
        let registry = EntityRegistry::new(Arc::new(MemoryStoreFactory));
        let a = registry.resolve("abc").unwrap();
        let b = registry.resolve("abc").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resolve_rejects_empty_code() {
        let registry = EntityRegistry::new(Arc::new(MemoryStoreFactory));
        assert!(matches!(
            registry.resolve(""),
            Err(ReflinkerError::Validation(_))
        ));
        assert!(registry.is_empty());
    }
}
