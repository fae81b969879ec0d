//! In-memory `Store`, for unit tests that shouldn't need a live Postgres.
//! Mirrors the teacher's `mock/database.rs` test-double role without the
//! macro-based fixture wiring (a plain struct is enough here).

use super::Store;
use crate::errors::BridgeResult;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn put(&self, key: &str, value: Vec<u8>) -> BridgeResult<()> {
        self.data.write().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> BridgeResult<Option<Vec<u8>>> {
        Ok(self.data.read().unwrap().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> BridgeResult<()> {
        self.data.write().unwrap().remove(key);
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> BridgeResult<Vec<Vec<u8>>> {
        Ok(self
            .data
            .read()
            .unwrap()
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(_, v)| v.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StoreExt;

    #[tokio::test]
    async fn put_get_round_trips() {
        let store = MemoryStore::new();
        store.put_typed("a/1", &42u32).await.unwrap();
        let value: Option<u32> = store.get_typed("a/1").await.unwrap();
        assert_eq!(value, Some(42));
    }

    #[tokio::test]
    async fn scan_prefix_only_matches_prefix() {
        let store = MemoryStore::new();
        store.put_typed("ns/a", &1u32).await.unwrap();
        store.put_typed("ns/b", &2u32).await.unwrap();
        store.put_typed("other/c", &3u32).await.unwrap();

        let values: Vec<u32> = store.scan_prefix_typed("ns/").await.unwrap();
        assert_eq!(values.len(), 2);
    }

    #[tokio::test]
    async fn delete_removes_key() {
        let store = MemoryStore::new();
        store.put_typed("k", &1u32).await.unwrap();
        store.delete("k").await.unwrap();
        let value: Option<u32> = store.get_typed("k").await.unwrap();
        assert_eq!(value, None);
    }
}
