//! Persistence layer: a namespaced key-value `Store`, mirroring §6's
//! "Persisted state" model, with a Postgres-backed implementation for
//! production (`postgres.rs`, grounded on the teacher's `db/common.rs`
//! `sqlx::PgPool` usage) and an in-memory one for tests (`memory.rs`,
//! grounded on the teacher's `mock/database.rs` test-double pattern).

pub mod memory;
pub mod postgres;
pub mod schema;

use crate::errors::BridgeResult;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// Raw namespaced byte store. Every higher-level record goes through
/// `schema::encode`/`decode` before reaching here, so the store itself
/// never needs to know about application types.
#[async_trait]
pub trait Store: Send + Sync {
    async fn put(&self, key: &str, value: Vec<u8>) -> BridgeResult<()>;
    async fn get(&self, key: &str) -> BridgeResult<Option<Vec<u8>>>;
    async fn delete(&self, key: &str) -> BridgeResult<()>;
    /// Lists values whose key starts with `prefix`. Used for enumeration
    /// endpoints (`list_transactions`, `list_active` swaps, validator set).
    async fn scan_prefix(&self, prefix: &str) -> BridgeResult<Vec<Vec<u8>>>;
}

#[async_trait]
pub trait StoreExt: Store {
    async fn put_typed<T: Serialize + Sync>(&self, key: &str, value: &T) -> BridgeResult<()> {
        let bytes = schema::encode(value)
            .map_err(|e| crate::errors::BridgeError::Database(sqlx::Error::Decode(Box::new(e))))?;
        self.put(key, bytes).await
    }

    async fn get_typed<T: DeserializeOwned>(&self, key: &str) -> BridgeResult<Option<T>> {
        match self.get(key).await? {
            None => Ok(None),
            Some(bytes) => {
                let value = schema::decode(&bytes)
                    .map_err(|e| crate::errors::BridgeError::Database(sqlx::Error::Decode(Box::new(e))))?;
                Ok(Some(value))
            }
        }
    }

    async fn scan_prefix_typed<T: DeserializeOwned>(&self, prefix: &str) -> BridgeResult<Vec<T>> {
        let raw = self.scan_prefix(prefix).await?;
        raw.into_iter()
            .map(|bytes| {
                schema::decode(&bytes).map_err(|e| {
                    crate::errors::BridgeError::Database(sqlx::Error::Decode(Box::new(e)))
                })
            })
            .collect()
    }
}

impl<T: Store + ?Sized> StoreExt for T {}
