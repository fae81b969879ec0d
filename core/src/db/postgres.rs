//! Postgres-backed `Store`. Grounded on the teacher's `db/common.rs`
//! `Database::new`, which builds a `postgresql://` URL from config fields
//! and connects via `sqlx::PgPool`; generalized here to a single
//! namespaced key-value table rather than one table per entity, so the
//! rest of the crate can stay storage-agnostic behind `Store`.

use super::Store;
use crate::config::DatabaseConfig;
use crate::errors::{BridgeError, BridgeResult};
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

#[derive(Clone)]
pub struct PostgresStore {
    pool: Pool<Postgres>,
}

impl PostgresStore {
    pub async fn connect(config: &DatabaseConfig) -> BridgeResult<Self> {
        let url = config.connection_url();
        tracing::debug!(%url, "connecting to bridge database");

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&url)
            .await
            .map_err(BridgeError::Database)?;

        let store = PostgresStore { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> BridgeResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value BYTEA NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(BridgeError::Database)?;
        Ok(())
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn put(&self, key: &str, value: Vec<u8>) -> BridgeResult<()> {
        sqlx::query(
            "INSERT INTO kv_store (key, value) VALUES ($1, $2)
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(BridgeError::Database)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> BridgeResult<Option<Vec<u8>>> {
        let row: Option<(Vec<u8>,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(BridgeError::Database)?;
        Ok(row.map(|(value,)| value))
    }

    async fn delete(&self, key: &str) -> BridgeResult<()> {
        sqlx::query("DELETE FROM kv_store WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(BridgeError::Database)?;
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> BridgeResult<Vec<Vec<u8>>> {
        let pattern = format!("{prefix}%");
        let rows: Vec<(Vec<u8>,)> =
            sqlx::query_as("SELECT value FROM kv_store WHERE key LIKE $1 ORDER BY key")
                .bind(pattern)
                .fetch_all(&self.pool)
                .await
                .map_err(BridgeError::Database)?;
        Ok(rows.into_iter().map(|(value,)| value).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    /// Requires a live Postgres; run with `cargo test -- --ignored` after
    /// pointing `test_config()`'s database fields at one, same convention
    /// as the teacher's `db/common.rs` ignored tests.
    #[tokio::test]
    #[ignore]
    async fn connects_and_round_trips() {
        let config = test_config();
        let store = PostgresStore::connect(&config.database).await.unwrap();
        store.put("test/key", b"hello".to_vec()).await.unwrap();
        let value = store.get("test/key").await.unwrap();
        assert_eq!(value, Some(b"hello".to_vec()));
    }
}
