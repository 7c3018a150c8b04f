use async_trait::async_trait;
use chrono::{DateTime, Utc};
use drill_core::model::{AssetResponse, RequestKey};
use sqlx::{Row, Sqlite, Transaction};

use super::SqliteRepository;
use super::mapping::{conn, map_response_row, ser};
use crate::repository::{CacheStorage, StorageError};

async fn ensure_cache(
    tx: &mut Transaction<'_, Sqlite>,
    name: &str,
    now: DateTime<Utc>,
) -> Result<(), StorageError> {
    sqlx::query(
        r"
        INSERT INTO asset_caches (name, created_at)
        VALUES (?1, ?2)
        ON CONFLICT(name) DO NOTHING
        ",
    )
    .bind(name)
    .bind(now)
    .execute(&mut **tx)
    .await
    .map_err(conn)?;
    Ok(())
}

async fn upsert_entry(
    tx: &mut Transaction<'_, Sqlite>,
    name: &str,
    key: &RequestKey,
    response: &AssetResponse,
    now: DateTime<Utc>,
) -> Result<(), StorageError> {
    sqlx::query(
        r"
        INSERT INTO asset_cache_entries (
            cache_name, method, url, status, content_type, body, stored_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(cache_name, method, url) DO UPDATE SET
            status = excluded.status,
            content_type = excluded.content_type,
            body = excluded.body,
            stored_at = excluded.stored_at
        ",
    )
    .bind(name)
    .bind(key.method().as_str())
    .bind(key.url())
    .bind(i64::from(response.status()))
    .bind(response.content_type())
    .bind(response.body())
    .bind(now)
    .execute(&mut **tx)
    .await
    .map_err(conn)?;
    Ok(())
}

#[async_trait]
impl CacheStorage for SqliteRepository {
    async fn cache_names(&self) -> Result<Vec<String>, StorageError> {
        let rows = sqlx::query("SELECT name FROM asset_caches ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("name").map_err(ser))
            .collect()
    }

    async fn delete_cache(&self, name: &str) -> Result<bool, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query("DELETE FROM asset_cache_entries WHERE cache_name = ?1")
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        let res = sqlx::query("DELETE FROM asset_caches WHERE name = ?1")
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(res.rows_affected() > 0)
    }

    async fn match_entry(
        &self,
        name: &str,
        key: &RequestKey,
    ) -> Result<Option<AssetResponse>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT status, content_type, body
            FROM asset_cache_entries
            WHERE cache_name = ?1 AND method = ?2 AND url = ?3
            ",
        )
        .bind(name)
        .bind(key.method().as_str())
        .bind(key.url())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_response_row).transpose()
    }

    async fn put_entry(
        &self,
        name: &str,
        key: &RequestKey,
        response: &AssetResponse,
    ) -> Result<(), StorageError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(conn)?;
        ensure_cache(&mut tx, name, now).await?;
        upsert_entry(&mut tx, name, key, response, now).await?;
        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn put_all(
        &self,
        name: &str,
        entries: &[(RequestKey, AssetResponse)],
    ) -> Result<(), StorageError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(conn)?;
        ensure_cache(&mut tx, name, now).await?;
        for (key, response) in entries {
            upsert_entry(&mut tx, name, key, response, now).await?;
        }
        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
