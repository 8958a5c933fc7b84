//! Persistent store using a PostgreSQL connection pool.

use super::KvStore;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;

#[derive(Clone)]
pub struct PostgresKvStore {
    pool: PgPool,
}

impl PostgresKvStore {
    /// Connects and creates the backing tables if needed.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Self::new_with_pool(pool).await
    }

    pub async fn new_with_pool(pool: PgPool) -> Result<Self> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_entries (
                key TEXT PRIMARY KEY,
                value JSONB NOT NULL,
                expires_at TIMESTAMPTZ
            )",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_sets (
                set_key TEXT NOT NULL,
                member TEXT NOT NULL,
                PRIMARY KEY (set_key, member)
            )",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

fn expiry(ttl: Option<Duration>) -> Result<Option<DateTime<Utc>>> {
    match ttl {
        Some(ttl) => Ok(Some(Utc::now() + chrono::Duration::from_std(ttl)?)),
        None => Ok(None),
    }
}

#[async_trait]
impl KvStore for PostgresKvStore {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>> {
        let row = sqlx::query(
            "SELECT value FROM kv_entries
             WHERE key = $1 AND (expires_at IS NULL OR expires_at > now())",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: JsonValue, ttl: Option<Duration>) -> Result<()> {
        sqlx::query(
            "INSERT INTO kv_entries (key, value, expires_at) VALUES ($1, $2, $3)
             ON CONFLICT (key) DO UPDATE SET value = $2, expires_at = $3",
        )
        .bind(key)
        .bind(value)
        .bind(expiry(ttl)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM kv_entries
             WHERE key = $1 AND (expires_at IS NULL OR expires_at > now())",
        )
        .bind(key)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_add(&self, set: &str, member: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO kv_sets (set_key, member) VALUES ($1, $2)
             ON CONFLICT (set_key, member) DO NOTHING",
        )
        .bind(set)
        .bind(member)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_remove(&self, set: &str, member: &str) -> Result<()> {
        sqlx::query("DELETE FROM kv_sets WHERE set_key = $1 AND member = $2")
            .bind(set)
            .bind(member)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_members(&self, set: &str) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT member FROM kv_sets WHERE set_key = $1 ORDER BY member")
            .bind(set)
            .fetch_all(&self.pool)
            .await?;
        let mut members = Vec::with_capacity(rows.len());
        for row in rows {
            members.push(row.try_get::<String, _>("member")?);
        }
        Ok(members)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
