//! Key/value persistence behind the naming service.
//!
//! Values are JSON documents; sets hold plain string members (used for the API
//! key index). Read-modify-write sequencing is left to callers.

pub mod memory;
pub mod postgres;

pub use memory::MemoryKvStore;
pub use postgres::PostgresKvStore;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::time::Duration;

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>>;

    /// Stores `value`, replacing any previous one. `ttl` of `None` never expires.
    async fn set(&self, key: &str, value: JsonValue, ttl: Option<Duration>) -> Result<()>;

    /// Returns whether a live entry was removed.
    async fn delete(&self, key: &str) -> Result<bool>;

    async fn set_add(&self, set: &str, member: &str) -> Result<()>;

    async fn set_remove(&self, set: &str, member: &str) -> Result<()>;

    async fn set_members(&self, set: &str) -> Result<Vec<String>>;

    /// Cheap liveness probe for health checks.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
