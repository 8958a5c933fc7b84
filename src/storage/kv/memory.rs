//! In-process store; the default backend and the one the tests run against.

use super::KvStore;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct Entry {
    value: JsonValue,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

#[derive(Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, Entry>>,
    sets: RwLock<HashMap<String, BTreeSet<String>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<JsonValue>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }
        // Expired: drop it lazily.
        self.entries.write().await.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: JsonValue, ttl: Option<Duration>) -> Result<()> {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.entries
            .write()
            .await
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let removed = self.entries.write().await.remove(key);
        Ok(removed.is_some_and(|entry| entry.is_live(Instant::now())))
    }

    async fn set_add(&self, set: &str, member: &str) -> Result<()> {
        self.sets
            .write()
            .await
            .entry(set.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn set_remove(&self, set: &str, member: &str) -> Result<()> {
        if let Some(members) = self.sets.write().await.get_mut(set) {
            members.remove(member);
        }
        Ok(())
    }

    async fn set_members(&self, set: &str) -> Result<Vec<String>> {
        Ok(self
            .sets
            .read()
            .await
            .get(set)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default())
    }
}
