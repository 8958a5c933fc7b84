//! The naming service.
//!
//! This module sits between the HTTP layer and the key/value store. It is
//! responsible for:
//! 1.  Scoping configs and history to an owner (a browser session or an API key).
//! 2.  Running the composer, parser and aggregator over stored data.
//! 3.  Managing API keys (create, list, revoke, validate, sync a config).
//!
//! History appends are read-modify-write without locking; concurrent writers
//! for the same owner can lose updates.

use crate::app::errors::{ServiceError, ServiceResult};
use crate::crypto::api_key::{generate_api_key, generate_key_id, hash_api_key, KeyEnvironment};
use crate::domain::naming::{self, GeneratedBatch, ParsedName, SelectionValues, Selections};
use crate::domain::record::{self, GeneratedRecord};
use crate::domain::schema::{example_schema, Schema};
use crate::domain::usage::{aggregate, VariableUsageStats};
use crate::infra::config::ServiceConfig;
use crate::storage::kv::KvStore;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

const API_KEY_INDEX: &str = "api_keys:all";
const DEFAULT_SEED_SESSION: &str = "default";

/// Whose config and history a request touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    Session(String),
    ApiKey(String),
}

impl Owner {
    fn scope(&self) -> String {
        match self {
            Owner::Session(id) => id.clone(),
            Owner::ApiKey(key_id) => format!("api_key:{}", key_id),
        }
    }

    fn config_key(&self) -> String {
        format!("config:{}", self.scope())
    }

    fn names_key(&self) -> String {
        format!("names:{}", self.scope())
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Session(id) => write!(f, "session {}", id),
            Owner::ApiKey(key_id) => write!(f, "api key {}", key_id),
        }
    }
}

/// Stored API key metadata; never contains the key itself.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyData {
    pub key_id: String,
    pub name: String,
    pub environment: KeyEnvironment,
    pub created_at: String,
    pub last_used: Option<String>,
    #[serde(default)]
    pub usage_count: u64,
}

/// Returned once at creation; the only time the plain key is visible.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreatedApiKey {
    pub api_key: String,
    pub key_id: String,
    pub name: String,
    pub created_at: String,
    pub environment: KeyEnvironment,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeedOutcome {
    Seeded(Schema),
    AlreadyExists,
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn from_json<T: serde::de::DeserializeOwned>(value: JsonValue, what: &str) -> ServiceResult<T> {
    serde_json::from_value(value)
        .map_err(|e| ServiceError::Storage(anyhow::anyhow!("Stored {} is malformed: {}", what, e)))
}

fn to_json<T: Serialize>(value: &T) -> ServiceResult<JsonValue> {
    serde_json::to_value(value).map_err(|e| ServiceError::Storage(e.into()))
}

pub struct NamingService {
    store: Arc<dyn KvStore>,
    config: ServiceConfig,
}

impl NamingService {
    pub fn new(store: Arc<dyn KvStore>, config: ServiceConfig) -> Self {
        Self { store, config }
    }

    pub async fn ping(&self) -> ServiceResult<()> {
        Ok(self.store.ping().await?)
    }

    /// Picks the owner for a request.
    ///
    /// An API key takes precedence and must be valid; otherwise a non-empty
    /// session id is used. `Ok(None)` means the request is anonymous.
    pub async fn resolve_owner(
        &self,
        session_id: Option<&str>,
        api_key: Option<&str>,
    ) -> ServiceResult<Option<Owner>> {
        if let Some(api_key) = api_key.map(str::trim).filter(|k| !k.is_empty()) {
            return match self.validate_api_key(api_key).await? {
                Some(data) => Ok(Some(Owner::ApiKey(data.key_id))),
                None => Err(ServiceError::InvalidApiKey),
            };
        }
        Ok(session_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Owner::Session(s.to_string())))
    }

    // --- Config ---

    pub async fn get_schema(&self, owner: &Owner) -> ServiceResult<Option<Schema>> {
        match self.store.get(&owner.config_key()).await? {
            Some(JsonValue::Null) | None => Ok(None),
            Some(value) => Ok(Some(from_json(value, "config")?)),
        }
    }

    pub async fn require_schema(&self, owner: &Owner) -> ServiceResult<Schema> {
        self.get_schema(owner)
            .await?
            .ok_or(ServiceError::ConfigNotFound)
    }

    pub async fn save_schema(&self, owner: &Owner, schema: &Schema) -> ServiceResult<()> {
        schema.validate()?;
        self.store
            .set(&owner.config_key(), to_json(schema)?, None)
            .await?;
        info!(%owner, variables = schema.variables.len(), "saved config");
        Ok(())
    }

    // --- History ---

    /// Stored history, newest first.
    ///
    /// Entries are normalized the way a migration would: bare file-name
    /// strings are parsed against the owner's config, and a missing
    /// `metadata` or `timestamp` gets a default. Only entries without a file
    /// name are dropped.
    pub async fn get_history(&self, owner: &Owner) -> ServiceResult<Vec<GeneratedRecord>> {
        let schema = self.get_schema(owner).await?.unwrap_or_default();
        self.load_history(owner, &schema).await
    }

    async fn load_history(&self, owner: &Owner, schema: &Schema) -> ServiceResult<Vec<GeneratedRecord>> {
        let entries = match self.store.get(&owner.names_key()).await? {
            Some(JsonValue::Array(entries)) => entries,
            Some(JsonValue::Null) | None => return Ok(Vec::new()),
            Some(_) => {
                warn!(%owner, "stored history is not an array; ignoring it");
                return Ok(Vec::new());
            }
        };
        let records = record::migrate_legacy(schema, &entries, now_millis());
        if records.len() != entries.len() {
            debug!(%owner, skipped = entries.len() - records.len(), "skipped history entries without a file name");
        }
        Ok(records)
    }

    pub async fn save_history(&self, owner: &Owner, records: &[GeneratedRecord]) -> ServiceResult<()> {
        self.store
            .set(&owner.names_key(), to_json(&records)?, None)
            .await?;
        Ok(())
    }

    pub async fn clear_history(&self, owner: &Owner) -> ServiceResult<()> {
        self.store.delete(&owner.names_key()).await?;
        info!(%owner, "cleared history");
        Ok(())
    }

    pub async fn delete_history_entry(
        &self,
        owner: &Owner,
        index: usize,
    ) -> ServiceResult<GeneratedRecord> {
        let mut history = self.get_history(owner).await?;
        if index >= history.len() {
            return Err(ServiceError::HistoryIndexOutOfRange {
                index,
                len: history.len(),
            });
        }
        let removed = history.remove(index);
        self.save_history(owner, &history).await?;
        Ok(removed)
    }

    /// Converts a legacy history array and stores it in place of the current one.
    pub async fn migrate_history(
        &self,
        owner: &Owner,
        entries: &[JsonValue],
    ) -> ServiceResult<Vec<GeneratedRecord>> {
        let schema = self.require_schema(owner).await?;
        let migrated = record::migrate_legacy(&schema, entries, now_millis());
        self.save_history(owner, &migrated).await?;
        info!(
            %owner,
            received = entries.len(),
            migrated = migrated.len(),
            "migrated history"
        );
        Ok(migrated)
    }

    // --- Naming ---

    /// Composes one batch from client values and, when `save` is set, prepends it to history.
    pub async fn generate(
        &self,
        owner: &Owner,
        values: &SelectionValues,
        save: bool,
    ) -> ServiceResult<GeneratedBatch> {
        let schema = self.require_schema(owner).await?;
        let selections = Selections::from_wire(&schema, values);
        let batch = naming::generate(&schema, &selections, now_millis())?;

        if save {
            let mut history = self.load_history(owner, &schema).await?;
            record::prepend_batch(&mut history, batch.records.clone());
            self.save_history(owner, &history).await?;
        }
        info!(%owner, count = batch.records.len(), saved = save, "generated file names");
        Ok(batch)
    }

    pub async fn parse_name(&self, owner: &Owner, file_name: &str) -> ServiceResult<ParsedName> {
        let schema = self.require_schema(owner).await?;
        Ok(naming::parse(file_name, &schema))
    }

    pub async fn usage_report(&self, owner: &Owner) -> ServiceResult<Vec<VariableUsageStats>> {
        let schema = self.require_schema(owner).await?;
        let history = self.load_history(owner, &schema).await?;
        Ok(aggregate(&schema, &history))
    }

    // --- API keys ---

    fn key_hash_entry(hash: &str) -> String {
        format!("api_key:{}", hash)
    }

    fn key_meta_entry(key_id: &str) -> String {
        format!("key_meta:{}", key_id)
    }

    pub async fn create_api_key(
        &self,
        name: Option<String>,
        environment: Option<&str>,
    ) -> ServiceResult<CreatedApiKey> {
        let environment = match environment {
            Some(env) => env
                .parse::<KeyEnvironment>()
                .map_err(ServiceError::InvalidEnvironment)?,
            None => KeyEnvironment::default(),
        };
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "API Key".to_string());

        let api_key = generate_api_key(environment);
        let key_id = generate_key_id(now_millis());
        let data = ApiKeyData {
            key_id: key_id.clone(),
            name: name.clone(),
            environment,
            created_at: now_iso(),
            last_used: None,
            usage_count: 0,
        };

        let ttl = Some(self.config.api_key_ttl);
        let value = to_json(&data)?;
        self.store
            .set(&Self::key_hash_entry(&hash_api_key(&api_key)), value.clone(), ttl)
            .await?;
        self.store
            .set(&Self::key_meta_entry(&key_id), value, ttl)
            .await?;
        self.store.set_add(API_KEY_INDEX, &key_id).await?;
        info!(%key_id, %environment, "created api key");

        Ok(CreatedApiKey {
            api_key,
            key_id,
            name,
            created_at: data.created_at,
            environment,
        })
    }

    pub async fn list_api_keys(&self) -> ServiceResult<Vec<ApiKeyData>> {
        let mut keys = Vec::new();
        for key_id in self.store.set_members(API_KEY_INDEX).await? {
            if let Some(value) = self.store.get(&Self::key_meta_entry(&key_id)).await? {
                keys.push(from_json(value, "api key metadata")?);
            }
        }
        Ok(keys)
    }

    pub async fn revoke_api_key(&self, key_id: &str) -> ServiceResult<()> {
        if !self.store.delete(&Self::key_meta_entry(key_id)).await? {
            return Err(ServiceError::KeyNotFound);
        }
        self.store.set_remove(API_KEY_INDEX, key_id).await?;
        info!(%key_id, "revoked api key");
        Ok(())
    }

    /// Looks a plain key up and records its use.
    ///
    /// A key whose metadata was revoked no longer validates, even though its
    /// hash entry lives on until it expires.
    pub async fn validate_api_key(&self, api_key: &str) -> ServiceResult<Option<ApiKeyData>> {
        let hash_entry = Self::key_hash_entry(&hash_api_key(api_key));
        let Some(value) = self.store.get(&hash_entry).await? else {
            return Ok(None);
        };
        let mut data: ApiKeyData = from_json(value, "api key")?;
        if self
            .store
            .get(&Self::key_meta_entry(&data.key_id))
            .await?
            .is_none()
        {
            debug!(key_id = %data.key_id, "rejected revoked api key");
            return Ok(None);
        }

        data.last_used = Some(now_iso());
        data.usage_count += 1;
        let ttl = Some(self.config.api_key_ttl);
        let value = to_json(&data)?;
        self.store.set(&hash_entry, value.clone(), ttl).await?;
        self.store
            .set(&Self::key_meta_entry(&data.key_id), value, ttl)
            .await?;
        Ok(Some(data))
    }

    /// Copies the session's config to the API key so key-authenticated calls can use it.
    pub async fn sync_config_to_key(&self, session_id: &str, key_id: &str) -> ServiceResult<()> {
        if self
            .store
            .get(&Self::key_meta_entry(key_id))
            .await?
            .is_none()
        {
            return Err(ServiceError::KeyNotFound);
        }
        let session = Owner::Session(session_id.to_string());
        let schema = self.require_schema(&session).await?;
        let key_owner = Owner::ApiKey(key_id.to_string());
        self.store
            .set(&key_owner.config_key(), to_json(&schema)?, None)
            .await?;
        info!(%key_id, session = %session_id, "synced config to api key");
        Ok(())
    }

    // --- Seed ---

    /// Writes the example schema for a session unless it already has a config.
    pub async fn seed(
        &self,
        session_id: Option<&str>,
        authorization: Option<&str>,
    ) -> ServiceResult<SeedOutcome> {
        let expected = format!("Bearer {}", self.config.seed_key);
        if authorization != Some(expected.as_str()) {
            return Err(ServiceError::Unauthorized);
        }

        let session = session_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SEED_SESSION);
        let owner = Owner::Session(session.to_string());
        if self.store.get(&owner.config_key()).await?.is_some() {
            return Ok(SeedOutcome::AlreadyExists);
        }

        let schema = example_schema();
        self.store
            .set(&owner.config_key(), to_json(&schema)?, None)
            .await?;
        info!(%owner, "seeded example config");
        Ok(SeedOutcome::Seeded(schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::kv::MemoryKvStore;
    use serde_json::json;

    fn service() -> NamingService {
        NamingService::new(Arc::new(MemoryKvStore::new()), ServiceConfig::default())
    }

    fn session(id: &str) -> Owner {
        Owner::Session(id.to_string())
    }

    #[tokio::test]
    async fn generate_requires_config() {
        let svc = service();
        let err = svc
            .generate(&session("s1"), &SelectionValues::new(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ConfigNotFound));
    }

    #[tokio::test]
    async fn generate_prepends_batch_to_history() {
        let svc = service();
        let owner = session("s1");
        svc.save_schema(&owner, &example_schema()).await.unwrap();

        let values: SelectionValues =
            serde_json::from_value(json!({"1": "1080x1080", "4": ["Hero", "Sage"]})).unwrap();
        let first = svc.generate(&owner, &values, true).await.unwrap();
        assert_eq!(first.file_names(), vec!["1080x1080_hero", "1080x1080_sage"]);

        let values: SelectionValues = serde_json::from_value(json!({"1": "1200x628"})).unwrap();
        svc.generate(&owner, &values, true).await.unwrap();

        let history = svc.get_history(&owner).await.unwrap();
        let names: Vec<_> = history.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, vec!["1200x628", "1080x1080_hero", "1080x1080_sage"]);
    }

    #[tokio::test]
    async fn legacy_history_is_counted_and_kept() {
        let svc = service();
        let owner = session("s1");
        svc.save_schema(&owner, &example_schema()).await.unwrap();
        svc.store
            .set(
                "names:s1",
                json!([
                    "1080x1080_creator",
                    {"fileName": "1920x1080_agency", "metadata": {"1": "1920x1080"}}
                ]),
                None,
            )
            .await
            .unwrap();

        let report = svc.usage_report(&owner).await.unwrap();
        let size = report.iter().find(|s| s.variable_id == "1").unwrap();
        assert_eq!(size.total_usage, 2);
        assert_eq!(size.count_of("1080x1080"), 1);
        assert_eq!(size.count_of("1920x1080"), 1);
        let persona = report.iter().find(|s| s.variable_id == "2").unwrap();
        assert_eq!(persona.count_of("Creator"), 1);
        assert_eq!(persona.count_of("Agency"), 1);

        let values: SelectionValues = serde_json::from_value(json!({"1": "1200x628"})).unwrap();
        svc.generate(&owner, &values, true).await.unwrap();

        let history = svc.get_history(&owner).await.unwrap();
        let names: Vec<_> = history.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, vec!["1200x628", "1080x1080_creator", "1920x1080_agency"]);

        let stored = svc.store.get("names:s1").await.unwrap().unwrap();
        assert_eq!(stored[1]["metadata"]["2"], "Creator");
        assert_eq!(stored[2]["metadata"]["1"], "1920x1080");
        assert!(stored[2]["timestamp"].is_i64());
    }

    #[tokio::test]
    async fn history_without_config_keeps_bare_names() {
        let svc = service();
        svc.store
            .set("names:s2", json!(["a_b", {"fileName": "c"}, 42]), None)
            .await
            .unwrap();
        let history = svc.get_history(&session("s2")).await.unwrap();
        let names: Vec<_> = history.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, vec!["a_b", "c"]);
        assert!(history[0].metadata.is_empty());
    }

    #[tokio::test]
    async fn unsaved_generation_leaves_history_alone() {
        let svc = service();
        let owner = session("s1");
        svc.save_schema(&owner, &example_schema()).await.unwrap();
        let values: SelectionValues = serde_json::from_value(json!({"2": "Agency"})).unwrap();
        svc.generate(&owner, &values, false).await.unwrap();
        assert!(svc.get_history(&owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_schema_is_not_saved() {
        let svc = service();
        let owner = session("s1");
        let mut schema = example_schema();
        schema.separator = String::new();
        assert!(matches!(
            svc.save_schema(&owner, &schema).await,
            Err(ServiceError::InvalidSchema(_))
        ));
        assert_eq!(svc.get_schema(&owner).await.unwrap(), None);
    }

    #[tokio::test]
    async fn api_key_lifecycle() {
        let svc = service();
        let created = svc
            .create_api_key(Some("plugin".into()), Some("test"))
            .await
            .unwrap();

        let owner = svc
            .resolve_owner(Some("ignored"), Some(&created.api_key))
            .await
            .unwrap();
        assert_eq!(owner, Some(Owner::ApiKey(created.key_id.clone())));

        let keys = svc.list_api_keys().await.unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].usage_count, 1);
        assert!(keys[0].last_used.is_some());

        svc.revoke_api_key(&created.key_id).await.unwrap();
        assert!(svc.list_api_keys().await.unwrap().is_empty());
        assert!(matches!(
            svc.resolve_owner(None, Some(&created.api_key)).await,
            Err(ServiceError::InvalidApiKey)
        ));
        assert!(matches!(
            svc.revoke_api_key(&created.key_id).await,
            Err(ServiceError::KeyNotFound)
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_environment() {
        let svc = service();
        assert!(matches!(
            svc.create_api_key(None, Some("prod")).await,
            Err(ServiceError::InvalidEnvironment(_))
        ));
    }

    #[tokio::test]
    async fn sync_config_copies_session_schema() {
        let svc = service();
        let created = svc.create_api_key(None, None).await.unwrap();
        assert!(matches!(
            svc.sync_config_to_key("s1", &created.key_id).await,
            Err(ServiceError::ConfigNotFound)
        ));

        svc.save_schema(&session("s1"), &example_schema()).await.unwrap();
        svc.sync_config_to_key("s1", &created.key_id).await.unwrap();
        let key_owner = Owner::ApiKey(created.key_id.clone());
        assert_eq!(
            svc.get_schema(&key_owner).await.unwrap(),
            Some(example_schema())
        );
    }

    #[tokio::test]
    async fn seed_checks_secret_and_existing_config() {
        let svc = service();
        assert!(matches!(
            svc.seed(Some("s1"), Some("Bearer wrong")).await,
            Err(ServiceError::Unauthorized)
        ));
        assert!(matches!(
            svc.seed(Some("s1"), Some("Bearer seed-me")).await,
            Ok(SeedOutcome::Seeded(_))
        ));
        assert_eq!(
            svc.seed(Some("s1"), Some("Bearer seed-me")).await.unwrap(),
            SeedOutcome::AlreadyExists
        );
    }

    #[tokio::test]
    async fn delete_entry_checks_bounds() {
        let svc = service();
        let owner = session("s1");
        svc.save_history(
            &owner,
            &[GeneratedRecord::new("a", Default::default(), 1)],
        )
        .await
        .unwrap();
        assert!(matches!(
            svc.delete_history_entry(&owner, 3).await,
            Err(ServiceError::HistoryIndexOutOfRange { index: 3, len: 1 })
        ));
        let removed = svc.delete_history_entry(&owner, 0).await.unwrap();
        assert_eq!(removed.file_name, "a");
        assert!(svc.get_history(&owner).await.unwrap().is_empty());
    }
}
