//! Generated-name history entries.

use crate::domain::naming::parse;
use crate::domain::schema::Schema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Variable id -> raw value that produced its segment.
pub type Metadata = BTreeMap<String, String>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRecord {
    pub file_name: String,
    #[serde(default)]
    pub metadata: Metadata,
    /// Unix milliseconds; shared by every record of one batch.
    pub timestamp: i64,
}

impl GeneratedRecord {
    pub fn new(file_name: impl Into<String>, metadata: Metadata, timestamp: i64) -> Self {
        Self {
            file_name: file_name.into(),
            metadata,
            timestamp,
        }
    }
}

/// Puts a new batch in front of `history` (newest first).
pub fn prepend_batch(history: &mut Vec<GeneratedRecord>, batch: Vec<GeneratedRecord>) {
    history.splice(0..0, batch);
}

/// Converts stored history of any vintage into records.
///
/// Bare strings are legacy entries: they become records whose metadata is
/// parsed from the name, stamped with `now`. Objects keep their own metadata
/// and timestamp when present. Entries without a usable file name are dropped.
pub fn migrate_legacy(schema: &Schema, entries: &[JsonValue], now: i64) -> Vec<GeneratedRecord> {
    entries
        .iter()
        .filter_map(|entry| match entry {
            JsonValue::String(file_name) if !file_name.is_empty() => Some(GeneratedRecord::new(
                file_name.clone(),
                parse(file_name, schema).metadata(),
                now,
            )),
            JsonValue::Object(obj) => {
                let file_name = obj.get("fileName")?.as_str()?;
                if file_name.is_empty() {
                    return None;
                }
                let metadata = obj
                    .get("metadata")
                    .and_then(JsonValue::as_object)
                    .map(|m| {
                        m.iter()
                            .filter_map(|(k, v)| Some((k.clone(), v.as_str()?.to_string())))
                            .collect()
                    })
                    .unwrap_or_default();
                let timestamp = obj
                    .get("timestamp")
                    .and_then(|t| t.as_i64().or_else(|| t.as_f64().map(|f| f as i64)))
                    .unwrap_or(now);
                Some(GeneratedRecord::new(file_name, metadata, timestamp))
            }
            _ => None,
        })
        .collect()
}
