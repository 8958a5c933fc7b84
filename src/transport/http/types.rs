use crate::app::naming_service::NamingService;
use crate::domain::naming::{SelectionValues, GeneratedBatch};
use crate::domain::record::GeneratedRecord;
use crate::domain::schema::Schema;
use crate::domain::usage::VariableUsageStats;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NamingService>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stable machine-readable error code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            code: None,
        }
    }

    pub fn with_data(data: JsonValue) -> Self {
        Self {
            data: Some(data),
            ..Self::ok()
        }
    }

    pub fn failure(error: impl Into<String>, code: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            code: Some(code.to_string()),
        }
    }
}

/// Read shape for config and history: `{ "value": ... }`, `null` when nothing is stored.
#[derive(Serialize, Debug, ToSchema)]
pub struct ValueResponse {
    #[schema(value_type = Object)]
    pub value: JsonValue,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct SaveConfigRequest {
    #[schema(value_type = Object)]
    pub value: Schema,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct SaveNamesRequest {
    #[schema(value_type = Vec<Object>)]
    pub value: Vec<GeneratedRecord>,
}

fn default_save() -> bool {
    true
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Variable id -> string, or array of strings for multi-selects.
    /// A single-select set to `{free_input}` reads its text from `"{id}_free"`.
    #[schema(value_type = Object)]
    pub variable_values: SelectionValues,
    /// Prepend the generated records to the caller's history (default true).
    #[serde(default = "default_save")]
    pub save: bool,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// First generated name.
    pub file_name: String,
    pub file_names: Vec<String>,
    #[schema(value_type = Vec<Object>)]
    pub records: Vec<GeneratedRecord>,
    pub timestamp: i64,
}

impl From<GeneratedBatch> for GenerateResponse {
    fn from(batch: GeneratedBatch) -> Self {
        let file_names = batch.file_names();
        Self {
            file_name: file_names.first().cloned().unwrap_or_default(),
            file_names,
            records: batch.records,
            timestamp: batch.timestamp,
        }
    }
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParseRequest {
    pub file_name: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct MigrateRequest {
    /// Legacy history: file-name strings and/or record objects.
    #[schema(value_type = Vec<Object>)]
    pub value: Vec<JsonValue>,
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct CreateKeyRequest {
    #[serde(default)]
    pub name: Option<String>,
    /// `live` (default) or `test`.
    #[serde(default)]
    pub environment: Option<String>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct OptionUsage {
    pub value: String,
    pub count: u64,
    /// Share of the variable's total usage, one decimal place.
    pub percent: f64,
    pub custom: bool,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VariableReport {
    pub variable_id: String,
    pub label: String,
    pub total_usage: u64,
    pub most_used: Option<String>,
    pub least_used: Option<String>,
    pub options: Vec<OptionUsage>,
    pub custom_values: Vec<String>,
}

impl From<&VariableUsageStats> for VariableReport {
    fn from(stats: &VariableUsageStats) -> Self {
        let options = stats
            .counts
            .iter()
            .map(|c| OptionUsage {
                value: c.value.clone(),
                count: c.count,
                percent: stats.share_percent(&c.value).unwrap_or(0.0),
                custom: stats.is_custom(&c.value),
            })
            .collect();
        Self {
            variable_id: stats.variable_id.clone(),
            label: stats.label.clone(),
            total_usage: stats.total_usage,
            most_used: stats.most_used().map(|c| c.value.clone()),
            least_used: stats.least_used().map(|c| c.value.clone()),
            options,
            custom_values: stats.custom_values.iter().cloned().collect(),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct UsageReportResponse {
    pub variables: Vec<VariableReport>,
}
