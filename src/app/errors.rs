//! Service-level errors with stable codes for API clients.

use crate::domain::naming::NothingToGenerate;
use crate::domain::schema::SchemaError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Session ID required")]
    SessionRequired,

    #[error("Configuration not found")]
    ConfigNotFound,

    #[error("Key not found")]
    KeyNotFound,

    #[error("Invalid or revoked API key")]
    InvalidApiKey,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    InvalidEnvironment(String),

    #[error("Invalid configuration: {0}")]
    InvalidSchema(#[from] SchemaError),

    #[error(transparent)]
    NothingToGenerate(#[from] NothingToGenerate),

    #[error("History entry {index} does not exist ({len} entries)")]
    HistoryIndexOutOfRange { index: usize, len: usize },

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SessionRequired => "SESSION_REQUIRED",
            Self::ConfigNotFound => "CONFIG_NOT_FOUND",
            Self::KeyNotFound => "KEY_NOT_FOUND",
            Self::InvalidApiKey => "INVALID_API_KEY",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidEnvironment(_) => "INVALID_ENVIRONMENT",
            Self::InvalidSchema(_) => "INVALID_SCHEMA",
            Self::NothingToGenerate(_) => "NOTHING_TO_GENERATE",
            Self::HistoryIndexOutOfRange { .. } => "HISTORY_INDEX_OUT_OF_RANGE",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
