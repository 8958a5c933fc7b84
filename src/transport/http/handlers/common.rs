use crate::app::errors::ServiceError;
use crate::app::naming_service::Owner;
use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use tracing::error;

pub const SESSION_HEADER: &str = "x-session-id";
pub const API_KEY_HEADER: &str = "x-api-key";
const API_KEY_PREFIX: &str = "adtax_";

pub type HandlerError = (StatusCode, Json<ApiResponse>);

pub fn service_error(err: ServiceError) -> HandlerError {
    let status = match &err {
        ServiceError::SessionRequired
        | ServiceError::InvalidEnvironment(_)
        | ServiceError::InvalidSchema(_)
        | ServiceError::NothingToGenerate(_) => StatusCode::BAD_REQUEST,
        ServiceError::InvalidApiKey | ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
        ServiceError::ConfigNotFound
        | ServiceError::KeyNotFound
        | ServiceError::HistoryIndexOutOfRange { .. } => StatusCode::NOT_FOUND,
        ServiceError::Storage(e) => {
            error!("storage failure: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ApiResponse::failure(err.to_string(), err.error_code())),
    )
}

pub fn json_422(err: JsonRejection, expected: &str) -> HandlerError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::failure(
            format!("Invalid JSON body: {} (expected: {})", err, expected),
            "INVALID_JSON",
        )),
    )
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

pub fn session_id(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, SESSION_HEADER)
}

/// `x-api-key`, or an `Authorization: Bearer adtax_...` token.
pub fn api_key(headers: &HeaderMap) -> Option<&str> {
    header_str(headers, API_KEY_HEADER).or_else(|| {
        header_str(headers, "authorization")
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| token.starts_with(API_KEY_PREFIX))
    })
}

/// Owner for the request, `None` when it carries neither key nor session.
pub async fn owner(
    state: &AppState,
    headers: &HeaderMap,
    fallback_session: Option<&str>,
) -> Result<Option<Owner>, HandlerError> {
    let session = session_id(headers).or(fallback_session);
    state
        .service
        .resolve_owner(session, api_key(headers))
        .await
        .map_err(service_error)
}

/// Like [`owner`], but anonymous requests are rejected.
pub async fn require_owner(
    state: &AppState,
    headers: &HeaderMap,
    fallback_session: Option<&str>,
) -> Result<Owner, HandlerError> {
    owner(state, headers, fallback_session)
        .await?
        .ok_or_else(|| service_error(ServiceError::SessionRequired))
}
