use crate::app::errors::ServiceError;
use crate::transport::http::handlers::common::{service_error, session_id};
use crate::transport::http::types::{ApiResponse, AppState, CreateKeyRequest};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value as JsonValue;

#[utoipa::path(
    post,
    path = "/api/keys",
    request_body = CreateKeyRequest,
    responses(
        (status = 200, description = "Key created; the plain key is only returned here", body = ApiResponse),
        (status = 400, description = "Invalid environment", body = ApiResponse)
    )
)]
pub async fn create_key_handler(
    State(state): State<AppState>,
    request: Option<Json<CreateKeyRequest>>,
) -> impl IntoResponse {
    // A missing or unreadable body falls back to defaults.
    let request = request.map(|Json(v)| v).unwrap_or_default();

    match state
        .service
        .create_api_key(request.name, request.environment.as_deref())
        .await
    {
        Ok(created) => (
            StatusCode::OK,
            Json(ApiResponse::with_data(
                serde_json::to_value(created).unwrap_or(JsonValue::Null),
            )),
        )
            .into_response(),
        Err(e) => service_error(e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/keys",
    responses(
        (status = 200, description = "Key metadata (never the keys themselves)", body = ApiResponse)
    )
)]
pub async fn list_keys_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.list_api_keys().await {
        Ok(keys) => (
            StatusCode::OK,
            Json(ApiResponse::with_data(serde_json::json!({ "keys": keys }))),
        )
            .into_response(),
        Err(e) => service_error(e).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/keys/{keyId}",
    params(
        ("keyId" = String, Path, description = "Key id returned at creation")
    ),
    responses(
        (status = 200, description = "Key revoked", body = ApiResponse),
        (status = 404, description = "Key not found", body = ApiResponse)
    )
)]
pub async fn revoke_key_handler(
    State(state): State<AppState>,
    Path(key_id): Path<String>,
) -> impl IntoResponse {
    match state.service.revoke_api_key(&key_id).await {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::ok())).into_response(),
        Err(e) => service_error(e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/keys/{keyId}/sync-config",
    params(
        ("keyId" = String, Path, description = "Key id returned at creation"),
        ("x-session-id" = String, Header, description = "Session whose config is copied")
    ),
    responses(
        (status = 200, description = "Configuration synced to API key", body = ApiResponse),
        (status = 400, description = "Session ID required", body = ApiResponse),
        (status = 404, description = "Key or session config not found", body = ApiResponse)
    )
)]
pub async fn sync_config_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(key_id): Path<String>,
) -> impl IntoResponse {
    let Some(session) = session_id(&headers) else {
        return service_error(ServiceError::SessionRequired).into_response();
    };

    match state.service.sync_config_to_key(session, &key_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::with_data(serde_json::json!({
                "message": "Configuration synced to API key"
            }))),
        )
            .into_response(),
        Err(e) => service_error(e).into_response(),
    }
}
