use crate::transport::http::handlers::common::{json_422, owner, require_owner, service_error};
use crate::transport::http::types::{ApiResponse, AppState, SaveConfigRequest, ValueResponse};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value as JsonValue;

#[utoipa::path(
    get,
    path = "/api/config",
    params(
        ("x-session-id" = Option<String>, Header, description = "Browser session id"),
        ("x-api-key" = Option<String>, Header, description = "API key (takes precedence)")
    ),
    responses(
        (status = 200, description = "Stored config, or null", body = ValueResponse),
        (status = 401, description = "Invalid API key", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn get_config_handler(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let owner = match owner(&state, &headers, None).await {
        Ok(Some(o)) => o,
        Ok(None) => return Json(ValueResponse { value: JsonValue::Null }).into_response(),
        Err(resp) => return resp.into_response(),
    };

    match state.service.get_schema(&owner).await {
        Ok(schema) => {
            let value = schema
                .and_then(|s| serde_json::to_value(s).ok())
                .unwrap_or(JsonValue::Null);
            Json(ValueResponse { value }).into_response()
        }
        Err(e) => service_error(e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/config",
    request_body = SaveConfigRequest,
    params(
        ("x-session-id" = Option<String>, Header, description = "Browser session id"),
        ("x-api-key" = Option<String>, Header, description = "API key (takes precedence)")
    ),
    responses(
        (status = 200, description = "Config saved", body = ApiResponse),
        (status = 400, description = "Missing session or invalid config", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn save_config_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Result<Json<SaveConfigRequest>, JsonRejection>,
) -> impl IntoResponse {
    let owner = match require_owner(&state, &headers, None).await {
        Ok(o) => o,
        Err(resp) => return resp.into_response(),
    };
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"value\": {\"variables\": [...], ...}}").into_response(),
    };

    match state.service.save_schema(&owner, &request.value).await {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::ok())).into_response(),
        Err(e) => service_error(e).into_response(),
    }
}
