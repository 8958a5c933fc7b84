use crate::transport::http::handlers::common::{json_422, owner, require_owner, service_error};
use crate::transport::http::types::{
    ApiResponse, AppState, MigrateRequest, ParseRequest, SaveNamesRequest, ValueResponse,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value as JsonValue;

#[utoipa::path(
    get,
    path = "/api/names",
    params(
        ("x-session-id" = Option<String>, Header, description = "Browser session id"),
        ("x-api-key" = Option<String>, Header, description = "API key (takes precedence)")
    ),
    responses(
        (status = 200, description = "History, newest first, or null", body = ValueResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn get_names_handler(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let owner = match owner(&state, &headers, None).await {
        Ok(Some(o)) => o,
        Ok(None) => return Json(ValueResponse { value: JsonValue::Null }).into_response(),
        Err(resp) => return resp.into_response(),
    };

    match state.service.get_history(&owner).await {
        Ok(history) => {
            let value = serde_json::to_value(history).unwrap_or(JsonValue::Null);
            Json(ValueResponse { value }).into_response()
        }
        Err(e) => service_error(e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/names",
    request_body = SaveNamesRequest,
    responses(
        (status = 200, description = "History replaced", body = ApiResponse),
        (status = 400, description = "Session ID required", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn save_names_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Result<Json<SaveNamesRequest>, JsonRejection>,
) -> impl IntoResponse {
    let owner = match require_owner(&state, &headers, None).await {
        Ok(o) => o,
        Err(resp) => return resp.into_response(),
    };
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"value\": [{\"fileName\", \"metadata\", \"timestamp\"}]}").into_response(),
    };

    match state.service.save_history(&owner, &request.value).await {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::ok())).into_response(),
        Err(e) => service_error(e).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/names",
    responses(
        (status = 200, description = "History cleared", body = ApiResponse),
        (status = 400, description = "Session ID required", body = ApiResponse)
    )
)]
pub async fn clear_names_handler(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let owner = match require_owner(&state, &headers, None).await {
        Ok(o) => o,
        Err(resp) => return resp.into_response(),
    };

    match state.service.clear_history(&owner).await {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::ok())).into_response(),
        Err(e) => service_error(e).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/names/{index}",
    params(
        ("index" = usize, Path, description = "Position in the history (0 = newest)")
    ),
    responses(
        (status = 200, description = "Entry removed; data holds the removed record", body = ApiResponse),
        (status = 404, description = "No entry at that index", body = ApiResponse)
    )
)]
pub async fn delete_name_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(index): Path<usize>,
) -> impl IntoResponse {
    let owner = match require_owner(&state, &headers, None).await {
        Ok(o) => o,
        Err(resp) => return resp.into_response(),
    };

    match state.service.delete_history_entry(&owner, index).await {
        Ok(removed) => (
            StatusCode::OK,
            Json(ApiResponse::with_data(
                serde_json::to_value(removed).unwrap_or(JsonValue::Null),
            )),
        )
            .into_response(),
        Err(e) => service_error(e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/names/parse",
    request_body = ParseRequest,
    responses(
        (status = 200, description = "Per-variable match results and alignment", body = ApiResponse),
        (status = 404, description = "Configuration not found", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn parse_name_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Result<Json<ParseRequest>, JsonRejection>,
) -> impl IntoResponse {
    let owner = match require_owner(&state, &headers, None).await {
        Ok(o) => o,
        Err(resp) => return resp.into_response(),
    };
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"fileName\": \"...\"}").into_response(),
    };

    match state.service.parse_name(&owner, &request.file_name).await {
        Ok(parsed) => {
            let data = serde_json::json!({
                "metadata": parsed.metadata(),
                "fields": parsed.fields,
                "alignment": parsed.alignment,
                "segments": parsed.segments,
            });
            (StatusCode::OK, Json(ApiResponse::with_data(data))).into_response()
        }
        Err(e) => service_error(e).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/names/migrate",
    request_body = MigrateRequest,
    responses(
        (status = 200, description = "Migrated history; data holds the stored records", body = ApiResponse),
        (status = 404, description = "Configuration not found", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn migrate_names_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Result<Json<MigrateRequest>, JsonRejection>,
) -> impl IntoResponse {
    let owner = match require_owner(&state, &headers, None).await {
        Ok(o) => o,
        Err(resp) => return resp.into_response(),
    };
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"value\": [\"file_name\", ...]}").into_response(),
    };

    match state.service.migrate_history(&owner, &request.value).await {
        Ok(records) => (
            StatusCode::OK,
            Json(ApiResponse::with_data(
                serde_json::to_value(records).unwrap_or(JsonValue::Null),
            )),
        )
            .into_response(),
        Err(e) => service_error(e).into_response(),
    }
}
