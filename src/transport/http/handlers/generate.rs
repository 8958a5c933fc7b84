use crate::transport::http::handlers::common::{json_422, require_owner, service_error};
use crate::transport::http::types::{ApiResponse, AppState, GenerateRequest, GenerateResponse};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuery {
    pub session_id: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/names/generate",
    request_body = GenerateRequest,
    params(
        ("x-session-id" = Option<String>, Header, description = "Browser session id"),
        ("x-api-key" = Option<String>, Header, description = "API key (takes precedence)"),
        ("sessionId" = Option<String>, Query, description = "Session id when headers cannot be set")
    ),
    responses(
        (status = 200, description = "One record per fanned-out multi-select value", body = GenerateResponse),
        (status = 400, description = "Missing session or nothing to generate", body = ApiResponse),
        (status = 401, description = "Invalid API key", body = ApiResponse),
        (status = 404, description = "Configuration not found", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn generate_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<GenerateQuery>,
    request: Result<Json<GenerateRequest>, JsonRejection>,
) -> impl IntoResponse {
    let owner = match require_owner(&state, &headers, query.session_id.as_deref()).await {
        Ok(o) => o,
        Err(resp) => return resp.into_response(),
    };
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(e, "{\"variableValues\": {\"<id>\": \"value\" | [\"value\"]}}")
                .into_response()
        }
    };

    match state
        .service
        .generate(&owner, &request.variable_values, request.save)
        .await
    {
        Ok(batch) => (StatusCode::OK, Json(GenerateResponse::from(batch))).into_response(),
        Err(e) => service_error(e).into_response(),
    }
}
