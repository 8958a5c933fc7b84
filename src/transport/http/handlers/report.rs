use crate::transport::http::handlers::common::{require_owner, service_error};
use crate::transport::http::types::{ApiResponse, AppState, UsageReportResponse, VariableReport};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/report",
    params(
        ("x-session-id" = Option<String>, Header, description = "Browser session id"),
        ("x-api-key" = Option<String>, Header, description = "API key (takes precedence)")
    ),
    responses(
        (status = 200, description = "Per-variable usage, busiest first", body = UsageReportResponse),
        (status = 400, description = "Session ID required", body = ApiResponse),
        (status = 404, description = "Configuration not found", body = ApiResponse)
    )
)]
pub async fn usage_report_handler(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let owner = match require_owner(&state, &headers, None).await {
        Ok(o) => o,
        Err(resp) => return resp.into_response(),
    };

    match state.service.usage_report(&owner).await {
        Ok(stats) => (
            StatusCode::OK,
            Json(UsageReportResponse {
                variables: stats.iter().map(VariableReport::from).collect(),
            }),
        )
            .into_response(),
        Err(e) => service_error(e).into_response(),
    }
}
