use crate::app::naming_service::SeedOutcome;
use crate::transport::http::handlers::common::{service_error, session_id};
use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    post,
    path = "/api/seed",
    params(
        ("authorization" = String, Header, description = "Bearer <SEED_KEY>"),
        ("x-session-id" = Option<String>, Header, description = "Target session (default: \"default\")")
    ),
    responses(
        (status = 200, description = "Example config seeded, or already present", body = ApiResponse),
        (status = 401, description = "Unauthorized", body = ApiResponse)
    )
)]
pub async fn seed_handler(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match state.service.seed(session_id(&headers), authorization).await {
        Ok(SeedOutcome::Seeded(schema)) => (
            StatusCode::OK,
            Json(ApiResponse::with_data(serde_json::json!({
                "message": "Database seeded successfully",
                "existing": false,
                "config": schema,
            }))),
        )
            .into_response(),
        Ok(SeedOutcome::AlreadyExists) => (
            StatusCode::OK,
            Json(ApiResponse::with_data(serde_json::json!({
                "message": "Config already exists, skipping seed",
                "existing": true,
            }))),
        )
            .into_response(),
        Err(e) => service_error(e).into_response(),
    }
}
