use crate::transport::http::handlers::{config, generate, health, keys, names, report, seed};
use crate::transport::http::types::{
    ApiResponse, CreateKeyRequest, GenerateRequest, GenerateResponse, MigrateRequest,
    OptionUsage, ParseRequest, SaveConfigRequest, SaveNamesRequest, UsageReportResponse,
    ValueResponse, VariableReport,
};
use axum::routing::{delete, get, post};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        config::get_config_handler,
        config::save_config_handler,
        names::get_names_handler,
        names::save_names_handler,
        names::clear_names_handler,
        names::delete_name_handler,
        names::parse_name_handler,
        names::migrate_names_handler,
        generate::generate_handler,
        report::usage_report_handler,
        keys::create_key_handler,
        keys::list_keys_handler,
        keys::revoke_key_handler,
        keys::sync_config_handler,
        seed::seed_handler
    ),
    components(schemas(
        ApiResponse,
        ValueResponse,
        SaveConfigRequest,
        SaveNamesRequest,
        GenerateRequest,
        GenerateResponse,
        ParseRequest,
        MigrateRequest,
        CreateKeyRequest,
        OptionUsage,
        VariableReport,
        UsageReportResponse
    ))
)]
#[allow(dead_code)]
pub struct ApiDoc;

pub fn create_router(app_state: crate::transport::http::types::AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/api/config",
            get(config::get_config_handler).post(config::save_config_handler),
        )
        .route(
            "/api/names",
            get(names::get_names_handler)
                .post(names::save_names_handler)
                .delete(names::clear_names_handler),
        )
        .route("/api/names/generate", post(generate::generate_handler))
        .route("/api/names/parse", post(names::parse_name_handler))
        .route("/api/names/migrate", post(names::migrate_names_handler))
        .route("/api/names/:index", delete(names::delete_name_handler))
        .route("/api/report", get(report::usage_report_handler))
        .route(
            "/api/keys",
            get(keys::list_keys_handler).post(keys::create_key_handler),
        )
        .route("/api/keys/:key_id", delete(keys::revoke_key_handler))
        .route("/api/keys/:key_id/sync-config", post(keys::sync_config_handler))
        .route("/api/seed", post(seed::seed_handler))
        .with_state(app_state)
}
