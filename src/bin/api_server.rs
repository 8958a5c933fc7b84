// src/bin/api_server.rs

use adtax::infra::config::{self, ServiceConfig};
use adtax::storage::kv::{KvStore, MemoryKvStore, PostgresKvStore};
use adtax::{transport, NamingService};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // --- Store Initialization ---
    let store: Arc<dyn KvStore> = match config::database_url() {
        Some(url) => {
            info!("connecting to Postgres key/value store");
            Arc::new(PostgresKvStore::connect(&url).await?)
        }
        None => {
            warn!("DATABASE_URL not set; using the in-memory store (data is lost on restart)");
            Arc::new(MemoryKvStore::new())
        }
    };
    store.ping().await?;

    // --- Service Initialization ---
    let service = NamingService::new(store, ServiceConfig::from_env());
    let app_state = transport::http::AppState {
        service: Arc::new(service),
    };

    // --- API Server Initialization ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);

    let bind_addr = config::bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("API server listening on http://{}", bind_addr);
    info!("Swagger UI available at http://{}/swagger-ui", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown signal received");
            }
        })
        .await?;

    info!("graceful shutdown complete");
    Ok(())
}
