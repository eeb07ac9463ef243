pub mod cache;
pub mod config;
pub mod controllers;
pub mod middleware;
pub mod models;
pub mod redis_client;
pub mod services;

use axum::{http::StatusCode, routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub cache: cache::CacheService,
    pub backend: services::backend::BackendClient,
    pub config: config::Config,
}

impl AppState {
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let backend = services::backend::BackendClient::from_config(&config.backend, &config.circuit_breaker)?;

        let redis = match &config.redis.url {
            Some(url) => {
                let redis = redis_client::RedisClient::new(url).await?;
                tracing::info!("Redis connected");
                Some(redis)
            }
            None => None,
        };

        let cache = cache::CacheService::new(redis, backend.clone(), config.cache.clone());

        Ok(Arc::new(Self { cache, backend, config }))
    }
}

/// Полный роутер приложения.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Bus Ticketing Seat API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .route("/ready", get(ready))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(serde::Serialize)]
struct Readiness {
    status: &'static str,
    cache: &'static str,
    backend_circuit: services::backend::CircuitState,
}

async fn ready(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
) -> (StatusCode, axum::Json<Readiness>) {
    let cache = if state.cache.is_enabled() { "enabled" } else { "disabled" };
    let backend_circuit = state.backend.circuit_state();

    match state.cache.ping().await {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(Readiness { status: "ready", cache, backend_circuit }),
        ),
        Err(e) => {
            tracing::error!("Readiness check failed: {:?}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                axum::Json(Readiness { status: "cache_unavailable", cache, backend_circuit }),
            )
        }
    }
}
