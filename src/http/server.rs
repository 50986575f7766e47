//! Liveness and metrics listener for the forwarder
//!
//! Provides REST endpoints reporting service health and the counters of the
//! repository middleware and the MQTT subscriber.

use crate::{
    error::Result,
    forwarder::{MetricsSnapshot, RepositoryMetrics},
    stream::{SubscriberSnapshot, SubscriberStats},
};
use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use log::info;
use serde::Serialize;
use std::{sync::Arc, time::Instant};

/// Name reported by the health endpoint
pub const SERVICE_NAME: &str = "http-forwarder";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Metrics response
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub uptime_seconds: f64,
    pub repository: MetricsSnapshot,
    pub subscriber: SubscriberSnapshot,
}

/// Shared application state
pub struct AppState {
    pub repository: Arc<RepositoryMetrics>,
    pub subscriber: Arc<SubscriberStats>,
    pub started_at: Instant,
}

/// Create the HTTP router with all routes
pub fn create_server(
    repository: Arc<RepositoryMetrics>,
    subscriber: Arc<SubscriberStats>,
) -> Router {
    let state = Arc::new(AppState { repository, subscriber, started_at: Instant::now() });

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// GET /health
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "pass".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /metrics
async fn metrics(State(state): State<Arc<AppState>>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        uptime_seconds: state.started_at.elapsed().as_secs_f64(),
        repository: state.repository.snapshot(),
        subscriber: state.subscriber.snapshot(),
    })
}

/// Start the HTTP server on the specified address
pub async fn start_server(
    addr: &str,
    repository: Arc<RepositoryMetrics>,
    subscriber: Arc<SubscriberStats>,
) -> Result<()> {
    let app = create_server(repository, subscriber);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP forwarder service started, exposed on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
