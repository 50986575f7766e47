//! HTTP listener of the forwarder service
//!
//! Provides:
//! - `/health` liveness endpoint
//! - `/metrics` counters snapshot

pub mod server;

pub use server::{create_server, start_server, AppState, HealthResponse, MetricsResponse, SERVICE_NAME};
