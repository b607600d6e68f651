use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::state::ServerState;
use crate::storage::StorageBackend;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage: StorageBackend,
    pub uptime_seconds: u64,
}

/// Liveness check for load balancers. Never touches the stores.
pub async fn health_check(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage_backend,
        uptime_seconds: state.uptime_seconds(),
    })
}
