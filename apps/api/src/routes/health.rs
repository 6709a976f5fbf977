use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

fn storage_kind(state: &AppState) -> &'static str {
    if state.config.ephemeral_storage {
        "memory"
    } else if state.config.redis_url.is_some() {
        "redis"
    } else {
        "file"
    }
}

/// GET /health
/// Returns a simple status object with service version and simulator state.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "hiring-api",
        "storage": storage_kind(&state),
        "uploading": state.simulator.is_uploading(),
        "analyzing": state.simulator.is_analyzing(),
    }))
}
