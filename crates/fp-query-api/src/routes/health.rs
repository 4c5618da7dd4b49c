//! Health check endpoint.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::state::AppState;

/// GET /health — liveness plus the size of the active rule set.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let config = state.engine.config();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "rules": config.rules.len(),
        "api_version": config.metadata.api_version,
    }))
}
