//! Routing config inspection and reload endpoints.

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use serde_json::{Value, json};

use fp_protocol::query::{ClassificationResult, QueryRequest};
use fp_protocol::routing::RoutingConfig;

use crate::error::{ApiError, ApiResult};
use crate::routes::query::validated;
use crate::state::AppState;

/// GET /api/v1/routing — the routing config currently in effect.
pub async fn get_routing(State(state): State<AppState>) -> Json<RoutingConfig> {
    Json(state.engine.config().as_ref().clone())
}

/// POST /api/v1/routing/reload — re-ingest the API description and swap
/// the new rules in. The old rules stay active if ingestion fails.
pub async fn reload(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let source = state
        .spec_source
        .as_ref()
        .ok_or_else(|| ApiError::BadRequest("no API description location configured".into()))?;

    let config = state
        .engine
        .reload(source, &state.templates, state.spec_timeout)
        .await
        .map_err(|e| {
            tracing::warn!(source = %source, error = %e, "routing reload failed");
            ApiError::BadGateway(e.to_string())
        })?;

    Ok(Json(json!({
        "status": "reloaded",
        "rules": config.rules.len(),
        "totalEndpoints": config.metadata.total_endpoints,
        "generatedAt": config.metadata.generated_at,
    })))
}

/// Response body for `POST /api/v1/routing/explain`.
#[derive(Debug, Serialize)]
pub struct ExplainResponse {
    pub query: String,
    /// Every matching rule, in evaluation order. The first one wins.
    pub matches: Vec<ClassificationResult>,
}

/// POST /api/v1/routing/explain — show every rule a question matches.
pub async fn explain(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> ApiResult<Json<ExplainResponse>> {
    let query = validated(&req.query)?;
    let matches = state.engine.snapshot().classify_all(query);
    Ok(Json(ExplainResponse {
        query: query.to_string(),
        matches,
    }))
}
