//! Natural-language query endpoints.

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use uuid::Uuid;

use fp_protocol::query::{ClassificationResult, QueryRequest, QueryResult};
use fp_router::{ExtractedEntities, extract_entities};

use crate::dispatch::MAX_QUERY_CHARS;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// POST /api/v1/query — answer a question about the fleet.
///
/// Always 200 for a well-formed body; an unanswerable question is a
/// `QueryResult` with `success = false`.
pub async fn query(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Json<QueryResult> {
    let request_id = Uuid::now_v7();
    let classifier = state.engine.snapshot();
    let result = state.dispatcher.handle(&classifier, &req).await;

    tracing::info!(
        request_id = %request_id,
        category = %result.category,
        success = result.success,
        "query answered"
    );
    Json(result)
}

/// Response body for `POST /api/v1/classify`.
#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub classification: Option<ClassificationResult>,
    pub entities: ExtractedEntities,
}

/// POST /api/v1/classify — classification and entities only, no backend call.
///
/// Hostnames are matched against `context.known_hosts` when provided.
pub async fn classify(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> ApiResult<Json<ClassifyResponse>> {
    let query = validated(&req.query)?;
    let classifier = state.engine.snapshot();
    let known_hosts = req.context.known_hosts.unwrap_or_default();

    Ok(Json(ClassifyResponse {
        classification: classifier.classify(query),
        entities: extract_entities(query, &known_hosts),
    }))
}

/// Trimmed query text, rejecting empty and overlong input.
pub(crate) fn validated(query: &str) -> ApiResult<&str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query cannot be empty".into()));
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(ApiError::BadRequest(format!(
            "query too long (maximum {MAX_QUERY_CHARS} characters)"
        )));
    }
    Ok(query)
}
