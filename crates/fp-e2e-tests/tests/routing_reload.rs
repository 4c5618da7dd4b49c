//! E2E tests for the routing config lifecycle: startup ingestion, built-in
//! fallback, inspection and hot reload.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{TestHarness, mount_spec};

#[tokio::test]
async fn e2e_startup_ingests_api_description() {
    let h = TestHarness::with_sample_fleet().await;

    let (status, health) = h.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["rules"], 9);
    assert_eq!(health["api_version"], "1.4.0");

    let (status, routing) = h.get("/api/v1/routing").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(routing["metadata"]["totalEndpoints"], 9);
    assert_eq!(routing["rules"][0]["category"], "health_status");
    assert_eq!(routing["rules"][0]["priority"], 100);
}

#[tokio::test]
async fn e2e_unreachable_description_uses_builtin_rules() {
    let h = TestHarness::without_spec().await;

    let (_, health) = h.get("/health").await;
    assert_eq!(health["rules"], 7);
    assert!(health["api_version"].is_null());

    // Built-in rules still answer questions.
    let (status, json) = h.ask("What is the health status?").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["category"], "health_status");
    assert_eq!(json["success"], true);
}

#[tokio::test]
async fn e2e_reload_picks_up_description() {
    let h = TestHarness::without_spec().await;
    mount_spec(&h.backend).await;

    let (status, json) = h.post("/api/v1/routing/reload", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "reloaded");
    assert_eq!(json["rules"], 9);
    assert_eq!(json["totalEndpoints"], 9);

    let (_, health) = h.get("/health").await;
    assert_eq!(health["rules"], 9);

    let (_, answer) = h.ask("load the demo please").await;
    assert_eq!(answer["category"], "demo");
}

#[tokio::test]
async fn e2e_failed_reload_keeps_current_rules() {
    let h = TestHarness::with_sample_fleet().await;
    h.backend.reset().await;

    let (status, json) = h.post("/api/v1/routing/reload", json!({})).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["status"], 502);
    assert!(json["error"].as_str().unwrap().contains("404"));

    let (_, health) = h.get("/health").await;
    assert_eq!(health["rules"], 9);
    assert_eq!(health["api_version"], "1.4.0");
}

#[tokio::test]
async fn e2e_explain_orders_matches_by_priority() {
    let h = TestHarness::with_sample_fleet().await;

    let (status, json) = h
        .post(
            "/api/v1/routing/explain",
            json!({"query": "which hosts were updated"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let matches = json["matches"].as_array().unwrap();
    assert_eq!(matches[0]["category"], "update_tracking");
    assert!(matches.iter().any(|m| m["category"] == "host_management"));
    assert!(h.requests_to("/hosts").await.is_empty());
}
