//! E2E tests for questions answered end to end: API description ingestion,
//! classification, entity extraction and backend calls over HTTP.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::TestHarness;

#[tokio::test]
async fn e2e_health_question() {
    let h = TestHarness::with_sample_fleet().await;

    let (status, json) = h.ask("What is the health status?").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["category"], "health_status");
    assert!(json["classification"]["confidence"].as_f64().unwrap() >= 0.9);
    assert_eq!(json["classification"]["endpoints"][0], "health_check");
    assert!(json["message"].as_str().unwrap().contains("healthy"));
    assert_eq!(json["data"]["database"], "connected");
    assert_eq!(h.requests_to("/health").await.len(), 1);
}

#[tokio::test]
async fn e2e_statistics_question() {
    let h = TestHarness::with_sample_fleet().await;

    let (status, json) = h.ask("show me fleet statistics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["category"], "statistics_overview");
    let message = json["message"].as_str().unwrap();
    assert!(message.contains("3 hosts with 6 recorded updates"));
    assert!(message.contains("openssl (3 updates)"));
    assert_eq!(json["data"]["total_hosts"], 3);
}

/// Hostnames are matched against the backend's host list, and the time
/// window becomes the history date range.
#[tokio::test]
async fn e2e_host_updates_in_window() {
    let h = TestHarness::with_sample_fleet().await;

    let (status, json) = h
        .ask("recent updates for web-server-01 in the last 3 days")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["category"], "update_tracking");
    let message = json["message"].as_str().unwrap();
    assert!(message.starts_with("web-server-01 received 2 update(s) in the last 3 days"));
    assert!(message.contains("openssl 3.0.2 → 3.0.13"));

    assert_eq!(h.requests_to("/hosts").await.len(), 1);
    let history = h.requests_to("/history/web-server-01").await;
    assert_eq!(history.len(), 1);
    assert!(history[0].contains("date_from="));
    assert!(history[0].contains("date_to="));
}

#[tokio::test]
async fn e2e_host_listing() {
    let h = TestHarness::with_sample_fleet().await;

    let (status, json) = h.ask("list all hosts").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["category"], "host_management");
    assert!(json["message"].as_str().unwrap().contains("Tracking 3 hosts"));
    assert!(json["message"].as_str().unwrap().contains("web-server-01"));
    assert_eq!(json["data"]["hosts"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn e2e_unrelated_question_gets_fallbacks() {
    let h = TestHarness::with_sample_fleet().await;

    let (status, json) = h.ask("xyz completely unrelated text").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert_eq!(json["category"], "unknown");
    assert!(json.get("classification").is_none());
    assert_eq!(json["suggestions"][0], "Health check");
    assert!(h.requests_to("/hosts").await.is_empty());
    assert!(h.requests_to("/health").await.is_empty());
}

/// A tag with no template still gets a rule, answered generically.
#[tokio::test]
async fn e2e_unhandled_category() {
    let h = TestHarness::with_sample_fleet().await;

    let (status, json) = h.ask("load the demo please").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["category"], "demo");
    assert!(json["message"].as_str().unwrap().contains("no specific handler"));
}

#[tokio::test]
async fn e2e_classify_with_caller_hosts() {
    let h = TestHarness::with_sample_fleet().await;

    let (status, json) = h
        .post(
            "/api/v1/classify",
            json!({
                "query": "recent updates for edge-77 in the last 2 weeks",
                "context": {"knownHosts": ["edge-77"]}
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["classification"]["category"], "update_tracking");
    assert_eq!(json["entities"]["hostname"], "edge-77");
    assert_eq!(json["entities"]["time_window"]["days"], 14);
    // Classification never touches the fleet endpoints.
    assert!(h.requests_to("/hosts").await.is_empty());
}

#[tokio::test]
async fn e2e_empty_question() {
    let h = TestHarness::with_sample_fleet().await;

    let (status, json) = h.ask("   ").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert!(json["message"].as_str().unwrap().contains("cannot be empty"));
}
