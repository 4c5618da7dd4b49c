//! Shared test harness for E2E integration tests.
//!
//! Stands up a wiremock FleetPulse backend serving the API description and
//! fleet data, then wires the real routing engine, HTTP fleet client and
//! query router against it.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fp_fleet_client::{BackendConfig, HttpFleetClient};
use fp_query_api::routes::build_router;
use fp_query_api::state::AppState;
use fp_router::{RoutingEngine, SpecSource, TemplateTable};

pub const FLEETPULSE_SPEC: &str =
    include_str!("../../../fp-router/tests/fixtures/fleetpulse_openapi.json");

const SPEC_TIMEOUT: Duration = Duration::from_secs(5);

/// Query server wired to a mock FleetPulse backend.
pub struct TestHarness {
    /// Serves `/openapi.json` and whichever fleet endpoints the test mounts.
    pub backend: MockServer,
    pub state: AppState,
    pub router: Router,
}

impl TestHarness {
    /// Backend with the API description and a three-host fleet.
    pub async fn with_sample_fleet() -> Self {
        let backend = MockServer::start().await;
        mount_spec(&backend).await;
        mount_sample_fleet(&backend).await;
        Self::build(backend, 0).await
    }

    /// Backend that serves the API description but no fleet data.
    /// Tests mount the fleet endpoints they need.
    pub async fn spec_only(max_retries: u32) -> Self {
        let backend = MockServer::start().await;
        mount_spec(&backend).await;
        Self::build(backend, max_retries).await
    }

    /// Backend with no API description at startup, so the engine starts
    /// on the built-in rules.
    pub async fn without_spec() -> Self {
        let backend = MockServer::start().await;
        mount_sample_fleet(&backend).await;
        Self::build(backend, 0).await
    }

    async fn build(backend: MockServer, max_retries: u32) -> Self {
        let source = SpecSource::parse(&format!("{}/openapi.json", backend.uri()));
        let engine = RoutingEngine::load(&source, &TemplateTable::fleet_defaults(), SPEC_TIMEOUT).await;

        let client = HttpFleetClient::new(BackendConfig {
            base_url: backend.uri(),
            timeout_secs: 5,
            max_retries,
            retry_base_delay_ms: 10,
        })
        .unwrap();

        let state = AppState::new(Arc::new(engine), Arc::new(client), Duration::from_secs(10))
            .with_spec_source(source, SPEC_TIMEOUT)
            .with_templates(TemplateTable::fleet_defaults());
        let router = build_router(state.clone());

        Self {
            backend,
            state,
            router,
        }
    }

    /// Ask a question (POST /api/v1/query).
    pub async fn ask(&self, query: &str) -> (StatusCode, Value) {
        self.post("/api/v1/query", json!({ "query": query })).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    /// Requests the backend received for `endpoint`, query strings included.
    pub async fn requests_to(&self, endpoint: &str) -> Vec<String> {
        self.backend
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.url.path() == endpoint)
            .map(|r| r.url.to_string())
            .collect()
    }
}

pub async fn mount_spec(server: &MockServer) {
    let spec: Value = serde_json::from_str(FLEETPULSE_SPEC).unwrap();
    Mock::given(method("GET"))
        .and(path("/openapi.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(spec))
        .mount(server)
        .await;
}

pub async fn mount_json(server: &MockServer, endpoint: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, endpoint: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// web-01, db-01 and web-server-01 with a few updates in October 2026.
pub async fn mount_sample_fleet(server: &MockServer) {
    mount_json(
        server,
        "/health",
        json!({"status": "healthy", "database": "connected", "telemetry": {"enabled": false}}),
    )
    .await;
    mount_json(
        server,
        "/hosts",
        json!({"hosts": ["db-01", "web-01", "web-server-01"]}),
    )
    .await;
    mount_json(
        server,
        "/last-updates",
        json!([
            {"hostname": "db-01", "os": "debian", "last_update": "2026-10-14"},
            {"hostname": "web-01", "os": "ubuntu", "last_update": "2026-10-12"},
            {"hostname": "web-server-01", "os": "ubuntu", "last_update": "2026-10-15"}
        ]),
    )
    .await;
    mount_json(
        server,
        "/history/web-server-01",
        json!({
            "items": [
                {"id": 7, "hostname": "web-server-01", "os": "ubuntu", "update_date": "2026-10-15",
                 "name": "openssl", "old_version": "3.0.2", "new_version": "3.0.13"},
                {"id": 6, "hostname": "web-server-01", "os": "ubuntu", "update_date": "2026-10-13",
                 "name": "nginx", "old_version": "1.24.0", "new_version": "1.26.1"}
            ],
            "total": 2,
            "limit": 50,
            "offset": 0
        }),
    )
    .await;
    mount_json(
        server,
        "/statistics",
        json!({
            "total_hosts": 3,
            "total_updates": 6,
            "recent_updates": 6,
            "top_packages": [
                {"name": "openssl", "count": 3},
                {"name": "nginx", "count": 2},
                {"name": "postgresql-16", "count": 1}
            ],
            "updates_by_os": [{"os": "ubuntu", "count": 4}, {"os": "debian", "count": 2}],
            "updates_timeline": [{"date": "2026-10-15", "count": 6}],
            "host_activity": [
                {"hostname": "web-server-01", "count": 2, "last_update": "2026-10-15"}
            ]
        }),
    )
    .await;
}
