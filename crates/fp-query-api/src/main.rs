//! FleetPulse query server — natural-language questions over the fleet API.
//!
//! Derives routing rules from the backend's API description at startup,
//! then answers `POST /api/v1/query` by classifying the question and
//! calling the matching backend endpoint.

use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use fp_fleet_client::HttpFleetClient;
use fp_query_api::config::ApiConfig;
use fp_query_api::routes;
use fp_query_api::state::AppState;
use fp_router::{RoutingEngine, SpecSource, TemplateTable};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "fp-query-api starting");

    let config = match std::env::var("FP_CONFIG") {
        Ok(path) => ApiConfig::from_file(Path::new(&path))?
            .with_overrides(|key| std::env::var(key).ok())?,
        Err(_) => ApiConfig::from_env()?,
    };

    let templates = TemplateTable::fleet_defaults();
    let spec_source = config.spec_location.as_deref().map(SpecSource::parse);

    // A pre-generated config wins over live ingestion.
    let engine = match (&config.routing_config, &spec_source) {
        (Some(path), _) => match RoutingEngine::from_config_file(path).await {
            Ok(engine) => engine,
            Err(e) => {
                tracing::warn!(error = %e, "routing config document unusable, using built-in rules");
                RoutingEngine::builtin(&templates)
            }
        },
        (None, Some(source)) => {
            RoutingEngine::load(source, &templates, config.spec_timeout()).await
        }
        (None, None) => RoutingEngine::builtin(&templates),
    };
    tracing::info!(rules = engine.config().rules.len(), "routing rules ready");

    let backend = Arc::new(HttpFleetClient::new(config.backend.clone())?);
    tracing::info!(backend = %config.backend.base_url, "fleet backend configured");

    let mut state = AppState::new(Arc::new(engine), backend, config.query_timeout())
        .with_templates(templates);
    if let Some(source) = spec_source {
        state = state.with_spec_source(source, config.spec_timeout());
    }

    let app = routes::build_router(state);

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
