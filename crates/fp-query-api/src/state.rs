//! Shared application state for the Axum server.

use std::sync::Arc;
use std::time::Duration;

use fp_fleet_client::{FleetBackend, MockFleetBackend};
use fp_router::{RoutingEngine, SpecSource, TemplateTable};

use crate::dispatch::QueryDispatcher;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Live routing rules; swapped on reload.
    pub engine: Arc<RoutingEngine>,
    pub dispatcher: QueryDispatcher,
    /// Where reloads re-read the API description from. `None` disables reload.
    pub spec_source: Option<SpecSource>,
    pub templates: Arc<TemplateTable>,
    pub spec_timeout: Duration,
}

impl AppState {
    pub fn new(
        engine: Arc<RoutingEngine>,
        backend: Arc<dyn FleetBackend>,
        query_timeout: Duration,
    ) -> Self {
        Self {
            engine,
            dispatcher: QueryDispatcher::new(backend, query_timeout),
            spec_source: None,
            templates: Arc::new(TemplateTable::fleet_defaults()),
            spec_timeout: Duration::from_secs(10),
        }
    }

    /// Enable `POST /api/v1/routing/reload` against `source`.
    pub fn with_spec_source(mut self, source: SpecSource, timeout: Duration) -> Self {
        self.spec_source = Some(source);
        self.spec_timeout = timeout;
        self
    }

    pub fn with_templates(mut self, templates: TemplateTable) -> Self {
        self.templates = Arc::new(templates);
        self
    }

    /// Built-in rules over the sample fleet, for tests and local runs.
    pub fn with_sample_data() -> Self {
        let templates = TemplateTable::fleet_defaults();
        Self::new(
            Arc::new(RoutingEngine::builtin(&templates)),
            Arc::new(MockFleetBackend::with_sample_fleet()),
            Duration::from_secs(5),
        )
        .with_templates(templates)
    }
}
