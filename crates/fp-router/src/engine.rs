//! Hot-swappable classifier holder.

use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use fp_protocol::routing::RoutingConfig;

use crate::assembly::{build_routing_config, builtin_config};
use crate::classifier::Classifier;
use crate::error::{RouterError, RouterResult};
use crate::spec::{SpecSource, load_spec};
use crate::templates::TemplateTable;

/// Holds the live [`Classifier`].
///
/// The lock is only taken to clone or swap the `Arc`, never across a
/// classification, so readers see either the old config or the new one.
#[derive(Debug)]
pub struct RoutingEngine {
    current: RwLock<Arc<Classifier>>,
}

impl RoutingEngine {
    pub fn new(config: RoutingConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(Classifier::new(config))),
        }
    }

    /// Engine backed by the table's built-in rules only.
    pub fn builtin(table: &TemplateTable) -> Self {
        Self::new(builtin_config(table))
    }

    /// Build from an API description, falling back to the built-in rules
    /// when the description cannot be loaded or yields no rules.
    pub async fn load(source: &SpecSource, table: &TemplateTable, timeout: Duration) -> Self {
        match build_from_source(source, table, timeout).await {
            Ok(config) => Self::new(config),
            Err(e) => {
                tracing::warn!(
                    source = %source,
                    error = %e,
                    "routing config unavailable, using built-in rules"
                );
                Self::builtin(table)
            }
        }
    }

    /// Build from a previously generated config document. A document with
    /// no rules is rejected.
    pub async fn from_config_file(path: &Path) -> RouterResult<Self> {
        let body = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RouterError::Io(format!("{}: {e}", path.display())))?;
        let config = RoutingConfig::from_json_str(&body)
            .map_err(|e| RouterError::Parse(format!("{}: {e}", path.display())))?;
        if config.rules.is_empty() {
            return Err(RouterError::NoRules(path.display().to_string()));
        }
        tracing::info!(
            path = %path.display(),
            rules = config.rules.len(),
            "routing config document loaded"
        );
        Ok(Self::new(config))
    }

    /// The classifier in effect right now.
    pub fn snapshot(&self) -> Arc<Classifier> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn config(&self) -> Arc<RoutingConfig> {
        self.snapshot().config().clone()
    }

    /// Atomically install a new config.
    pub fn replace(&self, config: RoutingConfig) {
        let next = Arc::new(Classifier::new(config));
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = next;
    }

    /// Re-ingest `source` and swap the result in. On failure the current
    /// config stays in place and the error is returned.
    pub async fn reload(
        &self,
        source: &SpecSource,
        table: &TemplateTable,
        timeout: Duration,
    ) -> RouterResult<Arc<RoutingConfig>> {
        let config = build_from_source(source, table, timeout).await?;
        let rules = config.rules.len();
        self.replace(config);
        tracing::info!(source = %source, rules, "routing config reloaded");
        Ok(self.config())
    }
}

async fn build_from_source(
    source: &SpecSource,
    table: &TemplateTable,
    timeout: Duration,
) -> RouterResult<RoutingConfig> {
    let spec = load_spec(source, timeout).await?;
    let config = build_routing_config(&spec, table);
    if config.rules.is_empty() {
        return Err(RouterError::NoRules(source.to_string()));
    }
    Ok(config)
}
