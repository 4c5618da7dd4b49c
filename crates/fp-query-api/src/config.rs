//! Query server configuration.
//!
//! Defaults, then an optional TOML file, then `FP_*` environment overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use fp_fleet_client::BackendConfig;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("invalid config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Top-level query server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Listen address (e.g., "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// URL or file path of the API description rules are derived from.
    #[serde(default)]
    pub spec_location: Option<String>,
    /// A pre-generated routing config document, used instead of the spec.
    #[serde(default)]
    pub routing_config: Option<PathBuf>,
    /// Timeout for fetching the API description.
    #[serde(default = "default_spec_timeout_secs")]
    pub spec_timeout_secs: u64,
    /// Upper bound on the backend work done for one query.
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
    #[serde(default)]
    pub backend: BackendConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8001
}

fn default_spec_timeout_secs() -> u64 {
    10
}

fn default_query_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            spec_location: None,
            routing_config: None,
            spec_timeout_secs: default_spec_timeout_secs(),
            query_timeout_secs: default_query_timeout_secs(),
            backend: BackendConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Defaults overridden by process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Load a TOML file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Apply `FP_*` overrides from `lookup`.
    ///
    /// When no spec location is configured it defaults to
    /// `{backend_url}/openapi.json`.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(host) = lookup("FP_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("FP_PORT") {
            self.port = parse("FP_PORT", port)?;
        }
        if let Some(location) = lookup("FP_SPEC_LOCATION") {
            self.spec_location = Some(location);
        }
        if let Some(path) = lookup("FP_ROUTING_CONFIG") {
            self.routing_config = Some(PathBuf::from(path));
        }
        if let Some(url) = lookup("FP_BACKEND_URL") {
            self.backend.base_url = url;
        }
        if let Some(secs) = lookup("FP_REQUEST_TIMEOUT_SECS") {
            self.backend.timeout_secs = parse("FP_REQUEST_TIMEOUT_SECS", secs)?;
        }
        if let Some(retries) = lookup("FP_MAX_RETRIES") {
            self.backend.max_retries = parse("FP_MAX_RETRIES", retries)?;
        }

        if self.spec_location.is_none() {
            self.spec_location = Some(format!(
                "{}/openapi.json",
                self.backend.base_url.trim_end_matches('/')
            ));
        }
        Ok(self)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn spec_timeout(&self) -> Duration {
        Duration::from_secs(self.spec_timeout_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}
