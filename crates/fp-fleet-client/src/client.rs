//! HTTP client for the record-keeping API with retry and backoff.
//!
//! Server errors (5xx), connection failures and timeouts are retried up to
//! `max_retries` times, sleeping `retry_base_delay_ms * 2^attempt` between
//! attempts. Client errors (4xx) and undecodable bodies fail immediately.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use fp_protocol::fleet::{
    FleetStatistics, HealthStatus, HistoryQuery, HostInfo, HostList, PaginatedHistory,
};

use crate::backend::FleetBackend;
use crate::error::{BackendError, BackendResult};

/// Connection settings for the record-keeping API.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL, e.g. `http://localhost:8000`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// First backoff step; doubles on each retry.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_base_delay_ms() -> u64 {
    1000
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(self.retry_base_delay_ms.saturating_mul(factor))
    }
}

/// `FleetBackend` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFleetClient {
    client: reqwest::Client,
    base_url: Url,
    config: BackendConfig,
}

impl HttpFleetClient {
    pub fn new(config: BackendConfig) -> BackendResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| BackendError::Config(format!("base_url {:?}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::Config(format!(
                "base_url {:?} cannot carry a path",
                config.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| BackendError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T, Q>(&self, segments: &[&str], query: Option<&Q>) -> BackendResult<T>
    where
        T: DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let url = self.endpoint(segments);
        let endpoint = url.path().to_string();
        let mut attempt: u32 = 0;

        loop {
            let mut request = self.client.get(url.clone());
            if let Some(query) = query {
                request = request.query(query);
            }

            let outcome = match request.send().await {
                Ok(response) if response.status().is_success() => {
                    return response.json::<T>().await.map_err(|e| BackendError::Decode {
                        endpoint: endpoint.clone(),
                        message: e.to_string(),
                    });
                }
                Ok(response) => BackendError::Status {
                    endpoint: endpoint.clone(),
                    status: response.status().as_u16(),
                },
                Err(e) if e.is_timeout() => BackendError::Timeout(endpoint.clone()),
                Err(e) => BackendError::Connection {
                    attempts: attempt + 1,
                    message: e.to_string(),
                },
            };

            if !outcome.is_retryable() || attempt >= self.config.max_retries {
                tracing::warn!(
                    endpoint = %endpoint,
                    attempts = attempt + 1,
                    error = %outcome,
                    "backend request failed"
                );
                return Err(outcome);
            }

            let delay = self.config.backoff(attempt);
            tracing::debug!(
                endpoint = %endpoint,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                error = %outcome,
                "retrying backend request"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[async_trait]
impl FleetBackend for HttpFleetClient {
    async fn health(&self) -> BackendResult<HealthStatus> {
        self.get_json::<_, ()>(&["health"], None).await
    }

    async fn list_hosts(&self) -> BackendResult<Vec<String>> {
        let list: HostList = self.get_json::<_, ()>(&["hosts"], None).await?;
        Ok(list.hosts)
    }

    async fn last_updates(&self) -> BackendResult<Vec<HostInfo>> {
        self.get_json::<_, ()>(&["last-updates"], None).await
    }

    async fn host_history(
        &self,
        hostname: &str,
        query: &HistoryQuery,
    ) -> BackendResult<PaginatedHistory> {
        let query = query.clone().clamped();
        self.get_json(&["history", hostname], Some(&query)).await
    }

    async fn statistics(&self) -> BackendResult<FleetStatistics> {
        self.get_json::<_, ()>(&["statistics"], None).await
    }
}
