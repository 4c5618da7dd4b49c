//! Backend abstraction — the operations the dispatcher needs.

use async_trait::async_trait;
use fp_protocol::fleet::{FleetStatistics, HealthStatus, HistoryQuery, HostInfo, PaginatedHistory};

use crate::error::BackendResult;

/// Read-only view of the fleet record-keeping API.
///
/// Implemented over HTTP by `HttpFleetClient` and in memory by
/// `MockFleetBackend`.
#[async_trait]
pub trait FleetBackend: Send + Sync {
    async fn health(&self) -> BackendResult<HealthStatus>;

    /// Every hostname that has reported an update.
    async fn list_hosts(&self) -> BackendResult<Vec<String>>;

    /// Most recent update date per host.
    async fn last_updates(&self) -> BackendResult<Vec<HostInfo>>;

    /// One page of a host's update history.
    async fn host_history(
        &self,
        hostname: &str,
        query: &HistoryQuery,
    ) -> BackendResult<PaginatedHistory>;

    async fn statistics(&self) -> BackendResult<FleetStatistics>;
}
