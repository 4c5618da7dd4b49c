//! Fleet record-keeping API payloads (hosts, update history, statistics).
//!
//! Field names match the backend's JSON exactly.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// `GET /health` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub telemetry: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self.status.as_str(), "healthy" | "ok")
    }
}

/// `GET /hosts` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostList {
    pub hosts: Vec<String>,
}

/// One entry of `GET /last-updates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    pub hostname: String,
    pub os: String,
    pub last_update: NaiveDate,
}

/// A single package update reported by a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageUpdate {
    pub id: i64,
    pub hostname: String,
    pub os: String,
    pub update_date: NaiveDate,
    pub name: String,
    pub old_version: String,
    pub new_version: String,
}

/// Paginated `GET /history/{hostname}` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedHistory {
    pub items: Vec<PackageUpdate>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

/// Filters for the history endpoint. Serialized as query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    /// Partial, case-insensitive package name match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

/// Backend upper bound for `limit`.
pub const MAX_HISTORY_LIMIT: u32 = 1000;

fn default_limit() -> u32 {
    50
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            date_from: None,
            date_to: None,
            os: None,
            package: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl HistoryQuery {
    pub fn since(date_from: NaiveDate) -> Self {
        Self {
            date_from: Some(date_from),
            ..Self::default()
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Clamp `limit` into the range the backend accepts.
    pub fn clamped(mut self) -> Self {
        self.limit = self.limit.clamp(1, MAX_HISTORY_LIMIT);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageCount {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsCount {
    pub os: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostActivity {
    pub hostname: String,
    pub count: u64,
    pub last_update: NaiveDate,
}

/// `GET /statistics` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetStatistics {
    pub total_hosts: u64,
    pub total_updates: u64,
    /// Updates in the last 30 days.
    pub recent_updates: u64,
    #[serde(default)]
    pub top_packages: Vec<PackageCount>,
    #[serde(default)]
    pub updates_by_os: Vec<OsCount>,
    #[serde(default)]
    pub updates_timeline: Vec<TimelinePoint>,
    #[serde(default)]
    pub host_activity: Vec<HostActivity>,
}
