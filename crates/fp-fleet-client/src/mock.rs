//! In-memory fleet backend for testing — serves a fixed set of updates.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;

use fp_protocol::fleet::{
    FleetStatistics, HealthStatus, HistoryQuery, HostActivity, HostInfo, OsCount, PackageCount,
    PackageUpdate, PaginatedHistory, TimelinePoint,
};

use crate::backend::FleetBackend;
use crate::error::{BackendError, BackendResult};

/// A backend that answers from a pre-loaded update log.
///
/// Statistics are computed from the log the same way the real backend
/// aggregates them. `set_failing(true)` turns every call into a 503.
#[derive(Debug, Default)]
pub struct MockFleetBackend {
    updates: Vec<PackageUpdate>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl MockFleetBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one update.
    pub fn add_update(
        &mut self,
        hostname: &str,
        os: &str,
        update_date: NaiveDate,
        name: &str,
        old_version: &str,
        new_version: &str,
    ) {
        let id = self.updates.len() as i64 + 1;
        self.updates.push(PackageUpdate {
            id,
            hostname: hostname.into(),
            os: os.into(),
            update_date,
            name: name.into(),
            old_version: old_version.into(),
            new_version: new_version.into(),
        });
    }

    /// Four hosts with a handful of updates spread over October 2026.
    pub fn with_sample_fleet() -> Self {
        let d = |day| NaiveDate::from_ymd_opt(2026, 10, day).unwrap_or_default();
        let mut m = Self::new();
        m.add_update("web-01", "ubuntu", d(2), "nginx", "1.24.0", "1.26.1");
        m.add_update("web-01", "ubuntu", d(12), "openssl", "3.0.2", "3.0.13");
        m.add_update("db-01", "debian", d(5), "postgresql-16", "16.2", "16.4");
        m.add_update("db-01", "debian", d(14), "openssl", "3.0.11", "3.0.13");
        m.add_update("app-01", "fedora", d(9), "python3", "3.12.1", "3.12.6");
        m.add_update("web-server-01", "ubuntu", d(13), "nginx", "1.24.0", "1.26.1");
        m.add_update("web-server-01", "ubuntu", d(15), "openssl", "3.0.2", "3.0.13");
        m
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of backend calls served so far (failed ones included).
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self, endpoint: &str) -> BackendResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(BackendError::Status {
                endpoint: endpoint.into(),
                status: 503,
            });
        }
        Ok(())
    }

    fn hosts(&self) -> Vec<String> {
        let mut hosts: Vec<String> = self.updates.iter().map(|u| u.hostname.clone()).collect();
        hosts.sort();
        hosts.dedup();
        hosts
    }

    fn latest_per_host(&self) -> Vec<HostInfo> {
        self.hosts()
            .into_iter()
            .filter_map(|host| {
                self.updates
                    .iter()
                    .filter(|u| u.hostname == host)
                    .max_by_key(|u| u.update_date)
                    .map(|u| HostInfo {
                        hostname: host.clone(),
                        os: u.os.clone(),
                        last_update: u.update_date,
                    })
            })
            .collect()
    }
}

/// Descending by count, ascending by key on ties.
fn ranked<K: Ord + Clone>(items: impl Iterator<Item = K>) -> Vec<(K, u64)> {
    let mut counts = std::collections::BTreeMap::new();
    for item in items {
        *counts.entry(item).or_insert(0u64) += 1;
    }
    let mut ranked: Vec<(K, u64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

#[async_trait]
impl FleetBackend for MockFleetBackend {
    async fn health(&self) -> BackendResult<HealthStatus> {
        self.enter("/health")?;
        Ok(HealthStatus {
            status: "healthy".into(),
            database: "connected".into(),
            telemetry: serde_json::json!({"enabled": false}),
            timestamp: None,
        })
    }

    async fn list_hosts(&self) -> BackendResult<Vec<String>> {
        self.enter("/hosts")?;
        Ok(self.hosts())
    }

    async fn last_updates(&self) -> BackendResult<Vec<HostInfo>> {
        self.enter("/last-updates")?;
        Ok(self.latest_per_host())
    }

    async fn host_history(
        &self,
        hostname: &str,
        query: &HistoryQuery,
    ) -> BackendResult<PaginatedHistory> {
        self.enter(&format!("/history/{hostname}"))?;
        let query = query.clone().clamped();
        let package = query.package.as_deref().map(str::to_lowercase);

        let mut matching: Vec<&PackageUpdate> = self
            .updates
            .iter()
            .filter(|u| u.hostname == hostname)
            .filter(|u| query.date_from.is_none_or(|from| u.update_date >= from))
            .filter(|u| query.date_to.is_none_or(|to| u.update_date <= to))
            .filter(|u| query.os.as_deref().is_none_or(|os| u.os.eq_ignore_ascii_case(os)))
            .filter(|u| {
                package
                    .as_deref()
                    .is_none_or(|p| u.name.to_lowercase().contains(p))
            })
            .collect();
        matching.sort_by(|a, b| b.update_date.cmp(&a.update_date).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .cloned()
            .collect();

        Ok(PaginatedHistory {
            items,
            total,
            limit: query.limit,
            offset: query.offset,
        })
    }

    async fn statistics(&self) -> BackendResult<FleetStatistics> {
        self.enter("/statistics")?;
        let latest = self.updates.iter().map(|u| u.update_date).max();
        let recent_cutoff = latest.and_then(|d| d.checked_sub_days(chrono::Days::new(30)));

        let top_packages = ranked(self.updates.iter().map(|u| u.name.clone()))
            .into_iter()
            .take(10)
            .map(|(name, count)| PackageCount { name, count })
            .collect();
        let updates_by_os = ranked(self.updates.iter().map(|u| u.os.clone()))
            .into_iter()
            .map(|(os, count)| OsCount { os, count })
            .collect();

        let mut updates_timeline: Vec<TimelinePoint> =
            ranked(self.updates.iter().map(|u| u.update_date))
                .into_iter()
                .map(|(date, count)| TimelinePoint { date, count })
                .collect();
        updates_timeline.sort_by_key(|p| p.date);

        let latest_by_host = self.latest_per_host();
        let host_activity = ranked(self.updates.iter().map(|u| u.hostname.clone()))
            .into_iter()
            .filter_map(|(hostname, count)| {
                let last_update = latest_by_host
                    .iter()
                    .find(|h| h.hostname == hostname)?
                    .last_update;
                Some(HostActivity {
                    hostname,
                    count,
                    last_update,
                })
            })
            .collect();

        Ok(FleetStatistics {
            total_hosts: self.hosts().len() as u64,
            total_updates: self.updates.len() as u64,
            recent_updates: self
                .updates
                .iter()
                .filter(|u| recent_cutoff.is_some_and(|cutoff| u.update_date >= cutoff))
                .count() as u64,
            top_packages,
            updates_by_os,
            updates_timeline,
            host_activity,
        })
    }
}
