//! Query dispatch — classify, extract entities, call the backend, and turn
//! the answer into a `QueryResult`.
//!
//! Every path returns a well-formed `QueryResult`: unknown questions,
//! missing entities, and backend failures are reported in the result, not
//! raised.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde_json::{Value, json};

use fp_fleet_client::{BackendError, BackendResult, FleetBackend};
use fp_protocol::fleet::{FleetStatistics, HistoryQuery, PackageUpdate};
use fp_protocol::query::{ClassificationResult, QueryRequest, QueryResult, UNKNOWN_CATEGORY};
use fp_router::Classifier;
use fp_router::entities::{ExtractedEntities, TimeWindow, extract_entities};
use fp_router::templates::{
    HEALTH_STATUS, HISTORICAL_DATA, HOST_MANAGEMENT, PACKAGE_TRACKING, REPORT_GENERATION,
    STATISTICS_OVERVIEW, UPDATE_TRACKING,
};

/// Longest question accepted, in characters.
pub const MAX_QUERY_CHARS: usize = 500;

/// How many history entries are spelled out in a summary sentence.
const SUMMARY_ITEMS: usize = 3;

/// Categories whose handlers look for a hostname in the question.
const HOST_SCOPED: &[&str] = &[UPDATE_TRACKING, HISTORICAL_DATA, PACKAGE_TRACKING];

/// Routes classified questions to the fleet backend.
#[derive(Clone)]
pub struct QueryDispatcher {
    backend: Arc<dyn FleetBackend>,
    timeout: Duration,
}

impl QueryDispatcher {
    pub fn new(backend: Arc<dyn FleetBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    /// Answer `request` against today's date.
    pub async fn handle(&self, classifier: &Classifier, request: &QueryRequest) -> QueryResult {
        self.handle_at(classifier, request, Utc::now().date_naive())
            .await
    }

    /// Answer `request` with time windows measured back from `today`.
    pub async fn handle_at(
        &self,
        classifier: &Classifier,
        request: &QueryRequest,
        today: NaiveDate,
    ) -> QueryResult {
        let fallback = classifier.config().fallback_suggestions.clone();
        let query = request.query.trim();

        if query.is_empty() {
            return QueryResult::failed(
                UNKNOWN_CATEGORY,
                "Question cannot be empty. Ask something about your fleet.",
                fallback,
            );
        }
        if query.chars().count() > MAX_QUERY_CHARS {
            return QueryResult::failed(
                UNKNOWN_CATEGORY,
                format!("Question is too long (maximum {MAX_QUERY_CHARS} characters)."),
                fallback,
            );
        }

        let Some(classification) = classifier.classify(query) else {
            tracing::info!(query = %query, "no routing rule matched");
            return QueryResult::failed(
                UNKNOWN_CATEGORY,
                "I couldn't work out what you're asking about. Try one of the suggestions.",
                fallback,
            );
        };

        let category = classification.category.clone();
        let known_hosts = self.known_hosts(request, &category).await;
        let entities = extract_entities(query, &known_hosts);
        tracing::debug!(
            category = %category,
            hostname = entities.hostname.as_deref().unwrap_or("-"),
            package = entities.package.as_deref().unwrap_or("-"),
            window_days = entities.time_window.days,
            "query classified"
        );

        let answer = match category.as_str() {
            HEALTH_STATUS => self.health().await,
            STATISTICS_OVERVIEW => self.statistics(false).await,
            REPORT_GENERATION => self.statistics(true).await,
            HOST_MANAGEMENT => self.hosts().await,
            UPDATE_TRACKING => self.updates(&entities, &known_hosts, today).await,
            HISTORICAL_DATA => self.history(&entities, &known_hosts, today).await,
            PACKAGE_TRACKING => self.packages(&entities).await,
            other => Ok(unhandled(other, fallback)),
        };

        match answer {
            Ok(result) => result.with_classification(classification),
            Err(e) => {
                tracing::warn!(category = %category, error = %e, "query handler failed");
                apology(&classification, &e)
            }
        }
    }

    /// Run one backend call under the dispatcher's timeout.
    async fn call<T>(
        &self,
        endpoint: &str,
        fut: impl Future<Output = BackendResult<T>>,
    ) -> BackendResult<T> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| BackendError::Timeout(endpoint.to_string()))?
    }

    /// Hosts to match against: the caller's list if given, else the
    /// backend's, else none.
    async fn known_hosts(&self, request: &QueryRequest, category: &str) -> Vec<String> {
        if let Some(hosts) = &request.context.known_hosts {
            return hosts.clone();
        }
        if !HOST_SCOPED.contains(&category) {
            return Vec::new();
        }
        match self.call("/hosts", self.backend.list_hosts()).await {
            Ok(hosts) => hosts,
            Err(e) => {
                tracing::debug!(error = %e, "host list unavailable for hostname matching");
                Vec::new()
            }
        }
    }

    async fn health(&self) -> BackendResult<QueryResult> {
        let health = self.call("/health", self.backend.health()).await?;
        let message = if health.is_healthy() {
            format!(
                "The FleetPulse backend is healthy (database: {}).",
                or_unknown(&health.database)
            )
        } else {
            format!(
                "The FleetPulse backend reports status '{}' (database: {}).",
                health.status,
                or_unknown(&health.database)
            )
        };
        Ok(QueryResult::answered(
            HEALTH_STATUS,
            message,
            Some(to_value(&health)),
            suggestions(&[
                "Show fleet statistics",
                "List all hosts",
                "Which hosts were updated recently?",
            ]),
        ))
    }

    async fn statistics(&self, as_report: bool) -> BackendResult<QueryResult> {
        let stats = self.call("/statistics", self.backend.statistics()).await?;
        let mut message = format!(
            "The fleet has {} hosts with {} recorded updates, {} of them in the last 30 days.",
            stats.total_hosts, stats.total_updates, stats.recent_updates
        );
        if let Some(top) = stats.top_packages.first() {
            message.push_str(&format!(
                " The most frequently updated package is {} ({} updates).",
                top.name, top.count
            ));
        }

        let (category, message) = if as_report {
            (REPORT_GENERATION, format!("Fleet report: {message}"))
        } else {
            (STATISTICS_OVERVIEW, message)
        };
        Ok(QueryResult::answered(
            category,
            message,
            Some(to_value(&stats)),
            suggestions(&[
                "Which hosts were updated recently?",
                "Show the top updated packages",
                "Is the system healthy?",
            ]),
        ))
    }

    async fn hosts(&self) -> BackendResult<QueryResult> {
        let follow_ups = suggestions(&[
            "Show recent updates for a specific host",
            "Show fleet statistics",
            "Is the system healthy?",
        ]);

        let latest = match self.call("/last-updates", self.backend.last_updates()).await {
            Ok(latest) => latest,
            Err(e) => {
                tracing::debug!(error = %e, "last-updates unavailable, falling back to host list");
                Vec::new()
            }
        };

        if let Some(newest) = latest.iter().max_by_key(|h| h.last_update) {
            let message = format!(
                "Tracking {} hosts. Most recently updated: {} on {}.",
                latest.len(),
                newest.hostname,
                newest.last_update
            );
            return Ok(QueryResult::answered(
                HOST_MANAGEMENT,
                message,
                Some(json!({ "hosts": latest })),
                follow_ups,
            ));
        }

        let hosts = self.call("/hosts", self.backend.list_hosts()).await?;
        let message = if hosts.is_empty() {
            "No hosts have reported updates yet.".to_string()
        } else {
            format!("Tracking {} hosts: {}.", hosts.len(), hosts.join(", "))
        };
        Ok(QueryResult::answered(
            HOST_MANAGEMENT,
            message,
            Some(json!({ "hosts": hosts })),
            follow_ups,
        ))
    }

    async fn updates(
        &self,
        entities: &ExtractedEntities,
        known_hosts: &[String],
        today: NaiveDate,
    ) -> BackendResult<QueryResult> {
        let window = &entities.time_window;

        let Some(host) = entities.hostname.as_deref() else {
            let stats = self.call("/statistics", self.backend.statistics()).await?;
            // Without a timeline only the backend's 30-day figure is known.
            let (count, counted) = match updates_within(&stats, window, today) {
                Some(count) => (count, window.clone()),
                None => (stats.recent_updates, TimeWindow::default_window()),
            };
            let mut message = match count {
                1 => format!(
                    "1 update was recorded across {} hosts {}.",
                    stats.total_hosts,
                    span(&counted)
                ),
                n => format!(
                    "{n} updates were recorded across {} hosts {}.",
                    stats.total_hosts,
                    span(&counted)
                ),
            };
            if let Some(busiest) = stats.host_activity.first() {
                message.push_str(&format!(
                    " The most active host is {} ({} updates, last on {}).",
                    busiest.hostname, busiest.count, busiest.last_update
                ));
            }
            let mut data = recent_activity(&stats);
            data["window_days"] = json!(counted.days);
            data["window_updates"] = json!(count);
            return Ok(QueryResult::answered(
                UPDATE_TRACKING,
                message,
                Some(data),
                host_suggestions("Show recent updates for", known_hosts),
            ));
        };

        let mut query = HistoryQuery::since(window.start_date(today));
        query.date_to = Some(today);
        if let Some(package) = &entities.package {
            query = query.with_package(package.clone());
        }
        let endpoint = format!("/history/{host}");
        let page = self
            .call(&endpoint, self.backend.host_history(host, &query))
            .await?;

        let scope = match &entities.package {
            Some(package) => format!(" to packages matching '{package}'"),
            None => String::new(),
        };
        let message = if page.total == 0 {
            format!("No updates{scope} were recorded for {host} {}.", span(window))
        } else {
            format!(
                "{host} received {} update(s){scope} {}. Latest: {}.",
                page.total,
                span(window),
                describe_updates(&page.items)
            )
        };
        Ok(QueryResult::answered(
            UPDATE_TRACKING,
            message,
            Some(to_value(&page)),
            suggestions(&[
                &format!("Show the full history of {host}"),
                "Show fleet statistics",
                "Which packages are updated most often?",
            ]),
        ))
    }

    async fn history(
        &self,
        entities: &ExtractedEntities,
        known_hosts: &[String],
        today: NaiveDate,
    ) -> BackendResult<QueryResult> {
        let Some(host) = entities.hostname.as_deref() else {
            return Ok(QueryResult::answered(
                HISTORICAL_DATA,
                "Which host's history would you like to see? Mention a hostname in your question.",
                None,
                host_suggestions("Show the history of", known_hosts),
            ));
        };

        let window = &entities.time_window;
        let mut query = HistoryQuery::since(window.start_date(today));
        query.date_to = Some(today);
        let endpoint = format!("/history/{host}");
        let page = self
            .call(&endpoint, self.backend.host_history(host, &query))
            .await?;

        let message = if page.total == 0 {
            format!("{host} has no recorded updates {}.", span(window))
        } else {
            format!(
                "{host} has {} recorded update(s) {}. Most recent: {}.",
                page.total,
                span(window),
                describe_updates(&page.items)
            )
        };
        Ok(QueryResult::answered(
            HISTORICAL_DATA,
            message,
            Some(to_value(&page)),
            suggestions(&[
                &format!("Show recent updates for {host}"),
                "List all hosts",
                "Show fleet statistics",
            ]),
        ))
    }

    async fn packages(&self, entities: &ExtractedEntities) -> BackendResult<QueryResult> {
        let Some(package) = entities.package.as_deref() else {
            return Ok(QueryResult::answered(
                PACKAGE_TRACKING,
                "Which package are you interested in? Quote its name, e.g. \"openssl\".",
                None,
                suggestions(&[
                    "When was \"openssl\" last updated?",
                    "Show the top updated packages",
                ]),
            ));
        };

        if let Some(host) = entities.hostname.as_deref() {
            let query = HistoryQuery::default().with_package(package);
            let endpoint = format!("/history/{host}");
            let page = self
                .call(&endpoint, self.backend.host_history(host, &query))
                .await?;
            let message = match page.items.first() {
                Some(latest) => format!(
                    "{host} has {} update(s) of packages matching '{package}'. Latest: {}.",
                    page.total,
                    describe_update(latest)
                ),
                None => format!("No updates of '{package}' are recorded for {host}."),
            };
            return Ok(QueryResult::answered(
                PACKAGE_TRACKING,
                message,
                Some(to_value(&page)),
                suggestions(&[
                    &format!("Show the history of {host}"),
                    &format!("Which hosts updated {package}?"),
                ]),
            ));
        }

        let stats = self.call("/statistics", self.backend.statistics()).await?;
        let needle = package.to_lowercase();
        let matches: Vec<_> = stats
            .top_packages
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect();
        let message = match matches.first() {
            Some(top) => format!(
                "{} has been updated {} time(s) across the fleet.",
                top.name, top.count
            ),
            None => format!("'{package}' is not among the most frequently updated packages."),
        };
        Ok(QueryResult::answered(
            PACKAGE_TRACKING,
            message,
            Some(json!({ "package": package, "matches": matches })),
            suggestions(&[
                &format!("Show updates of {package} on a specific host"),
                "Show the top updated packages",
                "Show fleet statistics",
            ]),
        ))
    }
}

/// Recognised category with no dedicated handler.
fn unhandled(category: &str, fallback: Vec<String>) -> QueryResult {
    QueryResult::answered(
        category,
        format!("I detected category '{category}' but have no specific handler for it yet."),
        None,
        fallback,
    )
}

fn apology(classification: &ClassificationResult, error: &BackendError) -> QueryResult {
    let reason = match error {
        BackendError::Timeout(_) => "the fleet backend took too long to respond",
        BackendError::Status { status, .. } if *status < 500 => "the fleet backend rejected the request",
        _ => "the fleet backend is unavailable",
    };
    QueryResult::failed(
        classification.category.clone(),
        format!("Sorry, I couldn't retrieve that information: {reason}."),
        suggestions(&[
            "Try again in a moment",
            "Is the system healthy?",
            "Check that the FleetPulse backend is running",
        ]),
    )
    .with_classification(classification.clone())
}

/// Updates the statistics timeline records inside `window`, or `None` when
/// the backend reported no timeline.
fn updates_within(stats: &FleetStatistics, window: &TimeWindow, today: NaiveDate) -> Option<u64> {
    if stats.updates_timeline.is_empty() {
        return None;
    }
    let start = window.start_date(today);
    Some(
        stats
            .updates_timeline
            .iter()
            .filter(|p| p.date >= start && p.date <= today)
            .map(|p| p.count)
            .sum(),
    )
}

/// "in the last 3 days", "yesterday", "today".
fn span(window: &TimeWindow) -> String {
    if window.description.starts_with("the ") {
        format!("in {}", window.description)
    } else {
        window.description.clone()
    }
}

fn recent_activity(stats: &FleetStatistics) -> Value {
    json!({
        "recent_updates": stats.recent_updates,
        "total_hosts": stats.total_hosts,
        "host_activity": stats.host_activity,
        "updates_timeline": stats.updates_timeline,
    })
}

fn host_suggestions(prefix: &str, known_hosts: &[String]) -> Vec<String> {
    let mut out: Vec<String> = known_hosts
        .iter()
        .take(3)
        .map(|h| format!("{prefix} {h}"))
        .collect();
    if out.len() < 2 {
        out.push("List all hosts".into());
        out.push("Show fleet statistics".into());
    }
    out
}

fn describe_update(u: &PackageUpdate) -> String {
    format!(
        "{} {} → {} on {}",
        u.name, u.old_version, u.new_version, u.update_date
    )
}

fn describe_updates(items: &[PackageUpdate]) -> String {
    items
        .iter()
        .take(SUMMARY_ITEMS)
        .map(describe_update)
        .collect::<Vec<_>>()
        .join("; ")
}

fn suggestions(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn or_unknown(s: &str) -> &str {
    if s.is_empty() { "unknown" } else { s }
}

fn to_value<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
