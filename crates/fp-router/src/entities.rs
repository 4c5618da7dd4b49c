//! Entity extraction — hostname, package name, and relative time window.

use std::sync::LazyLock;

use chrono::{Days, NaiveDate};
use regex::Regex;
use serde::Serialize;

use crate::matcher::{contains_term, normalize_query};

/// Window used when a query names no recognisable time span.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

static RE_DOUBLE_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).unwrap());

// Single quotes only count when they open a word, so "what's" is not a quote.
static RE_SINGLE_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)'([^'\s][^']*)'").unwrap());

static RE_PACKAGE_TEMPLATES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"\bpackage\s+([a-z0-9][\w.+-]*)").unwrap(),
        Regex::new(r"([a-z0-9][\w.+-]*)\s+package\b").unwrap(),
        Regex::new(r"\babout\s+([a-z0-9][\w.+-]*)").unwrap(),
    ]
});

static RE_DAYS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d+)\s*days?\b").unwrap());
static RE_WEEKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d+)\s*weeks?\b").unwrap());

/// Words a package template may capture that are never package names.
const PACKAGE_STOP_WORDS: &[&str] = &[
    "the", "this", "that", "which", "what", "any", "all", "each", "every", "some", "one", "updates",
    "update", "updated", "version", "versions", "names", "name", "list", "info", "for", "was",
    "were", "has", "have", "been",
];

/// Literal phrases and the window they denote, checked in order.
const LITERAL_WINDOWS: &[(&[&str], u32, &str)] = &[
    (&["today"], 0, "today"),
    (&["yesterday"], 1, "yesterday"),
    (&["last day", "past day"], 1, "the last day"),
    (&["last week", "past week"], 7, "the last week"),
    (&["last month", "past month"], 30, "the last month"),
];

/// A relative look-back window ending today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub days: u32,
    pub description: String,
}

impl TimeWindow {
    pub fn new(days: u32, description: impl Into<String>) -> Self {
        Self {
            days,
            description: description.into(),
        }
    }

    /// The default look-back applied when nothing in the query names a span.
    pub fn default_window() -> Self {
        Self::new(DEFAULT_WINDOW_DAYS, format!("the last {DEFAULT_WINDOW_DAYS} days"))
    }

    /// First day covered by the window.
    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(Days::new(u64::from(self.days)))
            .unwrap_or(NaiveDate::MIN)
    }
}

/// Everything pulled out of one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedEntities {
    pub hostname: Option<String>,
    pub package: Option<String>,
    pub time_window: TimeWindow,
}

/// Run every extractor over `query`.
pub fn extract_entities(query: &str, known_hosts: &[String]) -> ExtractedEntities {
    let normalized = normalize_query(query);
    let hostname = extract_hostname(&normalized, known_hosts);

    // A capture that is (part of) a hostname names the host, not a package.
    let hosts: Vec<String> = known_hosts
        .iter()
        .chain(hostname.as_ref())
        .map(|h| h.to_lowercase())
        .collect();
    let package = package_candidates(&normalized)
        .into_iter()
        .find(|name| !hosts.iter().any(|h| h.contains(&name.to_lowercase())));

    ExtractedEntities {
        hostname,
        package,
        time_window: extract_time_window(&normalized),
    }
}

/// Match a known hostname: whole name first, then any name token longer
/// than two characters split on `-`, `.`, `_`.
pub fn extract_hostname(query: &str, known_hosts: &[String]) -> Option<String> {
    let query = query.to_lowercase();

    if let Some(host) = known_hosts
        .iter()
        .find(|h| !h.is_empty() && query.contains(&h.to_lowercase()))
    {
        return Some(host.clone());
    }

    known_hosts
        .iter()
        .find(|host| {
            host.to_lowercase()
                .split(['-', '.', '_'])
                .filter(|token| token.chars().count() > 2)
                .any(|token| contains_term(&query, token))
        })
        .cloned()
}

/// A quoted name, else the first capture of "package X", "X package",
/// "about X" longer than two characters.
pub fn extract_package(query: &str) -> Option<String> {
    package_candidates(query).into_iter().next()
}

/// Every usable package capture, best first.
fn package_candidates(query: &str) -> Vec<String> {
    let mut out = Vec::new();
    for re in [&*RE_DOUBLE_QUOTED, &*RE_SINGLE_QUOTED] {
        if let Some(caps) = re.captures(query) {
            let quoted = caps[1].trim();
            if !quoted.is_empty() {
                out.push(quoted.to_string());
            }
        }
    }

    for re in RE_PACKAGE_TEMPLATES.iter() {
        for caps in re.captures_iter(query) {
            let name = caps[1].trim_end_matches(['.', '-', '+']);
            if name.chars().count() > 2 && !PACKAGE_STOP_WORDS.contains(&name) {
                out.push(name.to_string());
            }
        }
    }
    out
}

/// Literal spans first, then "<N> day(s)" / "<N> week(s)", else 30 days.
pub fn extract_time_window(query: &str) -> TimeWindow {
    let query = query.to_lowercase();

    for (phrases, days, description) in LITERAL_WINDOWS {
        if phrases.iter().any(|p| query.contains(p)) {
            return TimeWindow::new(*days, *description);
        }
    }

    if let Some(n) = capture_number(&RE_DAYS, &query) {
        return match n {
            1 => TimeWindow::new(1, "the last day"),
            n => TimeWindow::new(n, format!("the last {n} days")),
        };
    }

    if let Some(n) = capture_number(&RE_WEEKS, &query) {
        return match n {
            1 => TimeWindow::new(7, "the last week"),
            n => TimeWindow::new(n.saturating_mul(7), format!("the last {n} weeks")),
        };
    }

    TimeWindow::default_window()
}

fn capture_number(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}
