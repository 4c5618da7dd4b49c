//! Pattern grouping — attach semantic tags to endpoints and group by tag.

use std::collections::HashMap;

use fp_protocol::endpoint::{EndpointDescriptor, HttpMethod};

/// Words searched for in an endpoint's summary and description.
pub const VOCABULARY: &[&str] = &[
    "health",
    "status",
    "statistics",
    "stats",
    "hosts",
    "packages",
    "updates",
    "history",
    "reports",
    "monitoring",
    "metrics",
];

/// (method, any of these path substrings, tag)
const PATH_HEURISTICS: &[(HttpMethod, &[&str], &str)] = &[
    (HttpMethod::Get, &["health"], "health"),
    (HttpMethod::Get, &["stat", "statistic"], "statistics"),
    (HttpMethod::Get, &["history"], "history"),
    (HttpMethod::Get, &["report"], "reports"),
];

/// All descriptors sharing one pattern tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternGroup {
    pub tag: String,
    pub endpoints: Vec<EndpointDescriptor>,
}

/// Lower-cased pattern tags for one endpoint, de-duplicated in first-seen order.
pub fn pattern_tags(endpoint: &EndpointDescriptor) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let mut push = |tag: &str| {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    };

    for tag in &endpoint.tags {
        push(tag);
    }

    for segment in endpoint.path.split('/') {
        if !segment.is_empty() && !is_path_parameter(segment) {
            push(segment);
        }
    }

    let path = endpoint.path.to_lowercase();
    for (method, needles, tag) in PATH_HEURISTICS {
        if endpoint.method == *method && needles.iter().any(|n| path.contains(n)) {
            push(tag);
        }
    }

    let text = endpoint.documentation_text().to_lowercase();
    if !text.is_empty() {
        for word in VOCABULARY {
            if text.contains(word) {
                push(word);
            }
        }
    }

    tags
}

fn is_path_parameter(segment: &str) -> bool {
    segment.starts_with('{') && segment.ends_with('}')
}

/// Group endpoints by pattern tag. Groups appear in the order their tag was
/// first seen; an endpoint may sit in several groups, or in none.
pub fn group_by_pattern(endpoints: &[EndpointDescriptor]) -> Vec<PatternGroup> {
    let mut groups: Vec<PatternGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for endpoint in endpoints {
        for tag in pattern_tags(endpoint) {
            let slot = *index.entry(tag.clone()).or_insert_with(|| {
                groups.push(PatternGroup {
                    tag,
                    endpoints: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].endpoints.push(endpoint.clone());
        }
    }

    groups
}
