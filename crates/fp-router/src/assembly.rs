//! Routing config assembly — sort rules, derive fallbacks, stamp metadata.

use chrono::Utc;

use fp_protocol::routing::{RoutingConfig, RoutingMetadata, RoutingRule};

use crate::patterns::group_by_pattern;
use crate::spec::{ApiSpec, extract_endpoints};
use crate::synthesis::{rule_from_template, synthesize_rules};
use crate::templates::TemplateTable;

/// How many top rules contribute a fallback suggestion.
pub const MAX_FALLBACK_SUGGESTIONS: usize = 5;

/// Sort rules by descending priority (stable on ties) and wrap them in a config.
pub fn assemble(
    mut rules: Vec<RoutingRule>,
    api_version: Option<String>,
    total_endpoints: usize,
) -> RoutingConfig {
    rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    let fallback_suggestions = fallback_suggestions(&rules);

    RoutingConfig {
        rules,
        fallback_suggestions,
        metadata: RoutingMetadata {
            generated_at: Utc::now(),
            api_version,
            total_endpoints,
        },
    }
}

/// One suggestion per leading rule: its first endpoint's summary, else
/// "Check {first keyword}".
pub fn fallback_suggestions(rules: &[RoutingRule]) -> Vec<String> {
    rules
        .iter()
        .take(MAX_FALLBACK_SUGGESTIONS)
        .map(|rule| {
            let summary = rule
                .endpoints
                .first()
                .and_then(|e| e.summary.as_deref())
                .map(str::trim)
                .filter(|s| !s.is_empty());
            match summary {
                Some(summary) => summary.to_string(),
                None => format!(
                    "Check {}",
                    rule.keywords.first().unwrap_or(&rule.category)
                ),
            }
        })
        .collect()
}

/// Full pipeline: endpoints → pattern groups → rules → config.
///
/// A description with endpoints but no recognisable signal still yields a
/// usable config: the table's built-in rules stand in for the missing ones.
pub fn build_routing_config(spec: &ApiSpec, table: &TemplateTable) -> RoutingConfig {
    let endpoints = extract_endpoints(spec);
    let groups = group_by_pattern(&endpoints);
    let mut rules = synthesize_rules(&groups, table);

    if rules.is_empty() && !endpoints.is_empty() {
        tracing::warn!(
            endpoints = endpoints.len(),
            "no pattern tags found in API description, using built-in rules"
        );
        rules = builtin_rules(table);
    }

    let config = assemble(rules, spec.version().map(String::from), endpoints.len());
    tracing::info!(
        rules = config.rules.len(),
        endpoints = endpoints.len(),
        groups = groups.len(),
        "routing config assembled"
    );
    config
}

/// A config built from the template table alone, with no backing endpoints.
/// Used when the API description cannot be loaded.
pub fn builtin_config(table: &TemplateTable) -> RoutingConfig {
    assemble(builtin_rules(table), None, 0)
}

fn builtin_rules(table: &TemplateTable) -> Vec<RoutingRule> {
    table
        .templates()
        .into_iter()
        .map(|template| rule_from_template(template.clone(), Vec::new()))
        .collect()
}
