//! Rule synthesis — one routing rule per category from grouped endpoints.

use std::collections::HashMap;

use fp_protocol::endpoint::EndpointDescriptor;
use fp_protocol::routing::RoutingRule;

use crate::patterns::PatternGroup;
use crate::templates::{RuleTemplate, TemplateTable};

const BASE_CONFIDENCE: f64 = 0.5;
const DOCUMENTED_BONUS: f64 = 0.2;
const TAGGED_BONUS: f64 = 0.1;
const SPECIFIC_BONUS: f64 = 0.2;

/// Build routing rules from pattern groups, in group order.
///
/// Tags that resolve to the same category fold into the first rule for that
/// category: the template of the first group wins and later groups only add
/// their endpoints.
pub fn synthesize_rules(groups: &[PatternGroup], table: &TemplateTable) -> Vec<RoutingRule> {
    let mut drafts: Vec<(RuleTemplate, Vec<EndpointDescriptor>)> = Vec::new();
    let mut by_category: HashMap<String, usize> = HashMap::new();

    for group in groups {
        if group.endpoints.is_empty() {
            continue;
        }
        let template = table.resolve(&group.tag);
        let slot = match by_category.get(&template.category) {
            Some(&slot) => slot,
            None => {
                by_category.insert(template.category.clone(), drafts.len());
                drafts.push((template, Vec::new()));
                drafts.len() - 1
            }
        };

        let endpoints = &mut drafts[slot].1;
        for endpoint in &group.endpoints {
            let known = endpoints
                .iter()
                .any(|e| e.method == endpoint.method && e.path == endpoint.path);
            if !known {
                endpoints.push(endpoint.clone());
            }
        }
    }

    drafts
        .into_iter()
        .map(|(template, endpoints)| rule_from_template(template, endpoints))
        .collect()
}

/// Turn a template plus its contributing endpoints into a rule.
pub fn rule_from_template(template: RuleTemplate, endpoints: Vec<EndpointDescriptor>) -> RoutingRule {
    let confidence = score_confidence(&endpoints, template.specific);
    tracing::debug!(
        category = %template.category,
        priority = template.priority,
        endpoints = endpoints.len(),
        confidence,
        "rule synthesized"
    );
    RoutingRule {
        category: template.category,
        priority: template.priority,
        keywords: template.keywords,
        intent_patterns: template.intent_patterns,
        negative_keywords: template.negative_keywords,
        endpoints,
        confidence,
    }
}

/// Documentation-quality score in [0, 1].
///
/// 0.5 base, +0.2 if any endpoint is documented, +0.1 if any endpoint is
/// tagged, +0.2 for a specific category. Rounded to two decimals.
pub fn score_confidence(endpoints: &[EndpointDescriptor], specific: bool) -> f64 {
    let mut score = BASE_CONFIDENCE;
    if endpoints.iter().any(EndpointDescriptor::is_documented) {
        score += DOCUMENTED_BONUS;
    }
    if endpoints.iter().any(|e| !e.tags.is_empty()) {
        score += TAGGED_BONUS;
    }
    if specific {
        score += SPECIFIC_BONUS;
    }
    (score.min(1.0) * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::group_by_pattern;
    use crate::templates::{HEALTH_STATUS, STATISTICS_OVERVIEW};
    use fp_protocol::endpoint::HttpMethod;

    fn documented(path: &str, tag: Option<&str>) -> EndpointDescriptor {
        let mut ep = EndpointDescriptor::new(HttpMethod::Get, path);
        ep.summary = Some(format!("Get {path}"));
        ep.tags = tag.map(|t| vec![t.to_string()]).unwrap_or_default();
        ep
    }

    #[test]
    fn confidence_components() {
        let bare = EndpointDescriptor::new(HttpMethod::Get, "/x");
        assert_eq!(score_confidence(std::slice::from_ref(&bare), false), 0.5);
        assert_eq!(score_confidence(&[documented("/x", None)], false), 0.7);
        assert_eq!(score_confidence(&[documented("/x", Some("x"))], false), 0.8);
        assert_eq!(score_confidence(&[documented("/x", Some("x"))], true), 1.0);
        assert_eq!(score_confidence(&[], true), 0.7);
    }

    #[test]
    fn confidence_uses_any_endpoint() {
        let bare = EndpointDescriptor::new(HttpMethod::Get, "/a");
        let tagged = {
            let mut e = EndpointDescriptor::new(HttpMethod::Get, "/b");
            e.tags = vec!["b".into()];
            e
        };
        assert_eq!(score_confidence(&[bare, tagged], false), 0.6);
    }

    #[test]
    fn health_rule_from_tagged_endpoint() {
        let groups = group_by_pattern(&[documented("/health", Some("health"))]);
        let rules = synthesize_rules(&groups, &TemplateTable::fleet_defaults());

        assert_eq!(rules.len(), 1);
        let rule = &rules[0];
        assert_eq!(rule.category, HEALTH_STATUS);
        assert_eq!(rule.priority, 100);
        assert!(rule.confidence >= 0.9);
        assert_eq!(rule.endpoints.len(), 1);
    }

    #[test]
    fn aliased_tags_merge_into_one_rule() {
        let stats = documented("/statistics", None);
        let metrics = documented("/metrics", None);
        let groups = group_by_pattern(&[stats, metrics]);
        let rules = synthesize_rules(&groups, &TemplateTable::fleet_defaults());

        let stats_rules: Vec<_> = rules
            .iter()
            .filter(|r| r.category == STATISTICS_OVERVIEW)
            .collect();
        assert_eq!(stats_rules.len(), 1);
        assert_eq!(stats_rules[0].endpoints.len(), 2);
    }

    #[test]
    fn shared_endpoint_not_duplicated_within_rule() {
        // "/health" lands in both the "health" and "status" groups.
        let mut ep = documented("/health", Some("status"));
        ep.summary = Some("Service health".into());
        let groups = group_by_pattern(&[ep]);
        let rules = synthesize_rules(&groups, &TemplateTable::fleet_defaults());

        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].endpoints.len(), 1);
    }

    #[test]
    fn unknown_tag_gets_minimal_rule() {
        let groups = group_by_pattern(&[EndpointDescriptor::new(HttpMethod::Post, "/webhooks")]);
        let rules = synthesize_rules(&groups, &TemplateTable::fleet_defaults());

        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].category, "webhooks");
        assert_eq!(rules[0].priority, 30);
        assert_eq!(rules[0].confidence, 0.5);
    }

    #[test]
    fn empty_groups_make_no_rules() {
        let groups = vec![PatternGroup {
            tag: "health".into(),
            endpoints: vec![],
        }];
        assert!(synthesize_rules(&groups, &TemplateTable::fleet_defaults()).is_empty());
    }
}
