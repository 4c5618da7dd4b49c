//! Runtime classifier — first matching rule in priority order wins.

use std::sync::Arc;

use fp_protocol::query::ClassificationResult;
use fp_protocol::routing::{RoutingConfig, RoutingRule};

use crate::matcher::{IntentPattern, contains_term, normalize_query};

/// A routing config with its intent patterns compiled.
///
/// Read-only once built; share it behind an `Arc` across concurrent queries.
#[derive(Debug)]
pub struct Classifier {
    config: Arc<RoutingConfig>,
    /// Compiled patterns, parallel to `config.rules`.
    patterns: Vec<Vec<IntentPattern>>,
}

impl Classifier {
    pub fn new(config: RoutingConfig) -> Self {
        Self::from_arc(Arc::new(config))
    }

    pub fn from_arc(config: Arc<RoutingConfig>) -> Self {
        let patterns = config
            .rules
            .iter()
            .map(|rule| {
                rule.intent_patterns
                    .iter()
                    .filter_map(|template| match IntentPattern::compile(template) {
                        Ok(p) => Some(p),
                        Err(e) => {
                            tracing::warn!(
                                category = %rule.category,
                                template = %template,
                                error = %e,
                                "skipping uncompilable intent pattern"
                            );
                            None
                        }
                    })
                    .collect()
            })
            .collect();

        Self { config, patterns }
    }

    pub fn config(&self) -> &Arc<RoutingConfig> {
        &self.config
    }

    /// Classify a raw query. `None` means "unknown", not an error.
    pub fn classify(&self, query: &str) -> Option<ClassificationResult> {
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            return None;
        }
        self.config
            .rules
            .iter()
            .zip(&self.patterns)
            .find_map(|(rule, patterns)| evaluate(rule, patterns, &normalized))
    }

    /// Every matching rule, in evaluation order.
    pub fn classify_all(&self, query: &str) -> Vec<ClassificationResult> {
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            return Vec::new();
        }
        self.config
            .rules
            .iter()
            .zip(&self.patterns)
            .filter_map(|(rule, patterns)| evaluate(rule, patterns, &normalized))
            .collect()
    }
}

/// (keyword present OR pattern matches) AND NOT negative keyword present.
fn evaluate(
    rule: &RoutingRule,
    patterns: &[IntentPattern],
    normalized: &str,
) -> Option<ClassificationResult> {
    if rule
        .negative_keywords
        .iter()
        .any(|k| contains_term(normalized, k))
    {
        return None;
    }

    let matched_keywords: Vec<String> = rule
        .keywords
        .iter()
        .filter(|k| contains_term(normalized, k))
        .cloned()
        .collect();

    if matched_keywords.is_empty() && !patterns.iter().any(|p| p.is_match(normalized)) {
        return None;
    }

    Some(ClassificationResult {
        category: rule.category.clone(),
        confidence: rule.confidence,
        matched_keywords,
        endpoints: rule.endpoint_ids(),
    })
}
