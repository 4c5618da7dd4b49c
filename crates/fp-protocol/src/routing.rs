//! Routing rules and the assembled routing config document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::endpoint::EndpointDescriptor;

/// One synthesized classifier unit: a category plus the phrasing that selects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingRule {
    /// Unique slug, e.g. `health_status`.
    pub category: String,
    /// Higher is evaluated first.
    pub priority: i32,
    pub keywords: Vec<String>,
    /// Wildcard templates; `*` stands for a run of word characters.
    pub intent_patterns: Vec<String>,
    /// Presence of any of these disqualifies the rule.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub negative_keywords: Vec<String>,
    /// Endpoints that justify the rule. Serialized as `{method, path}` only.
    #[serde(default, serialize_with = "serialize_endpoint_refs")]
    pub endpoints: Vec<EndpointDescriptor>,
    pub confidence: f64,
}

fn serialize_endpoint_refs<S>(endpoints: &[EndpointDescriptor], s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.collect_seq(endpoints.iter().map(EndpointDescriptor::to_ref))
}

impl RoutingRule {
    /// Identifiers of the contributing endpoints, in order.
    pub fn endpoint_ids(&self) -> Vec<String> {
        self.endpoints.iter().map(|e| e.identifier()).collect()
    }
}

/// Generation metadata stamped by the assembler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingMetadata {
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    pub total_endpoints: usize,
}

/// Immutable output of one synthesis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingConfig {
    /// Sorted by descending priority; ties keep synthesis order.
    pub rules: Vec<RoutingRule>,
    pub fallback_suggestions: Vec<String>,
    pub metadata: RoutingMetadata,
}

impl RoutingConfig {
    pub fn rule(&self, category: &str) -> Option<&RoutingRule> {
        self.rules.iter().find(|r| r.category == category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.category.as_str())
    }

    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
