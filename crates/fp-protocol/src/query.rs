//! Runtime query request/response types.

use serde::{Deserialize, Serialize};

/// Category label reported when no rule matched.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Outcome of running a query through the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub category: String,
    pub confidence: f64,
    /// The rule's keywords that were actually present in the query.
    pub matched_keywords: Vec<String>,
    /// Identifiers of the endpoints that back this category.
    pub endpoints: Vec<String>,
}

/// Optional context supplied alongside a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryContext {
    /// Hostnames the caller already knows about, used for entity extraction.
    #[serde(default, alias = "known_hosts", skip_serializing_if = "Option::is_none")]
    pub known_hosts: Option<Vec<String>>,
}

/// Body of `POST /api/v1/query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub context: QueryContext,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            context: QueryContext::default(),
        }
    }
}

/// Response to a natural-language query. Every path, including failures,
/// produces one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    pub message: String,
    pub category: String,
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<ClassificationResult>,
}

impl QueryResult {
    /// A successful answer for `category`.
    pub fn answered(
        category: impl Into<String>,
        message: impl Into<String>,
        data: Option<serde_json::Value>,
        suggestions: Vec<String>,
    ) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
            category: category.into(),
            suggestions,
            classification: None,
        }
    }

    /// A well-formed failure for `category`.
    pub fn failed(
        category: impl Into<String>,
        message: impl Into<String>,
        suggestions: Vec<String>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
            category: category.into(),
            suggestions,
            classification: None,
        }
    }

    pub fn with_classification(mut self, classification: ClassificationResult) -> Self {
        self.classification = Some(classification);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_request_without_context() {
        let req: QueryRequest = serde_json::from_str(r#"{"query": "is the fleet up?"}"#).unwrap();
        assert_eq!(req.query, "is the fleet up?");
        assert!(req.context.known_hosts.is_none());
    }

    #[test]
    fn query_context_accepts_both_spellings() {
        let a: QueryContext = serde_json::from_str(r#"{"knownHosts": ["web-01"]}"#).unwrap();
        let b: QueryContext = serde_json::from_str(r#"{"known_hosts": ["web-01"]}"#).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn classification_uses_camel_case() {
        let c = ClassificationResult {
            category: "health_status".into(),
            confidence: 0.9,
            matched_keywords: vec!["health".into()],
            endpoints: vec!["GET /health".into()],
        };
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["matchedKeywords"][0], "health");
    }

    #[test]
    fn failed_result_omits_data_and_classification() {
        let r = QueryResult::failed(UNKNOWN_CATEGORY, "no idea", vec!["Check health".into()]);
        let json = serde_json::to_string(&r).unwrap();
        assert!(!json.contains("\"data\""));
        assert!(!json.contains("classification"));
        assert!(json.contains(r#""success":false"#));
    }
}
