//! API description ingestion and endpoint extraction.
//!
//! Only the subset the router consumes is modelled, and every field is
//! optional: a description with missing summaries, tags, or even a missing
//! `paths` object still loads.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use fp_protocol::endpoint::{EndpointDescriptor, HttpMethod, ParameterDescriptor};

use crate::error::{RouterError, RouterResult};

/// Parsed API description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiSpec {
    #[serde(default)]
    pub info: Option<SpecInfo>,
    #[serde(default)]
    pub paths: Option<BTreeMap<String, PathItem>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpecInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// Operations under one path. Other keys (`parameters`, `servers`, ...) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub get: Option<Operation>,
    #[serde(default)]
    pub post: Option<Operation>,
    #[serde(default)]
    pub put: Option<Operation>,
    #[serde(default)]
    pub delete: Option<Operation>,
    #[serde(default)]
    pub patch: Option<Operation>,
}

impl PathItem {
    fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Operation {
    #[serde(default, rename = "operationId")]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub parameters: Option<Vec<RawParameter>>,
}

/// A parameter entry as written. `$ref` entries have no name and are skipped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawParameter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "in")]
    pub location: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ApiSpec {
    pub fn from_json_str(json: &str) -> RouterResult<Self> {
        serde_json::from_str(json).map_err(|e| RouterError::Parse(e.to_string()))
    }

    /// Declared `info.version`, if any.
    pub fn version(&self) -> Option<&str> {
        self.info.as_ref()?.version.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.info.as_ref()?.title.as_deref()
    }
}

/// Where to read an API description from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecSource {
    Url(String),
    File(PathBuf),
}

impl SpecSource {
    /// `http://` and `https://` locations are URLs; anything else is a file path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            SpecSource::Url(trimmed.to_string())
        } else {
            SpecSource::File(PathBuf::from(trimmed))
        }
    }
}

impl std::fmt::Display for SpecSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecSource::Url(url) => f.write_str(url),
            SpecSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Load and parse an API description from a URL or file.
pub async fn load_spec(source: &SpecSource, timeout: Duration) -> RouterResult<ApiSpec> {
    let body = match source {
        SpecSource::Url(url) => fetch_url(url, timeout).await?,
        SpecSource::File(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RouterError::Io(format!("{}: {e}", path.display())))?,
    };

    let spec = ApiSpec::from_json_str(&body)?;
    tracing::debug!(
        source = %source,
        version = spec.version().unwrap_or("-"),
        "API description loaded"
    );
    Ok(spec)
}

async fn fetch_url(url: &str, timeout: Duration) -> RouterResult<String> {
    let fetch_err = |e: reqwest::Error| RouterError::Fetch {
        url: url.to_string(),
        message: e.to_string(),
    };

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(fetch_err)?;

    let response = client.get(url).send().await.map_err(fetch_err)?;
    if !response.status().is_success() {
        return Err(RouterError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }
    response.text().await.map_err(fetch_err)
}

/// Flatten the path/method tree into one descriptor per operation.
///
/// Paths are visited in key order and methods in [`HttpMethod::ALL`] order.
pub fn extract_endpoints(spec: &ApiSpec) -> Vec<EndpointDescriptor> {
    let Some(paths) = &spec.paths else {
        return Vec::new();
    };

    let mut endpoints = Vec::new();
    for (path, item) in paths {
        for method in HttpMethod::ALL {
            let Some(op) = item.operation(method) else {
                continue;
            };
            endpoints.push(EndpointDescriptor {
                path: path.clone(),
                method,
                operation_id: op.operation_id.clone(),
                summary: op.summary.clone(),
                description: op.description.clone(),
                tags: op.tags.clone().unwrap_or_default(),
                parameters: op
                    .parameters
                    .iter()
                    .flatten()
                    .filter_map(to_parameter)
                    .collect(),
            });
        }
    }
    endpoints
}

fn to_parameter(raw: &RawParameter) -> Option<ParameterDescriptor> {
    Some(ParameterDescriptor {
        name: raw.name.clone()?,
        location: raw.location.clone().unwrap_or_else(|| "query".into()),
        required: raw.required.unwrap_or(false),
        description: raw.description.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = r##"{
        "openapi": "3.0.0",
        "info": {"title": "FleetPulse", "version": "1.2.0"},
        "paths": {
            "/health": {
                "get": {"operationId": "health_check", "summary": "Health check", "tags": ["health"]}
            },
            "/history/{hostname}": {
                "parameters": [{"name": "shared", "in": "query"}],
                "get": {
                    "summary": "Host history",
                    "parameters": [
                        {"name": "hostname", "in": "path", "required": true},
                        {"name": "limit", "in": "query", "description": "Page size"},
                        {"$ref": "#/components/parameters/Offset"}
                    ]
                }
            },
            "/report": {
                "post": {"summary": "Ingest report"},
                "options": {"summary": "CORS"}
            }
        }
    }"##;

    #[test]
    fn extracts_one_descriptor_per_operation() {
        let spec = ApiSpec::from_json_str(SPEC).unwrap();
        let endpoints = extract_endpoints(&spec);
        assert_eq!(endpoints.len(), 3);

        let health = &endpoints[0];
        assert_eq!(health.path, "/health");
        assert_eq!(health.method, HttpMethod::Get);
        assert_eq!(health.operation_id.as_deref(), Some("health_check"));
        assert_eq!(health.tags, vec!["health"]);
    }

    #[test]
    fn parameters_carried_verbatim_and_refs_skipped() {
        let spec = ApiSpec::from_json_str(SPEC).unwrap();
        let endpoints = extract_endpoints(&spec);
        let history = endpoints.iter().find(|e| e.path == "/history/{hostname}").unwrap();

        assert_eq!(history.parameters.len(), 2);
        assert_eq!(history.parameters[0].name, "hostname");
        assert_eq!(history.parameters[0].location, "path");
        assert!(history.parameters[0].required);
        assert_eq!(history.parameters[1].description.as_deref(), Some("Page size"));
    }

    #[test]
    fn non_routable_methods_ignored() {
        let spec = ApiSpec::from_json_str(SPEC).unwrap();
        let endpoints = extract_endpoints(&spec);
        let report: Vec<_> = endpoints.iter().filter(|e| e.path == "/report").collect();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].method, HttpMethod::Post);
    }

    #[test]
    fn missing_paths_yields_nothing() {
        let spec = ApiSpec::from_json_str(r#"{"info": {"title": "empty"}}"#).unwrap();
        assert!(extract_endpoints(&spec).is_empty());
        assert!(spec.version().is_none());

        let spec = ApiSpec::from_json_str(r#"{"paths": null}"#).unwrap();
        assert!(extract_endpoints(&spec).is_empty());
    }

    #[test]
    fn version_read_from_info() {
        let spec = ApiSpec::from_json_str(SPEC).unwrap();
        assert_eq!(spec.version(), Some("1.2.0"));
        assert_eq!(spec.title(), Some("FleetPulse"));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = ApiSpec::from_json_str("not json").unwrap_err();
        assert!(matches!(err, RouterError::Parse(_)));
    }

    #[test]
    fn source_kind_from_location() {
        assert_eq!(
            SpecSource::parse("https://fleet.example.com/openapi.json"),
            SpecSource::Url("https://fleet.example.com/openapi.json".into())
        );
        assert_eq!(
            SpecSource::parse("./openapi.json"),
            SpecSource::File(PathBuf::from("./openapi.json"))
        );
    }

    #[tokio::test]
    async fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("openapi.json");
        std::fs::write(&path, SPEC).unwrap();

        let spec = load_spec(&SpecSource::File(path), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(extract_endpoints(&spec).len(), 3);
    }

    #[tokio::test]
    async fn load_missing_file_is_io_error() {
        let err = load_spec(
            &SpecSource::File(PathBuf::from("/nonexistent/openapi.json")),
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RouterError::Io(_)));
    }

    #[tokio::test]
    async fn load_from_url() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/openapi.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SPEC))
            .mount(&server)
            .await;

        let source = SpecSource::Url(format!("{}/openapi.json", server.uri()));
        let spec = load_spec(&source, Duration::from_secs(2)).await.unwrap();
        assert_eq!(spec.version(), Some("1.2.0"));
    }

    #[tokio::test]
    async fn load_from_url_non_success_status() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = SpecSource::Url(format!("{}/openapi.json", server.uri()));
        let err = load_spec(&source, Duration::from_secs(2)).await.unwrap_err();
        assert!(matches!(err, RouterError::Status { status: 503, .. }));
    }
}
