//! Offline generation of routing artifacts from an API description.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};

use fp_protocol::routing::RoutingConfig;
use fp_router::emitter::{render_config_json, render_dispatch_source, render_rule_summary};
use fp_router::{SpecSource, TemplateTable, build_routing_config, load_spec};

pub const CONFIG_FILE: &str = "routing-config.json";
pub const SOURCE_FILE: &str = "generated_router.rs";
pub const SUMMARY_FILE: &str = "ROUTING.md";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Routing config document only.
    Json,
    /// Standalone Rust dispatch source only.
    Rust,
    Both,
}

impl OutputFormat {
    fn json(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }

    fn rust(self) -> bool {
        matches!(self, OutputFormat::Rust | OutputFormat::Both)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "fp-routegen")]
#[command(about = "Generate intent-routing rules from an OpenAPI description", long_about = None)]
pub struct Args {
    /// URL or file path of the API description.
    #[arg(short, long)]
    pub spec: String,

    /// Directory the artifacts are written to.
    #[arg(short, long, default_value = "generated")]
    pub output: PathBuf,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Both)]
    pub format: OutputFormat,

    /// Fetch timeout for URL descriptions, in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

/// What one generation run produced.
#[derive(Debug)]
pub struct GenerationReport {
    pub rules: usize,
    pub endpoints: usize,
    pub files: Vec<PathBuf>,
}

/// Load the description, synthesize rules, and write the requested artifacts.
/// `ROUTING.md` is always written.
pub async fn generate(args: &Args) -> anyhow::Result<GenerationReport> {
    let source = SpecSource::parse(&args.spec);
    let spec = load_spec(&source, Duration::from_secs(args.timeout_secs))
        .await
        .with_context(|| format!("loading API description from {source}"))?;

    let config = build_routing_config(&spec, &TemplateTable::fleet_defaults());
    if config.rules.is_empty() {
        tracing::warn!(source = %source, "API description produced no routing rules");
    }

    let files = write_artifacts(&config, &args.output, args.format).await?;
    tracing::info!(
        rules = config.rules.len(),
        files = files.len(),
        output = %args.output.display(),
        "routing artifacts written"
    );

    Ok(GenerationReport {
        rules: config.rules.len(),
        endpoints: config.metadata.total_endpoints,
        files,
    })
}

/// Render and write `config` into `dir`, creating it if needed.
pub async fn write_artifacts(
    config: &RoutingConfig,
    dir: &Path,
    format: OutputFormat,
) -> anyhow::Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating {}", dir.display()))?;

    let mut outputs: Vec<(&str, String)> = Vec::new();
    if format.json() {
        outputs.push((CONFIG_FILE, render_config_json(config)?));
    }
    if format.rust() {
        outputs.push((SOURCE_FILE, render_dispatch_source(config)));
    }
    outputs.push((SUMMARY_FILE, render_rule_summary(config)));

    let mut written = Vec::with_capacity(outputs.len());
    for (name, contents) in outputs {
        let path = dir.join(name);
        tokio::fs::write(&path, contents)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::debug!(path = %path.display(), "artifact written");
        written.push(path);
    }
    Ok(written)
}
