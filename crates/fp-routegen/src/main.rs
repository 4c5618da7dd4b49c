//! `fp-routegen` — offline routing rule generator.
//!
//! ```text
//! fp-routegen --spec http://localhost:8000/openapi.json --output generated --format both
//! ```

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fp_routegen::{Args, generate};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let report = generate(&args).await?;

    println!(
        "Generated {} routing rule(s) from {} endpoint(s):",
        report.rules, report.endpoints
    );
    for path in &report.files {
        println!("  {}", path.display());
    }
    Ok(())
}
