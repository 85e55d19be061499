//! querybench - concurrent SQL query benchmarking tool

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use querybench_backend::PgBackend;
use querybench_core::HarnessBuilder;
use querybench_source::CsvQuerySource;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let source = CsvQuerySource::open(&cli.file)
        .with_context(|| format!("failed to open query file {}", cli.file.display()))?;
    let backend = Arc::new(PgBackend::new(cli.database_url));

    let harness = HarnessBuilder::new()
        .lanes(cli.workers)
        .backend(backend)
        .source(Box::new(source))
        .build()?;

    let report = harness.run().await?;

    println!("Total: {}", report.summary.count);
    println!("Median: {:.2}", report.summary.median_ms);
    println!("Mean: {:.2}", report.summary.mean_ms);
    println!("Min: {:.2}", report.summary.min_ms);
    println!("Max: {:.2}", report.summary.max_ms);

    Ok(())
}
