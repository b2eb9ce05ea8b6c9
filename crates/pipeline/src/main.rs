//! Market Quote Pipeline - Main Entry Point

use pipeline::{init_logging, shutdown_signal, Pipeline, PipelineConfig};
use std::path::Path;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    info!("=== Market Quote Pipeline v{} ===", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args_os().nth(1) {
        Some(path) => PipelineConfig::load(Path::new(&path))?,
        None => PipelineConfig::default(),
    };
    info!(
        "Running for {:?} with a {}-slot buffer (Ctrl+C stops early)",
        config.run_duration(),
        config.buffer_capacity
    );

    let mut pipeline = Pipeline::start(config)?;
    let summary = pipeline.run_until(shutdown_signal()).await;

    println!("\n{}", summary);
    Ok(())
}
