//! Ragline ingestion CLI
//!
//! Ingests one document into the vector index:
//!
//!   ingest [path]
//!
//! The positional path overrides `ingestion.default_document` from
//! configuration. Exits non-zero when configuration is invalid or the
//! document cannot be read.

use anyhow::{bail, Context};
use ragline_common::{config::AppConfig, embeddings, store, VERSION};
use ragline_ingestion::IngestionPipeline;
use std::path::PathBuf;
use tracing::{error, info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(true)
        .json()
        .init();

    info!("Starting Ragline ingest v{}", VERSION);

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        anyhow::anyhow!(e)
    })?;
    config.validate().context("Invalid configuration")?;

    let path = match std::env::args().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => match &config.ingestion.default_document {
            Some(default) => PathBuf::from(default),
            None => bail!("Usage: ingest <path> (or set ingestion.default_document)"),
        },
    };

    if !path.is_file() {
        bail!("File not found: {}", path.display());
    }

    let embedder = embeddings::create_embedder(&config.embedding)?;
    let store = store::create_store(&config.vector_store)?;
    let pipeline = IngestionPipeline::new(embedder, store, config.vector_store.upsert_batch_size);

    let report = pipeline
        .ingest_path(&path, config.chunking.chunk_size)
        .await
        .with_context(|| format!("Failed to ingest {}", path.display()))?;

    info!(
        source_id = %report.source_id,
        chunks = report.chunk_count,
        upserted = report.upserted,
        "Ingestion complete"
    );
    println!(
        "Ingested {} chunks from '{}' ({} upserted)",
        report.chunk_count, report.source_id, report.upserted
    );

    Ok(())
}
