//! Vector store adapter
//!
//! The store is an opaque external service reached through the
//! [`VectorStore`] trait: a Pinecone-shaped HTTP backend for deployments and
//! an in-memory implementation for tests. The caller must not assume the
//! store applies any score floor; filtering happens in the retriever.

mod http;
mod memory;

pub use http::HttpVectorStore;
pub use memory::MemoryVectorStore;

use crate::config::VectorStoreConfig;
use crate::errors::{AppError, Result};
use crate::types::VectorRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// A single similarity-search match, as returned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    pub score: f32,
    pub metadata: crate::types::VectorMetadata,
}

/// Index statistics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StoreStats {
    pub count: usize,
    pub dimension: usize,
}

/// Trait for vector index backends
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or overwrite records by id
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()>;

    /// Similarity search. Results come back ranked by the store.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryMatch>>;

    /// Delete every vector in the index
    async fn delete_all(&self) -> Result<()>;

    /// Describe the index
    async fn stats(&self) -> Result<StoreStats>;
}

/// Upsert records in fixed-size batches, respecting external payload limits.
///
/// A failed batch is logged and skipped; the remaining batches still run, so
/// one bad payload does not abort a whole document. Returns the number of
/// records actually upserted.
pub async fn upsert_batched(
    store: &dyn VectorStore,
    records: Vec<VectorRecord>,
    batch_size: usize,
) -> usize {
    let total = records.len();
    let mut upserted = 0;
    let mut batch_index = 0;

    let mut remaining = records;
    while !remaining.is_empty() {
        let rest = remaining.split_off(batch_size.min(remaining.len()));
        let batch = std::mem::replace(&mut remaining, rest);
        let batch_len = batch.len();

        match store.upsert(batch).await {
            Ok(()) => {
                upserted += batch_len;
            }
            Err(e) => {
                warn!(
                    batch = batch_index,
                    batch_len,
                    error = %e,
                    "Upsert batch failed, continuing with remaining batches"
                );
            }
        }
        batch_index += 1;
    }

    info!(upserted, total, "Upsert complete");
    upserted
}

/// Create a vector store based on configuration
pub fn create_store(config: &VectorStoreConfig) -> Result<Arc<dyn VectorStore>> {
    match config.provider.as_str() {
        "http" => Ok(Arc::new(HttpVectorStore::new(config)?)),
        "memory" => Ok(Arc::new(MemoryVectorStore::new(config.dimension))),
        other => Err(AppError::Configuration {
            message: format!("Unknown vector store provider: {}", other),
        }),
    }
}
