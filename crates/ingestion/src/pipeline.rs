//! Ingestion pipeline
//!
//! One document flows load -> split -> sanitize -> embed batch -> upsert
//! batches. Chunk sequence indices are assigned at split time; chunks that
//! sanitize down to nothing are dropped without renumbering the survivors,
//! so vector ids stay stable and re-ingesting a document overwrites its
//! prior vectors instead of duplicating them.

use crate::chunker::{split_text, ChunkingConfig};
use crate::errors::IngestError;
use crate::loader;
use ragline_common::config::ChunkingSettings;
use ragline_common::embeddings::Embedder;
use ragline_common::store::{upsert_batched, VectorStore};
use ragline_common::text::sanitize;
use ragline_common::types::{Chunk, EmbeddedChunk};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

/// Outcome of ingesting one document.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub source_id: String,
    /// Chunks embedded and offered for upsert
    pub chunk_count: usize,
    /// Records the store actually accepted
    pub upserted: usize,
}

pub struct IngestionPipeline {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    upsert_batch_size: usize,
}

impl IngestionPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        upsert_batch_size: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            upsert_batch_size,
        }
    }

    /// Ingest a document from raw bytes, as received by an upload.
    pub async fn ingest_bytes(
        &self,
        filename: &str,
        data: &[u8],
        chunk_size: usize,
    ) -> Result<IngestReport, IngestError> {
        let text = loader::load_bytes(filename, data)?;
        self.ingest_text(filename, &text, chunk_size).await
    }

    /// Ingest a document from disk. The filename becomes the source id.
    pub async fn ingest_path(
        &self,
        path: &Path,
        chunk_size: usize,
    ) -> Result<IngestReport, IngestError> {
        let text = loader::load_path(path)?;
        let source_id = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        self.ingest_text(&source_id, &text, chunk_size).await
    }

    /// Ingest already-extracted text under the given source id.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn ingest_text(
        &self,
        source_id: &str,
        text: &str,
        chunk_size: usize,
    ) -> Result<IngestReport, IngestError> {
        let start = Instant::now();
        let config = ChunkingConfig {
            chunk_size,
            overlap: ChunkingSettings::overlap_for(chunk_size),
        };

        let pieces = split_text(text, &config);
        let total_pieces = pieces.len();

        // sequence index is the position in the raw split output; empty
        // chunks are dropped but never renumbered
        let chunks: Vec<Chunk> = pieces
            .into_iter()
            .enumerate()
            .filter_map(|(sequence_index, piece)| {
                let sanitized = sanitize(&piece);
                if sanitized.is_empty() {
                    None
                } else {
                    Some(Chunk {
                        text: sanitized,
                        source_id: source_id.to_string(),
                        sequence_index,
                    })
                }
            })
            .collect();

        if chunks.is_empty() {
            return Err(IngestError::EmptyDocument(source_id.to_string()));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await.map_err(IngestError::App)?;

        let records: Vec<_> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| EmbeddedChunk { chunk, vector }.into_record())
            .collect();

        let chunk_count = records.len();
        let upserted = upsert_batched(self.store.as_ref(), records, self.upsert_batch_size).await;

        ragline_common::metrics::record_ingestion(
            start.elapsed().as_secs_f64(),
            chunk_count,
            source_id,
        );
        info!(
            source_id,
            total_pieces,
            chunk_count,
            upserted,
            "Document ingested"
        );

        Ok(IngestReport {
            source_id: source_id.to_string(),
            chunk_count,
            upserted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragline_common::embeddings::MockEmbedder;
    use ragline_common::store::MemoryVectorStore;

    const DIM: usize = 384;

    fn pipeline(store: Arc<MemoryVectorStore>) -> IngestionPipeline {
        IngestionPipeline::new(Arc::new(MockEmbedder::new(DIM)), store, 100)
    }

    #[tokio::test]
    async fn test_ingest_assigns_deterministic_ids() {
        let store = Arc::new(MemoryVectorStore::new(DIM));
        let text = "The first topic is billing. ".repeat(40);

        let report = pipeline(store.clone())
            .ingest_text("guide.pdf", &text, 400)
            .await
            .unwrap();

        assert!(report.chunk_count > 1);
        assert_eq!(report.upserted, report.chunk_count);
        assert_eq!(store.stats().await.unwrap().count, report.chunk_count);
    }

    #[tokio::test]
    async fn test_reingestion_is_idempotent() {
        let store = Arc::new(MemoryVectorStore::new(DIM));
        let pipeline = pipeline(store.clone());
        let text = "Support hours are nine to five. ".repeat(40);

        let first = pipeline.ingest_text("faq.pdf", &text, 400).await.unwrap();
        let second = pipeline.ingest_text("faq.pdf", &text, 400).await.unwrap();

        assert_eq!(first.chunk_count, second.chunk_count);
        // same ids were overwritten, not duplicated
        assert_eq!(store.stats().await.unwrap().count, first.chunk_count);
    }

    #[tokio::test]
    async fn test_control_character_text_is_rejected() {
        let store = Arc::new(MemoryVectorStore::new(DIM));
        let err = pipeline(store)
            .ingest_text("junk.txt", "\u{0}\u{1}\u{2}", 400)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::EmptyDocument(_)));
    }

    #[tokio::test]
    async fn test_ingest_then_answer_grounds_on_the_right_chunk() {
        use ragline_common::config::RetrievalConfig;
        use ragline_common::generation::MockGenerator;
        use ragline_common::RagEngine;

        let store = Arc::new(MemoryVectorStore::new(DIM));
        let embedder = Arc::new(MockEmbedder::new(DIM));
        let pipeline = IngestionPipeline::new(embedder.clone(), store.clone(), 100);

        // one paragraph holds the answer; the rest is near-uniform filler
        let mut document = String::new();
        for i in 0..9 {
            document.push_str(&format!(
                "Filler paragraph number {} covers shipping and delivery \
                 schedules at length, repeating routine operational notes.\n\n",
                i
            ));
        }
        document.push_str(
            "The zephyr clause says the refund window is ninety days for annual plans.\n\n",
        );

        let report = pipeline
            .ingest_text("handbook.txt", &document, 150)
            .await
            .unwrap();
        assert!(report.chunk_count >= 8);

        let generator = Arc::new(MockGenerator::new("Ninety days for annual plans."));
        let engine = RagEngine::new(
            embedder,
            store,
            generator.clone(),
            RetrievalConfig::default(),
        );

        let outcome = engine
            .answer("what does the zephyr clause say for the refund window", &[])
            .await;

        assert!(outcome.answer.is_grounded());
        assert_eq!(outcome.sources, vec!["handbook.txt"]);

        // the prompt context carries the answering chunk, not the filler
        let prompts = generator.recorded_prompts();
        assert!(prompts[0].contains("zephyr clause"));
        assert!(prompts[0].contains("ninety days"));
        assert!(!prompts[0].contains("Filler paragraph number 3"));
    }

    #[tokio::test]
    async fn test_stored_text_is_sanitized() {
        let store = Arc::new(MemoryVectorStore::new(DIM));
        let embedder = Arc::new(MockEmbedder::new(DIM));
        let pipeline =
            IngestionPipeline::new(embedder.clone(), store.clone(), 100);

        pipeline
            .ingest_text("doc.txt", "refund  policy\u{7} details", 400)
            .await
            .unwrap();

        let query = embedder.embed_query("refund policy details").await.unwrap();
        let matches = store.query(&query, 1).await.unwrap();
        assert_eq!(matches[0].metadata.text, "refund policy details");
    }
}
