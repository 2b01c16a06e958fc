//! Similarity retrieval with score filtering
//!
//! The retriever owns the policy the vector store does not: how many
//! candidates to fetch, which survive the similarity floor, and their final
//! order. Failures surface as errors instead of empty result sets, so the
//! caller can tell "nothing relevant" apart from "retrieval is down".

use crate::config::RetrievalConfig;
use crate::embeddings::Embedder;
use crate::errors::Result;
use crate::store::VectorStore;
use crate::types::RetrievedChunk;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    config: RetrievalConfig,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            config,
        }
    }

    /// Retrieve chunks relevant to the query, best-scoring first.
    ///
    /// Summary mode fetches a wide candidate set and keeps every non-empty
    /// match regardless of score; normal mode fetches `top_k` candidates and
    /// drops those under the similarity floor. Matches whose stored text is
    /// empty are always discarded.
    pub async fn retrieve(&self, query: &str, is_summary: bool) -> Result<Vec<RetrievedChunk>> {
        let start = Instant::now();
        let fetch_count = if is_summary {
            self.config.summary_fetch_count
        } else {
            self.config.top_k
        };

        let query_vector = self.embedder.embed_query(query).await?;
        let matches = self.store.query(&query_vector, fetch_count).await?;
        let fetched = matches.len();

        let mut chunks: Vec<RetrievedChunk> = matches
            .into_iter()
            .filter(|m| !m.metadata.text.trim().is_empty())
            .filter(|m| is_summary || m.score >= self.config.min_similarity)
            .map(|m| RetrievedChunk {
                text: m.metadata.text,
                score: m.score,
                source: m.metadata.source,
            })
            .collect();

        chunks.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mode = if is_summary { "summary" } else { "standard" };
        crate::metrics::record_retrieval(start.elapsed().as_secs_f64(), mode, chunks.len());
        debug!(fetched, kept = chunks.len(), mode, "Retrieval complete");

        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::l2_normalize;
    use crate::store::MemoryVectorStore;
    use crate::types::{VectorMetadata, VectorRecord};
    use async_trait::async_trait;

    /// Embeds every query to the same unit vector, so match scores are
    /// exactly the first component of each stored vector.
    struct FixedEmbedder;

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed_query(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0]).collect())
        }

        fn model_name(&self) -> &str {
            "fixed"
        }

        fn dimension(&self) -> usize {
            3
        }
    }

    fn record(id: &str, text: &str, score: f32) -> VectorRecord {
        VectorRecord {
            id: id.to_string(),
            values: vec![score, 0.0, 0.0],
            metadata: VectorMetadata {
                text: text.to_string(),
                source: Some("doc.pdf".to_string()),
                uploaded_at: None,
            },
        }
    }

    async fn seeded_store() -> Arc<MemoryVectorStore> {
        let store = Arc::new(MemoryVectorStore::new(3));
        store
            .upsert(vec![
                record("a", "high relevance", 0.9),
                record("b", "medium relevance", 0.5),
                record("c", "low relevance", 0.2),
            ])
            .await
            .unwrap();
        store
    }

    fn retriever(store: Arc<MemoryVectorStore>) -> Retriever {
        Retriever::new(Arc::new(FixedEmbedder), store, RetrievalConfig::default())
    }

    #[tokio::test]
    async fn test_score_floor_applied() {
        let store = seeded_store().await;
        let chunks = retriever(store).retrieve("query", false).await.unwrap();

        // 0.2 is under the 0.30 floor
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "high relevance");
        assert_eq!(chunks[1].text, "medium relevance");
    }

    #[tokio::test]
    async fn test_summary_keeps_low_scores() {
        let store = seeded_store().await;
        let chunks = retriever(store).retrieve("summarize", true).await.unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].text, "low relevance");
    }

    #[tokio::test]
    async fn test_sorted_descending() {
        let store = seeded_store().await;
        let chunks = retriever(store).retrieve("query", true).await.unwrap();

        for pair in chunks.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_empty_text_dropped() {
        let store = Arc::new(MemoryVectorStore::new(3));
        store
            .upsert(vec![record("a", "   ", 0.9), record("b", "real text", 0.8)])
            .await
            .unwrap();

        let chunks = retriever(store).retrieve("query", false).await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "real text");
    }

    #[tokio::test]
    async fn test_empty_store_is_ok_empty() {
        let store = Arc::new(MemoryVectorStore::new(3));
        let chunks = retriever(store).retrieve("query", false).await.unwrap();
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn test_normalized_vectors_give_cosine() {
        let store = Arc::new(MemoryVectorStore::new(3));
        let mut values = vec![3.0, 4.0, 0.0];
        l2_normalize(&mut values);
        store
            .upsert(vec![VectorRecord {
                id: "n".to_string(),
                values,
                metadata: VectorMetadata {
                    text: "normalized".to_string(),
                    source: None,
                    uploaded_at: None,
                },
            }])
            .await
            .unwrap();

        let chunks = retriever(store).retrieve("query", true).await.unwrap();
        assert!((chunks[0].score - 0.6).abs() < 1e-6);
    }
}
