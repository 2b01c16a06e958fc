//! Query pipeline orchestration
//!
//! One engine instance owns the constructor-injected client bundle
//! (embedder, store, generator) and runs a query start to finish:
//! classify, expand, retrieve, assemble, prompt, generate. Retrieval
//! failures degrade to the no-documents refusal and generation failures to
//! an error-text answer; a query never surfaces a raw error to the caller.

use crate::config::RetrievalConfig;
use crate::context::assemble_context;
use crate::embeddings::Embedder;
use crate::generation::{build_prompt, Generator};
use crate::query::{expand_query, is_summary_query, is_vague_query};
use crate::retrieval::Retriever;
use crate::store::VectorStore;
use crate::types::{Answer, ConversationTurn, RetrievedChunk};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Result of one query: the answer plus the provenance the HTTP surface
/// reports alongside it.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub answer: Answer,
    /// Distinct source document names of the chunks used
    pub sources: Vec<String>,
    /// Number of chunks that survived filtering and deduplication
    pub context_used: usize,
}

pub struct RagEngine {
    retriever: Retriever,
    generator: Arc<dyn Generator>,
    config: RetrievalConfig,
}

impl RagEngine {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        generator: Arc<dyn Generator>,
        config: RetrievalConfig,
    ) -> Self {
        let retriever = Retriever::new(embedder, store, config.clone());
        Self {
            retriever,
            generator,
            config,
        }
    }

    /// Answer one question against the index.
    ///
    /// Summary classification runs on the original query; expansion rewrites
    /// only the retrieval query, the original is what gets answered.
    #[instrument(skip(self, history), fields(history_len = history.len()))]
    pub async fn answer(&self, query: &str, history: &[ConversationTurn]) -> QueryOutcome {
        let is_summary = is_summary_query(query);
        let retrieval_query = if is_vague_query(query) {
            expand_query(query, history)
        } else {
            query.to_string()
        };

        let chunks = match self.retriever.retrieve(&retrieval_query, is_summary).await {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(error = %e, "Retrieval failed, answering without context");
                crate::metrics::record_answer("retrieval_failed");
                return QueryOutcome {
                    answer: Answer::NoDocuments,
                    sources: Vec::new(),
                    context_used: 0,
                };
            }
        };

        if chunks.is_empty() {
            crate::metrics::record_answer("no_documents");
            return QueryOutcome {
                answer: Answer::NoDocuments,
                sources: Vec::new(),
                context_used: 0,
            };
        }

        let sources = distinct_sources(&chunks);
        let context_used = chunks.len();
        let context = assemble_context(chunks, self.config.dedupe_threshold);

        if context.trim().is_empty() {
            crate::metrics::record_answer("not_in_context");
            return QueryOutcome {
                answer: Answer::NotInContext,
                sources,
                context_used,
            };
        }

        let prompt = build_prompt(query, &context, history, self.config.history_window);

        let answer = match self.generator.generate(&prompt).await {
            Ok(text) => {
                crate::metrics::record_answer("grounded");
                Answer::Grounded(text)
            }
            Err(e) => {
                warn!(error = %e, "Generation failed");
                crate::metrics::record_answer("generation_failed");
                Answer::GenerationFailed(e.to_string())
            }
        };

        info!(
            context_used,
            sources = sources.len(),
            grounded = answer.is_grounded(),
            "Query answered"
        );

        QueryOutcome {
            answer,
            sources,
            context_used,
        }
    }
}

fn distinct_sources(chunks: &[RetrievedChunk]) -> Vec<String> {
    let mut sources = Vec::new();
    for chunk in chunks {
        if let Some(source) = &chunk.source {
            if !sources.contains(source) {
                sources.push(source.clone());
            }
        }
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::MockEmbedder;
    use crate::generation::MockGenerator;
    use crate::store::{MemoryVectorStore, VectorStore};
    use crate::types::{VectorMetadata, VectorRecord, NOT_IN_CONTEXT_SENTINEL};

    const DIM: usize = 384;

    async fn seeded_engine(generator: Arc<MockGenerator>) -> RagEngine {
        let embedder = Arc::new(MockEmbedder::new(DIM));
        let store = Arc::new(MemoryVectorStore::new(DIM));

        let texts = [
            "The refund policy allows returns within thirty days of purchase.",
            "Shipping is free for orders over fifty dollars.",
        ];
        let mut records = Vec::new();
        for (i, text) in texts.iter().enumerate() {
            let vector = embedder.embed_query(text).await.unwrap();
            records.push(VectorRecord {
                id: format!("policy.pdf-chunk-{}", i),
                values: vector,
                metadata: VectorMetadata {
                    text: text.to_string(),
                    source: Some("policy.pdf".to_string()),
                    uploaded_at: None,
                },
            });
        }
        store.upsert(records).await.unwrap();

        RagEngine::new(embedder, store, generator, RetrievalConfig::default())
    }

    #[tokio::test]
    async fn test_grounded_answer_with_sources() {
        let generator = Arc::new(MockGenerator::new("Returns are accepted for thirty days."));
        let engine = seeded_engine(generator.clone()).await;

        let outcome = engine
            .answer("What is the refund policy for returns?", &[])
            .await;

        assert!(outcome.answer.is_grounded());
        assert_eq!(outcome.sources, vec!["policy.pdf"]);
        assert!(outcome.context_used >= 1);

        let prompts = generator.recorded_prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("refund policy"));
        assert!(prompts[0].contains("DOCUMENT CONTEXT"));
    }

    #[tokio::test]
    async fn test_empty_index_refuses_without_generating() {
        let generator = Arc::new(MockGenerator::default());
        let embedder = Arc::new(MockEmbedder::new(DIM));
        let store = Arc::new(MemoryVectorStore::new(DIM));
        let engine = RagEngine::new(
            embedder,
            store,
            generator.clone(),
            RetrievalConfig::default(),
        );

        let outcome = engine.answer("anything at all in here?", &[]).await;

        assert_eq!(outcome.answer, Answer::NoDocuments);
        assert_eq!(outcome.context_used, 0);
        assert!(generator.recorded_prompts().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_degrades_to_answer() {
        let generator = Arc::new(MockGenerator::failing());
        let engine = seeded_engine(generator).await;

        let outcome = engine
            .answer("What is the refund policy for returns?", &[])
            .await;

        match outcome.answer {
            Answer::GenerationFailed(message) => {
                assert!(message.contains("mock generation failure"));
            }
            other => panic!("expected GenerationFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_vague_followup_expands_retrieval_but_not_question() {
        let generator = Arc::new(MockGenerator::default());
        let embedder = Arc::new(MockEmbedder::new(DIM));
        let store = Arc::new(MemoryVectorStore::new(DIM));

        // shares no tokens with the bare follow-up, many with the expansion
        let text = "the refund policy is thirty days";
        let vector = embedder.embed_query(text).await.unwrap();
        store
            .upsert(vec![VectorRecord {
                id: "policy.pdf-chunk-0".to_string(),
                values: vector,
                metadata: VectorMetadata {
                    text: text.to_string(),
                    source: Some("policy.pdf".to_string()),
                    uploaded_at: None,
                },
            }])
            .await
            .unwrap();

        let engine = RagEngine::new(
            embedder,
            store,
            generator.clone(),
            RetrievalConfig::default(),
        );

        let history = vec![
            ConversationTurn::user("what is the refund policy"),
            ConversationTurn::assistant("Returns are accepted for thirty days."),
        ];
        let outcome = engine.answer("tell me more about it", &history).await;

        assert!(outcome.answer.is_grounded());
        let prompts = generator.recorded_prompts();
        // the prompt asks the original question, not the expanded one
        assert!(prompts[0].contains("CURRENT QUESTION: tell me more about it"));

        // without history there is nothing to expand with; the bare
        // follow-up retrieves nothing and the engine refuses
        let bare = engine.answer("tell me more about it", &[]).await;
        assert_eq!(bare.answer, Answer::NoDocuments);
    }

    #[tokio::test]
    async fn test_sentinel_text_for_not_in_context() {
        assert_eq!(Answer::NotInContext.text(), NOT_IN_CONTEXT_SENTINEL);
    }
}
