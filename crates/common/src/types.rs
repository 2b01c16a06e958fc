//! Core data model for the ingestion and query pipelines
//!
//! Each pipeline boundary has an explicit record type so order preservation
//! and id stability are checkable by the type system instead of flowing
//! through loosely-shaped maps.

use serde::{Deserialize, Serialize};

/// A bounded, possibly-overlapping slice of a source document's text.
///
/// The unit of embedding and retrieval. `sequence_index` is assigned at
/// split time and never renumbered, even when neighbouring chunks are later
/// dropped as empty, so vector ids stay stable across re-ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Sanitized chunk text
    pub text: String,
    /// Identifier of the source document (typically the filename)
    pub source_id: String,
    /// Position of this chunk within its document, strictly increasing
    pub sequence_index: usize,
}

impl Chunk {
    /// Deterministic vector id: the idempotency key for re-ingestion.
    /// Re-ingesting the same document overwrites prior vectors instead of
    /// duplicating them.
    pub fn vector_id(&self) -> String {
        format!("{}-chunk-{}", self.source_id, self.sequence_index)
    }
}

/// A chunk paired with its embedding vector.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    /// L2-normalized embedding
    pub vector: Vec<f32>,
}

impl EmbeddedChunk {
    pub fn into_record(self) -> VectorRecord {
        let id = self.chunk.vector_id();
        VectorRecord {
            id,
            values: self.vector,
            metadata: VectorMetadata {
                text: self.chunk.text,
                source: Some(self.chunk.source_id),
                uploaded_at: Some(chrono::Utc::now().to_rfc3339()),
            },
        }
    }
}

/// Metadata persisted alongside each vector.
///
/// `text` is always the sanitized chunk text and is the only field required
/// for correctness of generation; the rest is optional provenance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorMetadata {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>,
}

/// Persisted form of an embedded chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: VectorMetadata,
}

/// A chunk returned by similarity search.
///
/// `score` is cosine similarity against the normalized query vector,
/// range [-1, 1]. Ephemeral: scoped to one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Role of a conversation participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// One turn of conversation history.
///
/// History is owned by the calling session and passed by reference per
/// request; the pipeline never retains it across calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Fixed refusal when retrieval produced no chunks at all.
pub const NO_DOCUMENTS_SENTINEL: &str =
    "The provided document does not contain this information. Please upload a relevant document first.";

/// Fixed refusal when chunks were retrieved but cleaned down to nothing,
/// and the refusal the generator is instructed to emit verbatim when the
/// answer is absent from context.
pub const NOT_IN_CONTEXT_SENTINEL: &str =
    "The provided document does not contain this information.";

/// Outcome of one query, tagged so callers can tell "no relevant content"
/// apart from "service failed" instead of both collapsing into a string.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// Answer produced from retrieved context
    Grounded(String),
    /// No chunks were retrieved
    NoDocuments,
    /// Chunks were retrieved but the assembled context was empty
    NotInContext,
    /// The generation call failed; the message describes the failure
    GenerationFailed(String),
}

impl Answer {
    /// User-visible answer text. Every variant renders to an answer-shaped
    /// string; failures never surface as raw errors.
    pub fn text(&self) -> String {
        match self {
            Answer::Grounded(text) => text.clone(),
            Answer::NoDocuments => NO_DOCUMENTS_SENTINEL.to_string(),
            Answer::NotInContext => NOT_IN_CONTEXT_SENTINEL.to_string(),
            Answer::GenerationFailed(message) => {
                format!("Error generating response: {}", message)
            }
        }
    }

    pub fn is_grounded(&self) -> bool {
        matches!(self, Answer::Grounded(_))
    }
}
