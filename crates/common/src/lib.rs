//! Ragline Common Library
//!
//! Shared code for the Ragline services including:
//! - Core data model (chunks, vector records, conversation turns, answers)
//! - Text sanitization
//! - Query classification and expansion
//! - Retrieval, deduplication and context assembly
//! - Embedding, vector store and generation client abstractions
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod context;
pub mod embeddings;
pub mod engine;
pub mod errors;
pub mod generation;
pub mod metrics;
pub mod query;
pub mod retrieval;
pub mod store;
pub mod text;
pub mod types;

// Re-export commonly used types
pub use config::AppConfig;
pub use embeddings::Embedder;
pub use engine::{QueryOutcome, RagEngine};
pub use errors::{AppError, Result};
pub use generation::Generator;
pub use store::VectorStore;
pub use types::{Answer, Chunk, ConversationTurn, RetrievedChunk, VectorRecord};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
