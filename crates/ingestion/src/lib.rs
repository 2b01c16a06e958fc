//! Ragline document ingestion
//!
//! Loaders for PDF, DOCX and plain text, a separator-prioritized chunker,
//! and the pipeline turning a document into upserted vectors.

pub mod chunker;
pub mod errors;
pub mod loader;
pub mod pipeline;

pub use errors::IngestError;
pub use pipeline::{IngestReport, IngestionPipeline};
