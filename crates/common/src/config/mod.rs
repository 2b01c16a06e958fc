//! Configuration management for Ragline services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/*.toml)
//! - Default values

use crate::errors::AppError;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Vector store configuration
    #[serde(default)]
    pub vector_store: VectorStoreConfig,

    /// Embedding service configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Generation (LLM) configuration
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingSettings,

    /// Ingestion configuration
    #[serde(default)]
    pub ingestion: IngestionConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum upload body size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VectorStoreConfig {
    /// Store provider: http, memory
    #[serde(default = "default_store_provider")]
    pub provider: String,

    /// API key for the store service (required for http)
    pub api_key: Option<String>,

    /// Index name (required for http)
    pub index_name: Option<String>,

    /// Base URL of the index endpoint (required for http)
    pub base_url: Option<String>,

    /// Vector dimension
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Upsert batch size (external payload limit)
    #[serde(default = "default_upsert_batch_size")]
    pub upsert_batch_size: usize,

    /// Request timeout in seconds
    #[serde(default = "default_client_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    /// Embedding provider: http, mock
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// API key for the embedding service
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,

    /// Model to use
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimension
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Request timeout in seconds
    #[serde(default = "default_client_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// Generation provider: http, mock
    #[serde(default = "default_generation_provider")]
    pub provider: String,

    /// API key for the generation service
    pub api_key: Option<String>,

    /// Chat completions endpoint
    #[serde(default = "default_generation_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_client_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    /// Default number of chunks to fetch
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum cosine similarity for a chunk to be kept
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f32,

    /// Fetch count for summary-style queries
    #[serde(default = "default_summary_fetch_count")]
    pub summary_fetch_count: usize,

    /// Jaccard threshold above which a chunk is a duplicate
    #[serde(default = "default_dedupe_threshold")]
    pub dedupe_threshold: f32,

    /// Conversation turns included in the generation prompt
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChunkingSettings {
    /// Target chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Smallest chunk size accepted from upload overrides
    #[serde(default = "default_min_chunk_size")]
    pub min_chunk_size: usize,

    /// Largest chunk size accepted from upload overrides
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,
}

impl ChunkingSettings {
    /// Overlap is always 20% of the chunk size.
    pub fn overlap_for(chunk_size: usize) -> usize {
        chunk_size / 5
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestionConfig {
    /// Default document path for the CLI when no argument is given
    pub default_document: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Expose the Prometheus scrape endpoint
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 30 }
fn default_max_upload_bytes() -> usize { 50 * 1024 * 1024 }
fn default_store_provider() -> String { "http".to_string() }
fn default_dimension() -> usize { 384 }
fn default_upsert_batch_size() -> usize { 100 }
fn default_client_timeout() -> u64 { 30 }
fn default_embedding_provider() -> String { "http".to_string() }
fn default_embedding_model() -> String { "sentence-transformers/all-MiniLM-L6-v2".to_string() }
fn default_generation_provider() -> String { "http".to_string() }
fn default_generation_endpoint() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_generation_model() -> String { "gpt-4o-mini".to_string() }
fn default_top_k() -> usize { 15 }
fn default_min_similarity() -> f32 { 0.30 }
fn default_summary_fetch_count() -> usize { 100 }
fn default_dedupe_threshold() -> f32 { 0.85 }
fn default_history_window() -> usize { 6 }
fn default_chunk_size() -> usize { 400 }
fn default_min_chunk_size() -> usize { 200 }
fn default_max_chunk_size() -> usize { 800 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_enabled() -> bool { true }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with APP__ prefix
            // e.g., APP__SERVER__PORT=8081
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Validate startup-required settings.
    ///
    /// Missing credentials or index name for an http-backed collaborator is
    /// fatal; the process must not come up half-configured.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.vector_store.provider == "http" {
            if self.vector_store.api_key.is_none() {
                return Err(AppError::Configuration {
                    message: "vector_store.api_key is required for the http provider".to_string(),
                });
            }
            if self.vector_store.index_name.is_none() {
                return Err(AppError::Configuration {
                    message: "vector_store.index_name is required for the http provider"
                        .to_string(),
                });
            }
            if self.vector_store.base_url.is_none() {
                return Err(AppError::Configuration {
                    message: "vector_store.base_url is required for the http provider".to_string(),
                });
            }
        }

        if self.embedding.provider == "http" && self.embedding.api_base.is_none() {
            return Err(AppError::Configuration {
                message: "embedding.api_base is required for the http provider".to_string(),
            });
        }

        if self.generation.provider == "http" && self.generation.api_key.is_none() {
            return Err(AppError::Configuration {
                message: "generation.api_key is required for the http provider".to_string(),
            });
        }

        if self.embedding.dimension != self.vector_store.dimension {
            return Err(AppError::Configuration {
                message: format!(
                    "embedding dimension {} does not match vector store dimension {}",
                    self.embedding.dimension, self.vector_store.dimension
                ),
            });
        }

        Ok(())
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            provider: default_store_provider(),
            api_key: None,
            index_name: None,
            base_url: None,
            dimension: default_dimension(),
            upsert_batch_size: default_upsert_batch_size(),
            timeout_secs: default_client_timeout(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            api_key: None,
            api_base: None,
            model: default_embedding_model(),
            dimension: default_dimension(),
            timeout_secs: default_client_timeout(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_generation_provider(),
            api_key: None,
            endpoint: default_generation_endpoint(),
            model: default_generation_model(),
            timeout_secs: default_client_timeout(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            min_similarity: default_min_similarity(),
            summary_fetch_count: default_summary_fetch_count(),
            dedupe_threshold: default_dedupe_threshold(),
            history_window: default_history_window(),
        }
    }
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            min_chunk_size: default_min_chunk_size(),
            max_chunk_size: default_max_chunk_size(),
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            default_document: None,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            vector_store: VectorStoreConfig::default(),
            embedding: EmbeddingConfig::default(),
            generation: GenerationConfig::default(),
            retrieval: RetrievalConfig::default(),
            chunking: ChunkingSettings::default(),
            ingestion: IngestionConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.retrieval.top_k, 15);
        assert_eq!(config.retrieval.min_similarity, 0.30);
        assert_eq!(config.chunking.chunk_size, 400);
        assert_eq!(config.vector_store.dimension, 384);
    }

    #[test]
    fn test_overlap_is_twenty_percent() {
        assert_eq!(ChunkingSettings::overlap_for(400), 80);
        assert_eq!(ChunkingSettings::overlap_for(500), 100);
    }

    #[test]
    fn test_validate_rejects_missing_store_credentials() {
        let config = AppConfig::default();
        // http provider with no api_key/index_name must not pass
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_mock_stack() {
        let mut config = AppConfig::default();
        config.vector_store.provider = "memory".to_string();
        config.embedding.provider = "mock".to_string();
        config.generation.provider = "mock".to_string();
        assert!(config.validate().is_ok());
    }
}
