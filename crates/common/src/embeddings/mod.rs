//! Embedding service abstraction
//!
//! Provides a unified interface over embedding backends:
//! - HTTP embedding servers exposing an OpenAI-compatible `/embeddings` route
//!   (e.g. a text-embeddings-inference deployment of all-MiniLM-L6-v2)
//! - A deterministic mock for tests
//!
//! All embedders return L2-normalized vectors of a fixed dimension so cosine
//! similarity is a plain dot product and corpus/query scores are comparable.

use crate::config::EmbeddingConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Trait for embedding generation
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single query text
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts.
    ///
    /// Order preservation is the integrity contract the upsert step relies
    /// on: `embeddings[i]` always corresponds to `texts[i]`.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the model name
    fn model_name(&self) -> &str;

    /// Get the embedding dimension
    fn dimension(&self) -> usize;
}

/// Normalize a vector to unit L2 length in place.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

/// HTTP embedding client (OpenAI-compatible wire format)
pub struct HttpEmbedder {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    dimension: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest {
    input: Vec<String>,
    model: String,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    /// Create a new HTTP embedder
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let base_url = config
            .api_base
            .clone()
            .ok_or_else(|| AppError::Configuration {
                message: "embedding.api_base is required for the http provider".to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url,
            model: config.model.clone(),
            dimension: config.dimension,
        })
    }

    async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.base_url);

        let request = EmbeddingRequest {
            input: texts.to_vec(),
            model: self.model.clone(),
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder.send().await.map_err(|e| AppError::Embedding {
            message: format!("Request failed: {}", e),
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Embedding {
                message: format!("API error {}: {}", status, body),
            });
        }

        let result: EmbeddingResponse =
            response.json().await.map_err(|e| AppError::Embedding {
                message: format!("Failed to parse response: {}", e),
            })?;

        if result.data.len() != texts.len() {
            return Err(AppError::Embedding {
                message: format!(
                    "Expected {} embeddings, got {}",
                    texts.len(),
                    result.data.len()
                ),
            });
        }

        let mut embeddings = Vec::with_capacity(result.data.len());
        for data in result.data {
            let mut vector = data.embedding;
            if vector.len() != self.dimension {
                return Err(AppError::Embedding {
                    message: format!(
                        "Expected dimension {}, got {}",
                        self.dimension,
                        vector.len()
                    ),
                });
            }
            l2_normalize(&mut vector);
            embeddings.push(vector);
        }

        Ok(embeddings)
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings.into_iter().next().ok_or_else(|| AppError::Embedding {
            message: "Empty response".to_string(),
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        let result = self.request(texts).await;
        crate::metrics::record_embedding(
            start.elapsed().as_secs_f64(),
            &self.model,
            texts.len(),
            result.is_ok(),
        );
        result
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Deterministic mock embedder for tests.
///
/// Hashes each lowercased token into a fixed bucket, so texts sharing words
/// produce vectors with real cosine similarity. Random vectors would make
/// retrieval tests meaningless.
pub struct MockEmbedder {
    dimension: usize,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut vector = vec![0.0f32; self.dimension];
        for token in text.to_lowercase().split_whitespace() {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket = (hasher.finish() as usize) % self.dimension;
            vector[bucket] += 1.0;
        }
        l2_normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn model_name(&self) -> &str {
        "mock-embedding"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Create an embedder based on configuration
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match config.provider.as_str() {
        "http" => Ok(Arc::new(HttpEmbedder::new(config)?)),
        "mock" => Ok(Arc::new(MockEmbedder::new(config.dimension))),
        other => Err(AppError::Configuration {
            message: format!("Unknown embedding provider: {}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_embedder_dimension_and_norm() {
        let embedder = MockEmbedder::new(384);
        let embedding = embedder.embed_query("test text").await.unwrap();
        assert_eq!(embedding.len(), 384);

        let norm: f32 = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_mock_batch_preserves_order() {
        let embedder = MockEmbedder::new(384);
        let texts = vec!["alpha beta".to_string(), "gamma delta".to_string()];
        let embeddings = embedder.embed_batch(&texts).await.unwrap();
        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0], embedder.embed_query("alpha beta").await.unwrap());
        assert_eq!(embeddings[1], embedder.embed_query("gamma delta").await.unwrap());
    }

    #[tokio::test]
    async fn test_mock_similarity_is_meaningful() {
        let embedder = MockEmbedder::new(384);
        let a = embedder.embed_query("the refund policy document").await.unwrap();
        let b = embedder.embed_query("refund policy details").await.unwrap();
        let c = embedder.embed_query("unrelated zebra quantum").await.unwrap();

        let dot = |x: &[f32], y: &[f32]| -> f32 { x.iter().zip(y).map(|(a, b)| a * b).sum() };
        assert!(dot(&a, &b) > dot(&a, &c));
    }

    #[test]
    fn test_l2_normalize_zero_vector() {
        let mut v = vec![0.0f32; 4];
        l2_normalize(&mut v);
        assert_eq!(v, vec![0.0; 4]);
    }
}
