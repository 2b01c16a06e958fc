//! HTTP vector store client
//!
//! Speaks the Pinecone-style REST surface: `/vectors/upsert`, `/query`,
//! `/vectors/delete`, `/describe_index_stats`. Requests carry the index
//! API key in the `Api-Key` header.

use super::{QueryMatch, StoreStats, VectorStore};
use crate::config::VectorStoreConfig;
use crate::errors::{AppError, Result};
use crate::types::{VectorMetadata, VectorRecord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub struct HttpVectorStore {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    index_name: String,
    dimension: usize,
}

#[derive(Serialize)]
struct UpsertRequest {
    vectors: Vec<WireVector>,
}

#[derive(Serialize)]
struct WireVector {
    id: String,
    values: Vec<f32>,
    metadata: VectorMetadata,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<WireMatch>,
}

#[derive(Deserialize)]
struct WireMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: VectorMetadata,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest {
    delete_all: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    #[serde(default)]
    total_vector_count: usize,
    #[serde(default)]
    dimension: usize,
}

impl HttpVectorStore {
    /// Create a new HTTP vector store client
    pub fn new(config: &VectorStoreConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| AppError::Configuration {
            message: "vector_store.api_key is required for the http provider".to_string(),
        })?;
        let base_url = config.base_url.clone().ok_or_else(|| AppError::Configuration {
            message: "vector_store.base_url is required for the http provider".to_string(),
        })?;
        let index_name = config.index_name.clone().ok_or_else(|| AppError::Configuration {
            message: "vector_store.index_name is required for the http provider".to_string(),
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url,
            index_name,
            dimension: config.dimension,
        })
    }

    /// Name of the backing index
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::VectorStore {
                message: format!("Request to {} failed: {}", path, e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::VectorStore {
                message: format!("API error {} on {}: {}", status, path, body),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl VectorStore for HttpVectorStore {
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()> {
        let count = records.len();
        let request = UpsertRequest {
            vectors: records
                .into_iter()
                .map(|r| WireVector {
                    id: r.id,
                    values: r.values,
                    metadata: r.metadata,
                })
                .collect(),
        };

        self.post("/vectors/upsert", &request).await?;
        debug!(count, index = %self.index_name, "Vectors upserted");
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryMatch>> {
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
        };

        let response = self.post("/query", &request).await?;
        let result: QueryResponse = response.json().await.map_err(|e| AppError::VectorStore {
            message: format!("Failed to parse query response: {}", e),
        })?;

        Ok(result
            .matches
            .into_iter()
            .map(|m| QueryMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata,
            })
            .collect())
    }

    async fn delete_all(&self) -> Result<()> {
        self.post("/vectors/delete", &DeleteRequest { delete_all: true })
            .await?;
        debug!(index = %self.index_name, "Index wiped");
        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats> {
        let response = self
            .post("/describe_index_stats", &serde_json::json!({}))
            .await?;
        let result: StatsResponse =
            response.json().await.map_err(|e| AppError::VectorStore {
                message: format!("Failed to parse stats response: {}", e),
            })?;

        Ok(StoreStats {
            count: result.total_vector_count,
            dimension: if result.dimension > 0 {
                result.dimension
            } else {
                self.dimension
            },
        })
    }
}
