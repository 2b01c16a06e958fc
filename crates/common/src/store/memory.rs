//! In-memory vector store
//!
//! Used as the test double and for credential-less local runs. Vectors are
//! expected to arrive L2-normalized, so cosine similarity reduces to a dot
//! product.

use super::{QueryMatch, StoreStats, VectorStore};
use crate::errors::{AppError, Result};
use crate::types::VectorRecord;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

pub struct MemoryVectorStore {
    dimension: usize,
    records: RwLock<HashMap<String, VectorRecord>>,
}

impl MemoryVectorStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            records: RwLock::new(HashMap::new()),
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()> {
        for record in &records {
            if record.values.len() != self.dimension {
                return Err(AppError::VectorStore {
                    message: format!(
                        "Record {} has dimension {}, index expects {}",
                        record.id,
                        record.values.len(),
                        self.dimension
                    ),
                });
            }
        }

        let mut map = self.records.write().expect("store lock poisoned");
        for record in records {
            map.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryMatch>> {
        let map = self.records.read().expect("store lock poisoned");

        let mut matches: Vec<QueryMatch> = map
            .values()
            .map(|record| QueryMatch {
                id: record.id.clone(),
                score: dot(vector, &record.values),
                metadata: record.metadata.clone(),
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn delete_all(&self) -> Result<()> {
        self.records.write().expect("store lock poisoned").clear();
        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats> {
        let count = self.records.read().expect("store lock poisoned").len();
        Ok(StoreStats {
            count,
            dimension: self.dimension,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VectorMetadata;

    fn record(id: &str, values: Vec<f32>) -> VectorRecord {
        VectorRecord {
            id: id.to_string(),
            values,
            metadata: VectorMetadata {
                text: format!("text {}", id),
                source: None,
                uploaded_at: None,
            },
        }
    }

    #[tokio::test]
    async fn test_query_ranks_by_similarity() {
        let store = MemoryVectorStore::new(2);
        store
            .upsert(vec![
                record("a", vec![1.0, 0.0]),
                record("b", vec![0.0, 1.0]),
                record("c", vec![0.707, 0.707]),
            ])
            .await
            .unwrap();

        let matches = store.query(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "a");
        assert_eq!(matches[1].id, "c");
        assert!(matches[0].score > matches[1].score);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_by_id() {
        let store = MemoryVectorStore::new(2);
        store.upsert(vec![record("a", vec![1.0, 0.0])]).await.unwrap();
        store.upsert(vec![record("a", vec![0.0, 1.0])]).await.unwrap();

        assert_eq!(store.stats().await.unwrap().count, 1);
        let matches = store.query(&[0.0, 1.0], 1).await.unwrap();
        assert_eq!(matches[0].id, "a");
        assert!((matches[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_delete_all() {
        let store = MemoryVectorStore::new(2);
        store.upsert(vec![record("a", vec![1.0, 0.0])]).await.unwrap();
        store.delete_all().await.unwrap();
        assert_eq!(store.stats().await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected() {
        let store = MemoryVectorStore::new(3);
        let err = store.upsert(vec![record("a", vec![1.0])]).await.unwrap_err();
        assert!(err.to_string().contains("dimension"));
    }
}
