//! In-memory vector index.

use async_trait::async_trait;
use chrono::Utc;
use docrag_core::{
    EmbeddingRecord, IndexStats, ScopeFilter, SearchHit, StoreError, VectorIndex,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Brute-force in-memory vector index.
///
/// Records live in insertion order so equal-score ties resolve stably.
/// Not suited to large corpora, but exact — and therefore the reference
/// implementation for the search contract.
pub struct MemoryIndex {
    dimension: usize,
    records: Arc<RwLock<Vec<EmbeddingRecord>>>,
}

impl MemoryIndex {
    /// Create an index with the given vector dimensionality.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Compute cosine similarity between two vectors.
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot / (norm_a * norm_b)
    }

    fn validate_dimensions(&self, records: &[EmbeddingRecord]) -> Result<(), StoreError> {
        for record in records {
            if record.vector.len() != self.dimension {
                return Err(StoreError::DimensionMismatch {
                    expected: self.dimension,
                    actual: record.vector.len(),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn ensure_namespace(&self) -> Result<(), StoreError> {
        debug!(dimension = self.dimension, "memory index ready");
        Ok(())
    }

    async fn upsert(&self, records: &[EmbeddingRecord]) -> Result<(), StoreError> {
        // Validate the whole batch before touching state.
        self.validate_dimensions(records)?;

        let mut store = self.records.write().await;
        for record in records {
            match store.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record.clone(),
                None => store.push(record.clone()),
            }
        }

        debug!(count = records.len(), "upserted records");
        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        scope: &ScopeFilter,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, StoreError> {
        let records = self.records.read().await;

        let mut scored: Vec<(f32, &EmbeddingRecord)> = records
            .iter()
            .filter(|r| r.scope_key == scope.key())
            .map(|r| (Self::cosine_similarity(query_vector, &r.vector), r))
            .collect();

        // Stable sort keeps insertion order for equal scores.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let hits = scored
            .into_iter()
            .take(top_k)
            .map(|(score, record)| SearchHit {
                record_id: record.id,
                text: record.text.clone(),
                score,
                document_id: record.document_id,
            })
            .collect();

        Ok(hits)
    }

    async fn delete_by_document(&self, document_id: Uuid) -> Result<u64, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.document_id != Some(document_id));
        let deleted = (before - records.len()) as u64;

        debug!(deleted, %document_id, "deleted document records");
        Ok(deleted)
    }

    async fn stats(&self) -> Result<IndexStats, StoreError> {
        let records = self.records.read().await;
        Ok(IndexStats {
            total_records: records.len() as u64,
            last_updated: Some(Utc::now()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(scope: &str, vector: Vec<f32>, text: &str) -> EmbeddingRecord {
        EmbeddingRecord {
            id: Uuid::new_v4(),
            vector,
            tenant_id: scope.to_string(),
            scope_key: scope.to_string(),
            text: text.to_string(),
            document_id: None,
        }
    }

    fn scope(key: &str) -> ScopeFilter {
        ScopeFilter::new(key).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_and_stats() {
        let index = MemoryIndex::new(3);
        index.ensure_namespace().await.unwrap();

        index
            .upsert(&[
                record("a", vec![1.0, 0.0, 0.0], "one"),
                record("a", vec![0.0, 1.0, 0.0], "two"),
            ])
            .await
            .unwrap();

        let stats = index.stats().await.unwrap();
        assert_eq!(stats.total_records, 2);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_by_id() {
        let index = MemoryIndex::new(3);
        let mut rec = record("a", vec![1.0, 0.0, 0.0], "original");
        index.upsert(&[rec.clone()]).await.unwrap();

        rec.text = "replaced".to_string();
        index.upsert(&[rec]).await.unwrap();

        let stats = index.stats().await.unwrap();
        assert_eq!(stats.total_records, 1);

        let hits = index
            .search(&[1.0, 0.0, 0.0], &scope("a"), 1)
            .await
            .unwrap();
        assert_eq!(hits[0].text, "replaced");
    }

    #[tokio::test]
    async fn test_dimension_mismatch_fails_whole_batch() {
        let index = MemoryIndex::new(3);

        let err = index
            .upsert(&[
                record("a", vec![1.0, 0.0, 0.0], "good"),
                record("a", vec![1.0, 0.0], "bad"),
            ])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));

        // Nothing was written.
        let stats = index.stats().await.unwrap();
        assert_eq!(stats.total_records, 0);
    }

    #[tokio::test]
    async fn test_search_ranks_by_similarity() {
        let index = MemoryIndex::new(3);
        let best = record("a", vec![1.0, 0.0, 0.0], "best");
        index
            .upsert(&[
                record("a", vec![0.0, 1.0, 0.0], "orthogonal"),
                best.clone(),
                record("a", vec![0.7, 0.7, 0.0], "diagonal"),
            ])
            .await
            .unwrap();

        let hits = index
            .search(&[1.0, 0.0, 0.0], &scope("a"), 3)
            .await
            .unwrap();

        assert_eq!(hits[0].record_id, best.id);
        assert!((hits[0].score - 1.0).abs() < 1e-5);
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_search_respects_top_k() {
        let index = MemoryIndex::new(2);
        for i in 0..10 {
            index
                .upsert(&[record("a", vec![1.0, i as f32 * 0.1], &format!("t{i}"))])
                .await
                .unwrap();
        }

        let hits = index.search(&[1.0, 0.0], &scope("a"), 4).await.unwrap();
        assert_eq!(hits.len(), 4);
    }

    #[tokio::test]
    async fn test_search_never_crosses_scopes() {
        let index = MemoryIndex::new(2);
        index
            .upsert(&[
                record("tenant-a", vec![1.0, 0.0], "a's secret"),
                record("tenant-b", vec![1.0, 0.0], "b's secret"),
            ])
            .await
            .unwrap();

        let hits = index
            .search(&[1.0, 0.0], &scope("tenant-a"), 10)
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "a's secret");
    }

    #[tokio::test]
    async fn test_search_empty_scope_returns_empty_not_error() {
        let index = MemoryIndex::new(2);
        index
            .upsert(&[record("tenant-a", vec![1.0, 0.0], "something")])
            .await
            .unwrap();

        let hits = index
            .search(&[1.0, 0.0], &scope("tenant-with-no-data"), 5)
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_equal_scores_keep_insertion_order() {
        let index = MemoryIndex::new(2);
        let first = record("a", vec![1.0, 0.0], "first inserted");
        let second = record("a", vec![1.0, 0.0], "second inserted");
        index.upsert(&[first.clone(), second]).await.unwrap();

        let hits = index.search(&[1.0, 0.0], &scope("a"), 2).await.unwrap();
        assert_eq!(hits[0].record_id, first.id);
    }

    #[tokio::test]
    async fn test_delete_by_document() {
        let index = MemoryIndex::new(2);
        let doc_id = Uuid::new_v4();

        let mut doc_record = record("a", vec![1.0, 0.0], "doc chunk");
        doc_record.document_id = Some(doc_id);
        index
            .upsert(&[doc_record, record("a", vec![0.0, 1.0], "other")])
            .await
            .unwrap();

        let deleted = index.delete_by_document(doc_id).await.unwrap();
        assert_eq!(deleted, 1);

        let stats = index.stats().await.unwrap();
        assert_eq!(stats.total_records, 1);
    }

    #[test]
    fn test_cosine_similarity() {
        let sim = MemoryIndex::cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]);
        assert!((sim - 1.0).abs() < 1e-5);

        let sim = MemoryIndex::cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert!(sim.abs() < 1e-5);

        let sim = MemoryIndex::cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]);
        assert!((sim + 1.0).abs() < 1e-5);

        // Mismatched lengths and zero vectors degrade to 0.
        assert_eq!(MemoryIndex::cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(MemoryIndex::cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
