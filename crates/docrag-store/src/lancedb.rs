//! `LanceDB` implementation of `VectorIndex`.

use arrow_array::{Array, ArrayRef, Float32Array, RecordBatch, RecordBatchIterator, StringArray};
use arrow_schema::{DataType, Field, Schema};
use async_trait::async_trait;
use chrono::Utc;
use docrag_core::{
    EmbeddingRecord, IndexStats, ScopeFilter, SearchHit, StoreError, VectorIndex,
};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection, DistanceType, Table};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

const EMBEDDINGS_TABLE: &str = "embeddings";

/// LanceDB-backed vector index.
///
/// One shared table holds every tenant's records; searches push the scope
/// filter into the query so isolation holds inside the engine, not in
/// post-processing.
pub struct LanceIndex {
    /// Path to the `LanceDB` database
    db_path: PathBuf,
    /// Vector dimensionality
    dimension: usize,
    /// Database connection (lazy initialized)
    connection: RwLock<Option<Connection>>,
    /// Embeddings table handle
    table: RwLock<Option<Table>>,
}

impl LanceIndex {
    /// Create a new `LanceIndex`.
    #[must_use]
    pub fn new(db_path: PathBuf, dimension: usize) -> Self {
        Self {
            db_path,
            dimension,
            connection: RwLock::new(None),
            table: RwLock::new(None),
        }
    }

    /// The database path.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Get or create the connection.
    async fn get_connection(&self) -> Result<Connection, StoreError> {
        {
            let conn = self.connection.read().await;
            if let Some(ref c) = *conn {
                return Ok(c.clone());
            }
        }

        let mut conn = self.connection.write().await;
        if conn.is_none() {
            let db_path_str = self.db_path.to_string_lossy().to_string();
            let new_conn = connect(&db_path_str)
                .execute()
                .await
                .map_err(|e| StoreError::Unavailable(format!("lancedb connect: {e}")))?;
            *conn = Some(new_conn);
        }
        conn.as_ref()
            .cloned()
            .ok_or_else(|| StoreError::Unavailable("connection not initialized".to_string()))
    }

    /// Get or open the embeddings table.
    async fn get_table(&self) -> Result<Table, StoreError> {
        {
            let table = self.table.read().await;
            if let Some(ref t) = *table {
                return Ok(t.clone());
            }
        }

        let conn = self.get_connection().await?;
        let mut table_lock = self.table.write().await;

        if table_lock.is_none() {
            let t = conn
                .open_table(EMBEDDINGS_TABLE)
                .execute()
                .await
                .map_err(|e| StoreError::Init(format!("open embeddings table: {e}")))?;
            *table_lock = Some(t);
        }

        table_lock
            .as_ref()
            .cloned()
            .ok_or_else(|| StoreError::Init("table not initialized".to_string()))
    }

    /// Arrow schema for the embeddings table.
    fn schema(&self) -> Schema {
        Schema::new(vec![
            Field::new("record_id", DataType::Utf8, false),
            Field::new("tenant_id", DataType::Utf8, false),
            Field::new("scope_key", DataType::Utf8, false),
            Field::new("document_id", DataType::Utf8, true),
            Field::new("text", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    self.dimension as i32,
                ),
                false,
            ),
            Field::new("indexed_at", DataType::Utf8, false),
        ])
    }

    /// Convert records to an Arrow `RecordBatch`.
    fn records_to_batch(&self, records: &[EmbeddingRecord]) -> Result<RecordBatch, StoreError> {
        let record_ids: Vec<_> = records.iter().map(|r| r.id.to_string()).collect();
        let tenant_ids: Vec<_> = records.iter().map(|r| r.tenant_id.clone()).collect();
        let scope_keys: Vec<_> = records.iter().map(|r| r.scope_key.clone()).collect();
        let document_ids: Vec<Option<String>> = records
            .iter()
            .map(|r| r.document_id.map(|id| id.to_string()))
            .collect();
        let texts: Vec<_> = records.iter().map(|r| r.text.clone()).collect();
        let indexed_ats: Vec<_> = records.iter().map(|_| Utc::now().to_rfc3339()).collect();

        let vector_array = build_vector_array(records, self.dimension);
        let schema = Arc::new(self.schema());

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(record_ids)),
                Arc::new(StringArray::from(tenant_ids)),
                Arc::new(StringArray::from(scope_keys)),
                Arc::new(StringArray::from(document_ids)),
                Arc::new(StringArray::from(texts)),
                vector_array,
                Arc::new(StringArray::from(indexed_ats)),
            ],
        )
        .map_err(|e| StoreError::Insert(format!("build record batch: {e}")))
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
impl VectorIndex for LanceIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn ensure_namespace(&self) -> Result<(), StoreError> {
        info!("initializing lancedb at {:?}", self.db_path);

        if let Some(parent) = self.db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Init(format!("create db directory: {e}")))?;
        }

        let conn = self.get_connection().await?;

        let tables = conn
            .table_names()
            .execute()
            .await
            .map_err(|e| StoreError::Init(format!("list tables: {e}")))?;

        if !tables.contains(&EMBEDDINGS_TABLE.to_string()) {
            info!("creating embeddings table");
            let schema = Arc::new(self.schema());
            conn.create_empty_table(EMBEDDINGS_TABLE, schema)
                .execute()
                .await
                .map_err(|e| StoreError::Init(format!("create embeddings table: {e}")))?;
        }

        Ok(())
    }

    async fn upsert(&self, records: &[EmbeddingRecord]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        self.validate_dimensions(records)?;

        let table = self.get_table().await?;

        // Overwrite semantics: clear any rows sharing these identifiers.
        let id_list = records
            .iter()
            .map(|r| format!("'{}'", r.id))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = table.delete(&format!("record_id IN ({id_list})")).await;

        let batch = self.records_to_batch(records)?;
        let schema = batch.schema();
        let batches = RecordBatchIterator::new(vec![Ok(batch)], schema);

        table
            .add(Box::new(batches))
            .execute()
            .await
            .map_err(|e| StoreError::Insert(format!("insert records: {e}")))?;

        debug!(count = records.len(), "upserted records");
        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        scope: &ScopeFilter,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, StoreError> {
        debug!(top_k, scope = scope.key(), "vector search");

        let table = self.get_table().await?;
        let scope_clause = format!("scope_key = '{}'", escape_sql(scope.key()));

        let mut results = table
            .vector_search(query_vector.to_vec())
            .map_err(|e| StoreError::Query(format!("build search query: {e}")))?
            .distance_type(DistanceType::Cosine)
            .only_if(scope_clause)
            .limit(top_k)
            .execute()
            .await
            .map_err(|e| StoreError::Query(format!("execute search: {e}")))?;

        let mut hits = Vec::new();
        while let Some(batch) = results
            .try_next()
            .await
            .map_err(|e| StoreError::Query(format!("fetch results: {e}")))?
        {
            hits.extend(batch_to_hits(&batch)?);
        }

        debug!(found = hits.len(), "search complete");
        Ok(hits)
    }

    async fn delete_by_document(&self, document_id: Uuid) -> Result<u64, StoreError> {
        let table = self.get_table().await?;
        let clause = format!("document_id = '{document_id}'");

        // LanceDB's delete reports no row count; count matches first.
        let mut count = 0u64;
        let mut results = table
            .query()
            .only_if(clause.clone())
            .execute()
            .await
            .map_err(|e| StoreError::Query(format!("count document records: {e}")))?;

        while let Some(batch) = results
            .try_next()
            .await
            .map_err(|e| StoreError::Query(format!("count document records: {e}")))?
        {
            count += batch.num_rows() as u64;
        }

        table
            .delete(&clause)
            .await
            .map_err(|e| StoreError::Delete(format!("delete document records: {e}")))?;

        debug!(deleted = count, %document_id, "deleted document records");
        Ok(count)
    }

    async fn stats(&self) -> Result<IndexStats, StoreError> {
        let table = self.get_table().await?;

        let mut total = 0u64;
        let mut results = table
            .query()
            .only_if("record_id LIKE '%'")
            .execute()
            .await
            .map_err(|e| StoreError::Query(format!("count records: {e}")))?;

        while let Some(batch) = results
            .try_next()
            .await
            .map_err(|e| StoreError::Query(format!("count records: {e}")))?
        {
            total += batch.num_rows() as u64;
        }

        Ok(IndexStats {
            total_records: total,
            last_updated: Some(Utc::now()),
        })
    }
}

// ============================================================================
// Helper functions
// ============================================================================

fn escape_sql(value: &str) -> String {
    value.replace('\'', "''")
}

fn build_vector_array(records: &[EmbeddingRecord], dim: usize) -> ArrayRef {
    use arrow_array::builder::{FixedSizeListBuilder, Float32Builder};

    let mut builder = FixedSizeListBuilder::new(Float32Builder::new(), dim as i32);

    for record in records {
        let values = builder.values();
        for &v in &record.vector {
            values.append_value(v);
        }
        builder.append(true);
    }

    Arc::new(builder.finish())
}

fn batch_to_hits(batch: &RecordBatch) -> Result<Vec<SearchHit>, StoreError> {
    let record_ids = batch
        .column_by_name("record_id")
        .and_then(|c| c.as_any().downcast_ref::<StringArray>());
    let texts = batch
        .column_by_name("text")
        .and_then(|c| c.as_any().downcast_ref::<StringArray>());
    let document_ids = batch
        .column_by_name("document_id")
        .and_then(|c| c.as_any().downcast_ref::<StringArray>());
    let distances = batch
        .column_by_name("_distance")
        .and_then(|c| c.as_any().downcast_ref::<Float32Array>());

    let (Some(record_ids), Some(texts)) = (record_ids, texts) else {
        return Err(StoreError::Query("missing required columns".to_string()));
    };

    let mut hits = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        let document_id = document_ids.and_then(|arr| {
            if arr.is_null(i) {
                None
            } else {
                Uuid::parse_str(arr.value(i)).ok()
            }
        });

        // Cosine distance -> similarity.
        let score = distances.map_or(0.0, |d| 1.0 - d.value(i));

        hits.push(SearchHit {
            record_id: Uuid::parse_str(record_ids.value(i)).unwrap_or_default(),
            text: texts.value(i).to_string(),
            score,
            document_id,
        });
    }

    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const TEST_DIM: usize = 8;

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

    fn unit_vector(hot: usize) -> Vec<f32> {
        let mut v = vec![0.0; TEST_DIM];
        v[hot] = 1.0;
        v
    }

    fn scope(key: &str) -> ScopeFilter {
        ScopeFilter::new(key).unwrap()
    }

    #[tokio::test]
    async fn test_ensure_namespace_creates_table() {
        let temp = tempdir().unwrap();
        let index = LanceIndex::new(temp.path().join("test.lance"), TEST_DIM);

        index.ensure_namespace().await.unwrap();

        let conn = index.get_connection().await.unwrap();
        let tables = conn.table_names().execute().await.unwrap();
        assert!(tables.contains(&"embeddings".to_string()));
    }

    #[tokio::test]
    async fn test_ensure_namespace_is_idempotent() {
        let temp = tempdir().unwrap();
        let index = LanceIndex::new(temp.path().join("test.lance"), TEST_DIM);

        index.ensure_namespace().await.unwrap();
        index.ensure_namespace().await.unwrap();

        let stats = index.stats().await.unwrap();
        assert_eq!(stats.total_records, 0);
    }

    #[tokio::test]
    async fn test_upsert_and_search_roundtrip() {
        let temp = tempdir().unwrap();
        let index = LanceIndex::new(temp.path().join("test.lance"), TEST_DIM);
        index.ensure_namespace().await.unwrap();

        index
            .upsert(&[
                record("a", unit_vector(0), "about databases"),
                record("a", unit_vector(1), "about networking"),
            ])
            .await
            .unwrap();

        let hits = index.search(&unit_vector(0), &scope("a"), 2).await.unwrap();
        assert!(!hits.is_empty());
        assert_eq!(hits[0].text, "about databases");
    }

    #[tokio::test]
    async fn test_search_respects_scope() {
        let temp = tempdir().unwrap();
        let index = LanceIndex::new(temp.path().join("test.lance"), TEST_DIM);
        index.ensure_namespace().await.unwrap();

        index
            .upsert(&[
                record("tenant-a", unit_vector(0), "a data"),
                record("tenant-b", unit_vector(0), "b data"),
            ])
            .await
            .unwrap();

        let hits = index
            .search(&unit_vector(0), &scope("tenant-a"), 10)
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "a data");
    }

    #[tokio::test]
    async fn test_search_respects_top_k() {
        let temp = tempdir().unwrap();
        let index = LanceIndex::new(temp.path().join("test.lance"), TEST_DIM);
        index.ensure_namespace().await.unwrap();

        let records: Vec<_> = (0..6)
            .map(|i| record("a", unit_vector(i % TEST_DIM), &format!("text {i}")))
            .collect();
        index.upsert(&records).await.unwrap();

        let hits = index.search(&unit_vector(0), &scope("a"), 3).await.unwrap();
        assert!(hits.len() <= 3);
    }

    #[tokio::test]
    async fn test_upsert_empty_batch_is_noop() {
        let temp = tempdir().unwrap();
        let index = LanceIndex::new(temp.path().join("test.lance"), TEST_DIM);
        index.ensure_namespace().await.unwrap();

        index.upsert(&[]).await.unwrap();
        assert_eq!(index.stats().await.unwrap().total_records, 0);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected_before_write() {
        let temp = tempdir().unwrap();
        let index = LanceIndex::new(temp.path().join("test.lance"), TEST_DIM);
        index.ensure_namespace().await.unwrap();

        let err = index
            .upsert(&[record("a", vec![1.0, 2.0], "short vector")])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DimensionMismatch { .. }));

        assert_eq!(index.stats().await.unwrap().total_records, 0);
    }

    #[tokio::test]
    async fn test_delete_by_document() {
        let temp = tempdir().unwrap();
        let index = LanceIndex::new(temp.path().join("test.lance"), TEST_DIM);
        index.ensure_namespace().await.unwrap();

        let doc_id = Uuid::new_v4();
        let mut doc_record = record("a", unit_vector(0), "doc chunk");
        doc_record.document_id = Some(doc_id);

        index
            .upsert(&[doc_record, record("a", unit_vector(1), "unrelated")])
            .await
            .unwrap();

        let deleted = index.delete_by_document(doc_id).await.unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(index.stats().await.unwrap().total_records, 1);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_by_id() {
        let temp = tempdir().unwrap();
        let index = LanceIndex::new(temp.path().join("test.lance"), TEST_DIM);
        index.ensure_namespace().await.unwrap();

        let mut rec = record("a", unit_vector(0), "first version");
        index.upsert(&[rec.clone()]).await.unwrap();

        rec.text = "second version".to_string();
        index.upsert(&[rec]).await.unwrap();

        assert_eq!(index.stats().await.unwrap().total_records, 1);

        let hits = index.search(&unit_vector(0), &scope("a"), 1).await.unwrap();
        assert_eq!(hits[0].text, "second version");
    }

    #[test]
    fn test_escape_sql() {
        assert_eq!(escape_sql("plain"), "plain");
        assert_eq!(escape_sql("o'brien"), "o''brien");
    }
}
