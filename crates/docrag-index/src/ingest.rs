//! Ingestion service: extract → chunk → embed → upsert.

use docrag_core::{
    Chunker, DocumentFormat, EmbeddingRecord, Error, Result, ScopeFilter, StoreError, VectorIndex,
};
use docrag_embed::EmbedderPool;
use docrag_extract::ExtractorRegistry;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Result of indexing one document.
#[derive(Debug, Clone)]
pub struct IndexOutcome {
    /// Identifier assigned to the document's records.
    pub document_id: Uuid,
    /// Number of chunks upserted.
    pub chunk_count: u32,
}

/// Runs the upload path for one document at a time.
///
/// Shared, thread-safe: concurrent uploads for different documents interleave
/// freely because every record carries a fresh UUID.
pub struct IngestService {
    extractors: Arc<ExtractorRegistry>,
    chunker: Arc<dyn Chunker>,
    embedder: Arc<EmbedderPool>,
    index: Arc<dyn VectorIndex>,
}

impl IngestService {
    /// Create the service, failing fast if the embedder and index disagree
    /// on dimensionality.
    pub fn new(
        extractors: Arc<ExtractorRegistry>,
        chunker: Arc<dyn Chunker>,
        embedder: Arc<EmbedderPool>,
        index: Arc<dyn VectorIndex>,
    ) -> Result<Self> {
        if embedder.dimension() != index.dimension() {
            return Err(Error::Store(StoreError::DimensionMismatch {
                expected: index.dimension(),
                actual: embedder.dimension(),
            }));
        }

        Ok(Self {
            extractors,
            chunker,
            embedder,
            index,
        })
    }

    /// Index already-extracted text for a tenant scope.
    ///
    /// Chunks the text, embeds every chunk, and upserts the batch. On a
    /// failed upsert the document's records are deleted again, so the caller
    /// can retry the document as a unit.
    pub async fn index_document(
        &self,
        tenant_id: &str,
        scope_key: &str,
        text: &str,
    ) -> Result<IndexOutcome> {
        // Validate scoping up front; an unscoped record could never be
        // retrieved and would leak into no one's results.
        let _scope = ScopeFilter::new(scope_key)?;
        if tenant_id.trim().is_empty() {
            return Err(Error::InvalidScope(
                "tenant id must not be empty".to_string(),
            ));
        }

        let chunks = self.chunker.chunk(text)?;
        let document_id = Uuid::new_v4();

        debug!(
            %document_id,
            chunk_count = chunks.len(),
            tenant_id,
            "embedding document chunks"
        );

        let chunk_refs: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let vectors = self.embedder.embed_batch(&chunk_refs).await?;

        let records: Vec<EmbeddingRecord> = chunks
            .into_iter()
            .zip(vectors.into_iter())
            .map(|(text, vector)| EmbeddingRecord {
                id: Uuid::new_v4(),
                vector,
                tenant_id: tenant_id.to_string(),
                scope_key: scope_key.to_string(),
                text,
                document_id: Some(document_id),
            })
            .collect();

        let chunk_count = records.len() as u32;

        if let Err(e) = self.index.upsert(&records).await {
            // Roll back whatever landed so the document is retryable as a
            // unit rather than half-searchable.
            if let Err(cleanup) = self.index.delete_by_document(document_id).await {
                warn!(%document_id, "cleanup after failed upsert also failed: {cleanup}");
            }
            return Err(Error::Store(e));
        }

        info!(%document_id, chunk_count, tenant_id, "document indexed");

        Ok(IndexOutcome {
            document_id,
            chunk_count,
        })
    }

    /// Extract a file and index its text.
    pub async fn index_file(
        &self,
        tenant_id: &str,
        scope_key: &str,
        path: &Path,
        format_hint: Option<DocumentFormat>,
    ) -> Result<IndexOutcome> {
        let text = self.extractors.extract(path, format_hint).await?;
        self.index_document(tenant_id, scope_key, &text).await
    }
}
