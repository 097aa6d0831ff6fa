//! Component traits for the docrag pipeline.
//!
//! - [`TextExtractor`]: raw file → plain text
//! - [`Chunker`]: plain text → ordered chunk texts
//! - [`Embedder`]: text batch → fixed-length vectors
//! - [`VectorIndex`]: record storage and scoped similarity search
//! - [`DocumentCatalog`] / [`BlobStorage`]: external collaborators
//!
//! All components are `Send + Sync` and shared via `Arc`: multiple in-flight
//! requests may call into the same instance concurrently.

use async_trait::async_trait;
use std::path::Path;
use uuid::Uuid;

use crate::error::{ChunkError, EmbedError, Error, ExtractError, StoreError};
use crate::types::{
    Document, DocumentFormat, EmbeddingRecord, IndexStats, ScopeFilter, SearchHit,
};

// ============================================================================
// Text extraction
// ============================================================================

/// Trait for extracting plain text from a file of one format.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// The format this extractor handles.
    fn format(&self) -> DocumentFormat;

    /// Extract the text content of a file.
    async fn extract(&self, path: &Path) -> Result<String, ExtractError>;
}

// ============================================================================
// Chunking
// ============================================================================

/// Trait for splitting extracted text into ordered chunks.
pub trait Chunker: Send + Sync {
    /// Maximum characters per chunk.
    fn max_chars(&self) -> usize;

    /// Split `text` into ordered chunk texts.
    ///
    /// Concatenating the returned chunks in order reproduces `text`.
    /// Empty input is rejected with [`ChunkError::EmptyDocument`].
    fn chunk(&self, text: &str) -> Result<Vec<String>, ChunkError>;
}

// ============================================================================
// Embedding
// ============================================================================

/// Trait for generating embeddings.
///
/// A deployment picks one implementation at startup for both indexing and
/// querying; vectors from different embedding spaces must never share an
/// index.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model name/identifier.
    fn model_name(&self) -> &str;

    /// Embedding dimensionality.
    fn dimension(&self) -> usize;

    /// Embed a batch of texts. Output length equals input length and every
    /// vector has [`Self::dimension`] elements, in input order.
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Embed a single query (a one-item batch).
    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, EmbedError> {
        let results = self.embed(&[query]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| EmbedError::Inference("empty embedding result".to_string()))
    }
}

// ============================================================================
// Vector index
// ============================================================================

/// Trait for vector storage and scoped similarity search.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Configured vector dimensionality.
    fn dimension(&self) -> usize;

    /// Idempotent creation of the backing collection (cosine metric).
    /// Safe to call repeatedly.
    async fn ensure_namespace(&self) -> Result<(), StoreError>;

    /// Insert or overwrite records by identifier.
    ///
    /// The whole batch is validated against the index dimensionality before
    /// anything is written; a mismatch fails the batch with
    /// [`StoreError::DimensionMismatch`].
    async fn upsert(&self, records: &[EmbeddingRecord]) -> Result<(), StoreError>;

    /// Nearest-neighbor search restricted to records whose `scope_key`
    /// matches `scope`. Returns at most `top_k` hits ordered by descending
    /// similarity; ties keep insertion order. An empty result set is a valid
    /// outcome, not an error.
    async fn search(
        &self,
        query_vector: &[f32],
        scope: &ScopeFilter,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, StoreError>;

    /// Delete all records belonging to a document. Returns the number of
    /// records removed.
    async fn delete_by_document(&self, document_id: Uuid) -> Result<u64, StoreError>;

    /// Index statistics.
    async fn stats(&self) -> Result<IndexStats, StoreError>;
}

// ============================================================================
// External collaborators
// ============================================================================

/// Document metadata store (external collaborator).
#[async_trait]
pub trait DocumentCatalog: Send + Sync {
    /// Persist document metadata.
    async fn save_document(&self, document: &Document) -> Result<(), Error>;

    /// List a tenant's documents.
    async fn list_documents(&self, tenant_id: &str) -> Result<Vec<Document>, Error>;
}

/// Raw-file storage (external collaborator).
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Read a stored file's bytes by storage reference.
    async fn read_file(&self, storage_ref: &str) -> Result<Vec<u8>, Error>;
}
