//! Retrieval service.

use docrag_core::{Result, ScopeFilter, SearchHit, VectorIndex};
use docrag_embed::EmbedderPool;
use std::sync::Arc;
use tracing::debug;

/// Default number of chunks handed to the generation step.
pub const DEFAULT_TOP_K: usize = 3;

/// Query-time orchestrator: embed the question, search the index under the
/// caller's scope, return ranked chunk texts.
pub struct RetrievalService {
    embedder: Arc<EmbedderPool>,
    index: Arc<dyn VectorIndex>,
}

impl RetrievalService {
    /// Create the service over a shared embedder pool and vector index.
    pub fn new(embedder: Arc<EmbedderPool>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Retrieve the `top_k` most relevant chunk texts for a query.
    ///
    /// The plain text-handoff contract: scores and metadata are dropped.
    /// An empty result means no relevant context was found for this scope.
    pub async fn retrieve(
        &self,
        scope_key: &str,
        query_text: &str,
        top_k: usize,
    ) -> Result<Vec<String>> {
        let hits = self.retrieve_scored(scope_key, query_text, top_k).await?;
        Ok(hits.into_iter().map(|hit| hit.text).collect())
    }

    /// Extended contract: retrieve with scores preserved for caller-side
    /// thresholding.
    pub async fn retrieve_scored(
        &self,
        scope_key: &str,
        query_text: &str,
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        let scope = ScopeFilter::new(scope_key)?;

        let query_vector = self.embedder.embed_query(query_text).await?;

        debug!(scope = scope.key(), top_k, "executing retrieval");
        let hits = self.index.search(&query_vector, &scope, top_k).await?;
        debug!(found = hits.len(), "retrieval complete");

        Ok(hits)
    }
}
