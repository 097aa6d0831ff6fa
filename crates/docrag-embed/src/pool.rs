//! Embedder pool for concurrent embedding operations.

use docrag_core::{EmbedError, Embedder};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Wraps an embedder with a semaphore bounding concurrent inference.
///
/// The pool is shared by every in-flight upload and query; the semaphore
/// keeps embedding from monopolizing worker threads.
pub struct EmbedderPool {
    embedder: Arc<dyn Embedder>,
    semaphore: Semaphore,
    max_concurrent: usize,
}

impl EmbedderPool {
    /// Create a new pool around an embedder.
    pub fn new(embedder: Arc<dyn Embedder>, max_concurrent: usize) -> Self {
        Self {
            embedder,
            semaphore: Semaphore::new(max_concurrent),
            max_concurrent,
        }
    }

    /// The embedding dimensionality of the wrapped backend.
    pub fn dimension(&self) -> usize {
        self.embedder.dimension()
    }

    /// The wrapped backend's model name.
    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }

    /// The underlying embedder.
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        Arc::clone(&self.embedder)
    }

    /// Embed a batch of texts.
    pub async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| EmbedError::Inference(format!("semaphore error: {e}")))?;

        self.embedder.embed(texts).await
    }

    /// Embed a single query.
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>, EmbedError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| EmbedError::Inference(format!("semaphore error: {e}")))?;

        self.embedder.embed_query(query).await
    }

    /// Currently available permits.
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Configured concurrency bound.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashEmbedder;

    #[tokio::test]
    async fn test_pool_creation() {
        let pool = EmbedderPool::new(Arc::new(HashEmbedder::new()), 4);
        assert_eq!(pool.dimension(), 384);
        assert_eq!(pool.model_name(), "hash-projection");
        assert_eq!(pool.max_concurrent(), 4);
        assert_eq!(pool.available_permits(), 4);
    }

    #[tokio::test]
    async fn test_embed_batch_through_pool() {
        let pool = EmbedderPool::new(Arc::new(HashEmbedder::new()), 2);
        let vectors = pool.embed_batch(&["alpha", "beta"]).await.unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0].len(), 384);
    }

    #[tokio::test]
    async fn test_embed_query_through_pool() {
        let pool = EmbedderPool::new(Arc::new(HashEmbedder::new()), 2);
        let vector = pool.embed_query("a question").await.unwrap();
        assert_eq!(vector.len(), 384);
    }

    #[tokio::test]
    async fn test_permits_are_returned_after_use() {
        let pool = Arc::new(EmbedderPool::new(Arc::new(HashEmbedder::new()), 2));

        let p1 = Arc::clone(&pool);
        let p2 = Arc::clone(&pool);
        let h1 = tokio::spawn(async move { p1.embed_query("one").await });
        let h2 = tokio::spawn(async move { p2.embed_query("two").await });

        h1.await.unwrap().unwrap();
        h2.await.unwrap().unwrap();

        assert_eq!(pool.available_permits(), 2);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let pool = EmbedderPool::new(Arc::new(HashEmbedder::new()), 1);
        let vectors = pool.embed_batch(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }
}
