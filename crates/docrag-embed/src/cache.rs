//! Embedding cache keyed by content hash.

use docrag_core::{EmbedError, Embedder};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

const DEFAULT_CACHE_SIZE: usize = 10_000;

#[derive(Clone)]
struct CacheEntry {
    vector: Vec<f32>,
    access_count: u64,
}

/// Cache statistics.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// LRU-ish cache over an embedder, keyed by blake3 content hash.
///
/// Identical texts (common after line deduplication across re-uploads) skip
/// recomputation. Eviction removes the least-recently-used tenth of entries
/// once the cache is full.
pub struct EmbeddingCache {
    embedder: Arc<dyn Embedder>,
    cache: RwLock<HashMap<String, CacheEntry>>,
    max_size: usize,
    access_counter: RwLock<u64>,
    stats: RwLock<CacheStats>,
}

impl EmbeddingCache {
    /// Create a cache with the default capacity.
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self::with_capacity(embedder, DEFAULT_CACHE_SIZE)
    }

    /// Create a cache with a custom capacity.
    pub fn with_capacity(embedder: Arc<dyn Embedder>, max_size: usize) -> Self {
        Self {
            embedder,
            cache: RwLock::new(HashMap::new()),
            max_size,
            access_counter: RwLock::new(0),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    fn hash_text(text: &str) -> String {
        blake3::hash(text.as_bytes()).to_hex().to_string()
    }

    async fn next_access(&self) -> u64 {
        let mut counter = self.access_counter.write().await;
        *counter += 1;
        *counter
    }

    async fn maybe_evict(&self) {
        let mut cache = self.cache.write().await;
        if cache.len() < self.max_size {
            return;
        }

        let evict_count = (self.max_size / 10).max(1);
        let mut entries: Vec<_> = cache
            .iter()
            .map(|(k, v)| (k.clone(), v.access_count))
            .collect();
        entries.sort_by_key(|(_, count)| *count);

        let mut stats = self.stats.write().await;
        for (key, _) in entries.into_iter().take(evict_count) {
            cache.remove(&key);
            stats.evictions += 1;
        }
    }

    /// Embed texts, serving cached vectors where possible.
    pub async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let mut results: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        let mut uncached_texts = Vec::new();
        let mut uncached_indices = Vec::new();

        {
            let cache = self.cache.read().await;
            let mut stats = self.stats.write().await;

            for (i, text) in texts.iter().enumerate() {
                let hash = Self::hash_text(text);
                if let Some(entry) = cache.get(&hash) {
                    stats.hits += 1;
                    results.push(Some(entry.vector.clone()));
                } else {
                    stats.misses += 1;
                    results.push(None);
                    uncached_texts.push(*text);
                    uncached_indices.push(i);
                }
            }
        }

        if !uncached_texts.is_empty() {
            debug!(
                cached = texts.len() - uncached_texts.len(),
                uncached = uncached_texts.len(),
                "embedding cache lookup"
            );

            let fresh = self.embedder.embed(&uncached_texts).await?;

            self.maybe_evict().await;

            let mut cache = self.cache.write().await;
            for (text, vector) in uncached_texts.iter().zip(fresh.iter()) {
                let access = self.next_access().await;
                cache.insert(
                    Self::hash_text(text),
                    CacheEntry {
                        vector: vector.clone(),
                        access_count: access,
                    },
                );
            }

            for (slot, vector) in uncached_indices.into_iter().zip(fresh.into_iter()) {
                results[slot] = Some(vector);
            }
        }

        Ok(results
            .into_iter()
            .map(|v| v.unwrap_or_default())
            .collect())
    }

    /// Current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }
}
