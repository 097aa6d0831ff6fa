//! # docrag-embed
//!
//! Embedding providers for the docrag pipeline.
//!
//! Two interchangeable backends implement [`docrag_core::Embedder`]:
//!
//! | Backend | Dimension | Properties |
//! |---------|-----------|------------|
//! | [`HashEmbedder`] | 384 | Deterministic, offline, no per-call cost |
//! | [`RemoteEmbedder`] | 1536 | Hosted `/embeddings` API, bearer auth, bounded timeout |
//!
//! A deployment picks **one** backend at startup (see [`EmbeddingBackend`])
//! and uses it for both indexing and querying. Vectors from different
//! embedding spaces must never share an index; no normalization bridges
//! incompatible spaces.
//!
//! ## Wrappers
//!
//! - [`EmbedderPool`]: semaphore-bounded concurrency over any embedder
//! - [`EmbeddingCache`]: blake3-keyed LRU cache over any embedder
//!
//! ```rust,ignore
//! use docrag_embed::{EmbedderPool, HashEmbedder};
//! use std::sync::Arc;
//!
//! let embedder = Arc::new(HashEmbedder::new());
//! let pool = EmbedderPool::new(embedder, 4);
//! let vectors = pool.embed_batch(&["hello world"]).await?;
//! assert_eq!(vectors[0].len(), 384);
//! ```

pub mod cache;
pub mod hash;
pub mod pool;
pub mod remote;

pub use cache::EmbeddingCache;
pub use hash::HashEmbedder;
pub use pool::EmbedderPool;
pub use remote::{RemoteConfig, RemoteEmbedder};

use serde::{Deserialize, Serialize};

/// Which embedding backend a deployment uses.
///
/// Fixed at startup; never swapped per request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Local deterministic hash-projection embedder (384 dims).
    #[default]
    Local,
    /// Hosted embedding API (1536 dims).
    Remote,
}
