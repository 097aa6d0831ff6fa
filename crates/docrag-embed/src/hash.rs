//! Local deterministic embedder based on token feature hashing.

use async_trait::async_trait;
use docrag_core::{EmbedError, Embedder};
use std::hash::Hasher;
use twox_hash::XxHash64;

/// Dimensionality of the local embedding space.
pub const LOCAL_DIMENSION: usize = 384;

/// Local, offline embedder.
///
/// Each text is tokenized on non-alphanumeric boundaries, lowercased, and
/// every token is hashed (XxHash64, seed 0) into one of `dimension` buckets
/// with a hash-derived sign. The accumulated vector is L2-normalized.
///
/// Properties relied on by the rest of the system:
/// - identical input batches produce bit-identical vectors across runs
/// - no network dependency and no per-call cost
/// - texts sharing vocabulary land close under cosine similarity
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Create an embedder with the default dimensionality (384).
    #[must_use]
    pub fn new() -> Self {
        Self {
            dimension: LOCAL_DIMENSION,
        }
    }

    /// Create an embedder with a custom dimensionality.
    #[must_use]
    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimension];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            let mut hasher = XxHash64::with_seed(0);
            hasher.write(token.as_bytes());
            let h = hasher.finish();

            let idx = (h as usize) % self.dimension;
            let sign = if h & (1 << 63) == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }

        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn model_name(&self) -> &str {
        "hash-projection"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_output_length_matches_input() {
        let embedder = HashEmbedder::new();
        let vectors = embedder.embed(&["one", "two", "three"]).await.unwrap();
        assert_eq!(vectors.len(), 3);
        for v in &vectors {
            assert_eq!(v.len(), LOCAL_DIMENSION);
        }
    }

    #[tokio::test]
    async fn test_deterministic_across_calls() {
        let embedder = HashEmbedder::new();
        let texts = ["the quick brown fox", "jumps over the lazy dog"];

        let first = embedder.embed(&texts).await.unwrap();
        let second = embedder.embed(&texts).await.unwrap();

        assert_eq!(first, second, "repeat runs must be bit-identical");
    }

    #[tokio::test]
    async fn test_vectors_are_normalized() {
        let embedder = HashEmbedder::new();
        let vectors = embedder
            .embed(&["normalize this sentence please"])
            .await
            .unwrap();
        let norm: f32 = vectors[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_shared_vocabulary_scores_higher() {
        let embedder = HashEmbedder::new();
        let vectors = embedder
            .embed(&[
                "solar panels convert sunlight into electricity",
                "solar panels generate electricity from sunlight",
                "medieval castles had thick defensive stone walls",
            ])
            .await
            .unwrap();

        let related = cosine(&vectors[0], &vectors[1]);
        let unrelated = cosine(&vectors[0], &vectors[2]);
        assert!(
            related > unrelated,
            "related texts should be closer: {related} vs {unrelated}"
        );
    }

    #[tokio::test]
    async fn test_identical_text_identical_vector() {
        let embedder = HashEmbedder::new();
        let vectors = embedder.embed(&["same text", "same text"]).await.unwrap();
        assert_eq!(vectors[0], vectors[1]);
    }

    #[tokio::test]
    async fn test_tokenization_ignores_case_and_punctuation() {
        let embedder = HashEmbedder::new();
        let vectors = embedder
            .embed(&["Hello, World!", "hello world"])
            .await
            .unwrap();
        assert_eq!(vectors[0], vectors[1]);
    }

    #[tokio::test]
    async fn test_no_tokens_yields_zero_vector() {
        let embedder = HashEmbedder::new();
        let vectors = embedder.embed(&["... --- ..."]).await.unwrap();
        assert!(vectors[0].iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let embedder = HashEmbedder::new();
        let vectors = embedder.embed(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }

    #[test]
    fn test_custom_dimension() {
        let embedder = HashEmbedder::with_dimension(64);
        assert_eq!(embedder.dimension(), 64);
    }

    #[test]
    fn test_model_name() {
        assert_eq!(HashEmbedder::new().model_name(), "hash-projection");
    }
}
