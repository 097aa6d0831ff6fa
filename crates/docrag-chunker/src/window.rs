//! Fixed-size window chunking.

use docrag_core::{ChunkError, Chunker};
use tracing::debug;

/// Default window size in characters.
pub const DEFAULT_MAX_CHARS: usize = 2000;

/// Chunker that slices text into consecutive non-overlapping character
/// windows.
///
/// Windows are measured in characters, not bytes, so multi-byte UTF-8
/// sequences are never split.
pub struct WindowChunker {
    max_chars: usize,
}

impl WindowChunker {
    /// Create a chunker with the given window size.
    pub fn new(max_chars: usize) -> Result<Self, ChunkError> {
        if max_chars == 0 {
            return Err(ChunkError::InvalidConfig(
                "max_chars must be > 0".to_string(),
            ));
        }
        Ok(Self { max_chars })
    }
}

impl Default for WindowChunker {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

impl Chunker for WindowChunker {
    fn max_chars(&self) -> usize {
        self.max_chars
    }

    fn chunk(&self, text: &str) -> Result<Vec<String>, ChunkError> {
        if text.is_empty() {
            return Err(ChunkError::EmptyDocument);
        }

        let mut chunks = Vec::new();
        let mut current = String::with_capacity(self.max_chars);
        let mut count = 0usize;

        for ch in text.chars() {
            current.push(ch);
            count += 1;
            if count == self.max_chars {
                chunks.push(std::mem::replace(
                    &mut current,
                    String::with_capacity(self.max_chars),
                ));
                count = 0;
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        debug!(
            chunk_count = chunks.len(),
            max_chars = self.max_chars,
            "chunked text"
        );
        Ok(chunks)
    }
}
