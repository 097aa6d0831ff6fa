//! # docrag-chunker
//!
//! Fixed-size character windowing for the docrag indexing pipeline.
//!
//! Extracted text is sliced into consecutive non-overlapping windows of at
//! most `max_chars` characters. The last window may be shorter. Chunk order
//! is insertion order; concatenating the chunks reproduces the input exactly.
//!
//! ```rust
//! use docrag_chunker::WindowChunker;
//! use docrag_core::Chunker;
//!
//! let chunker = WindowChunker::new(4).unwrap();
//! let chunks = chunker.chunk("abcdefghij").unwrap();
//! assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
//! ```

pub mod window;

pub use window::WindowChunker;
