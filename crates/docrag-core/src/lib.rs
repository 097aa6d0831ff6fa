//! # docrag-core
//!
//! Core types and traits for the docrag retrieval backend.
//!
//! docrag turns uploaded documents into searchable vector representations and
//! answers queries by returning the most relevant text chunks for a tenant
//! scope. This crate provides the foundational abstractions shared by every
//! pipeline stage:
//!
//! - **Text extraction**: [`TextExtractor`] turns a raw file into plain text
//! - **Chunking**: [`Chunker`] splits extracted text into bounded windows
//! - **Embedding**: [`Embedder`] maps text batches to fixed-length vectors
//! - **Vector storage**: [`VectorIndex`] stores records and runs scoped
//!   nearest-neighbor search
//!
//! ## Architecture
//!
//! ```text
//! upload: file -> TextExtractor -> Chunker -> Embedder -> VectorIndex
//! query:  text -> Embedder -> VectorIndex (scope filter) -> ranked chunks
//! ```
//!
//! Collaborators outside the core (document metadata, raw-file storage) are
//! represented by the [`DocumentCatalog`] and [`BlobStorage`] traits.
//!
//! ## Related Crates
//!
//! - `docrag-extract`: format-specific extractors and OCR
//! - `docrag-chunker`: fixed-size character windowing
//! - `docrag-embed`: local and remote embedding providers
//! - `docrag-store`: in-memory and `LanceDB` vector index backends
//! - `docrag-index`: ingestion pipeline
//! - `docrag-query`: retrieval orchestration

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ChunkError, EmbedError, Error, ExtractError, Result, StoreError};
pub use traits::*;
pub use types::*;
