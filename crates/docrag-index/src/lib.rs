//! # docrag-index
//!
//! Ingestion pipeline for docrag.
//!
//! [`IngestService`] wires the upload path together:
//!
//! ```text
//! file -> ExtractorRegistry -> Chunker -> EmbedderPool -> VectorIndex
//! ```
//!
//! Every component is injected at construction and shared via `Arc`; the
//! service itself is cheap to share across concurrent requests. If a
//! document fails partway through indexing, its records are removed so a
//! partially-indexed document is never silently discoverable.

pub mod ingest;

pub use ingest::{IndexOutcome, IngestService};
