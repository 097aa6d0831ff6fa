//! # docrag-query
//!
//! Retrieval orchestration: turn a question into the ranked chunk texts the
//! downstream generation step consumes.
//!
//! [`RetrievalService`] embeds the query (a single-item batch through the
//! same embedder used at indexing time) and searches the vector index under
//! a mandatory tenant scope. Zero matches return an empty vector — "no
//! relevant context found" is the caller's signal, never an error.

pub mod retriever;

pub use retriever::{RetrievalService, DEFAULT_TOP_K};
