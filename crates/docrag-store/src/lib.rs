//! # docrag-store
//!
//! Vector index backends implementing [`docrag_core::VectorIndex`].
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`MemoryIndex`] | brute-force cosine search, tests and development |
//! | [`LanceIndex`] | persistent `LanceDB` table, production |
//!
//! Both backends share the multi-tenancy contract: every search carries a
//! validated [`ScopeFilter`](docrag_core::ScopeFilter) and only records whose
//! `scope_key` matches are candidates. One shared collection holds all
//! tenants' records; isolation comes from the mandatory filter, not from
//! separate write paths.
//!
//! Dimensionality is fixed per index. Upsert validates every record's vector
//! length against it and fails the whole batch before writing anything.

pub mod lancedb;
pub mod memory;

pub use lancedb::LanceIndex;
pub use memory::MemoryIndex;
