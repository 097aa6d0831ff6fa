//! Core types for docrag.
//!
//! ## Documents
//! - [`Document`]: metadata for an uploaded unit of content
//! - [`DocumentFormat`]: detected file format, the extraction dispatch key
//!
//! ## Chunks & records
//! - [`TextChunk`]: a bounded slice of a document's extracted text
//! - [`EmbeddingRecord`]: the unit stored in the vector index
//!
//! ## Search
//! - [`ScopeFilter`]: mandatory tenant scope for every search
//! - [`SearchHit`]: a matching record with its similarity score
//! - [`IndexStats`]: vector index statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::error::Error;

// ============================================================================
// Documents
// ============================================================================

/// A user-owned unit of uploaded content. Immutable once stored; deleting a
/// document cascades to its records in the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier
    pub id: Uuid,
    /// Owning tenant identifier
    pub tenant_id: String,
    /// Original filename
    pub filename: String,
    /// Detected format
    pub format: DocumentFormat,
    /// Raw byte length of the uploaded file
    pub size_bytes: u64,
    /// When the document was uploaded
    pub uploaded_at: DateTime<Utc>,
}

/// Supported document formats. Extraction dispatches purely on this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Image,
    Csv,
    Text,
    Docx,
}

impl DocumentFormat {
    /// Detect the format from a file extension. Returns `None` for unknown
    /// extensions; callers decide whether to fall back to plain text.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|e| e.to_str())?.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "png" | "jpg" | "jpeg" => Some(Self::Image),
            "csv" => Some(Self::Csv),
            "txt" | "md" | "text" => Some(Self::Text),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::Csv => "csv",
            Self::Text => "text",
            Self::Docx => "docx",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// Chunks & records
// ============================================================================

/// A contiguous slice of a document's extracted text, bounded to a maximum
/// character length. `index` records the original sequence position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Source document identifier
    pub document_id: Uuid,
    /// Sequence position within the document (0-indexed)
    pub index: u32,
    /// The chunk text
    pub text: String,
}

/// The unit stored in the vector index.
///
/// `tenant_id` identifies the data owner; `scope_key` is the value searches
/// filter on. The two are distinct concerns even when a deployment sets them
/// to the same value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    /// Unique record identifier
    pub id: Uuid,
    /// Embedding vector; length must equal the index dimensionality
    pub vector: Vec<f32>,
    /// Owning tenant identifier
    pub tenant_id: String,
    /// Access-scope key used as the retrieval filter
    pub scope_key: String,
    /// Source text of the chunk
    pub text: String,
    /// Source document, if known
    pub document_id: Option<Uuid>,
}

// ============================================================================
// Search
// ============================================================================

/// Mandatory scope filter for vector searches.
///
/// Construction validates the key, so an unscoped search cannot be expressed:
/// every [`crate::VectorIndex::search`] call takes a `ScopeFilter` by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeFilter {
    key: String,
}

impl ScopeFilter {
    /// Create a scope filter, rejecting empty or whitespace-only keys.
    pub fn new(key: impl Into<String>) -> Result<Self, Error> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(Error::InvalidScope(
                "scope key must not be empty".to_string(),
            ));
        }
        Ok(Self { key })
    }

    /// The scope key records are matched against.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// A search result: a stored chunk text with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Matching record identifier
    pub record_id: Uuid,
    /// Stored chunk text
    pub text: String,
    /// Cosine similarity score, higher is more similar
    pub score: f32,
    /// Source document, if recorded
    pub document_id: Option<Uuid>,
}

/// Vector index statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    /// Total records stored
    pub total_records: u64,
    /// Last time the index was modified or inspected
    pub last_updated: Option<DateTime<Utc>>,
}
