//! Error types for the docrag pipeline.

use thiserror::Error;

/// Main error type for docrag operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Text extraction failed
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractError),

    /// Chunking failed
    #[error("chunking error: {0}")]
    Chunking(#[from] ChunkError),

    /// Embedding generation failed
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbedError),

    /// Vector index operation failed
    #[error("index error: {0}")]
    Store(#[from] StoreError),

    /// Missing or malformed tenant scope
    #[error("invalid scope: {0}")]
    InvalidScope(String),

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Text extraction errors.
///
/// Extraction failures are deterministic for a given input (a corrupt file
/// stays corrupt) and are surfaced to the caller unretried.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The extension matches no known handler and the bytes are not text.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A format-specific library could not parse the file at all.
    #[error("extraction failed: {0}")]
    Corrupt(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Chunking errors.
#[derive(Error, Debug)]
pub enum ChunkError {
    /// The document yielded no extractable text.
    #[error("document contains no extractable text")]
    EmptyDocument,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Embedding errors.
///
/// Never retried inside the embedding component; retry policy, if any,
/// belongs to the caller.
#[derive(Error, Debug)]
pub enum EmbedError {
    /// Local inference failed.
    #[error("inference failed: {0}")]
    Inference(String),

    /// The remote embedding API rejected the request.
    #[error("embedding api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The remote embedding API could not be reached.
    #[error("embedding network error: {0}")]
    Network(String),

    /// No API credential configured for the remote backend.
    #[error("embedding api key is not configured")]
    MissingApiKey,
}

/// Vector index errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The index backend cannot be reached. Distinct from an empty result
    /// set, and the one category a caller may retry with backoff.
    #[error("index unavailable: {0}")]
    Unavailable(String),

    /// A record's vector does not match the index dimensionality.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("index initialization failed: {0}")]
    Init(String),

    #[error("upsert failed: {0}")]
    Insert(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("delete failed: {0}")]
    Delete(String),

    #[error("schema error: {0}")]
    Schema(String),
}

/// Result type alias for docrag operations.
pub type Result<T> = std::result::Result<T, Error>;
