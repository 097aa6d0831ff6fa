//! Plain-text extractor.

use async_trait::async_trait;
use docrag_core::{DocumentFormat, ExtractError, TextExtractor};
use std::path::Path;
use tokio::fs;

/// Extractor for plain text files.
///
/// Reads bytes and decodes them lossily, mirroring an `errors="ignore"`
/// text read: invalid sequences become replacement characters instead of
/// failing the whole document.
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Text
    }

    async fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let bytes = fs::read(path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
