//! Extractor registry: format dispatch and output finalization.

use docrag_core::{DocumentFormat, ExtractError, TextExtractor};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::csv::CsvExtractor;
use crate::dedup::dedupe_lines;
use crate::docx::DocxExtractor;
use crate::image::ImageExtractor;
use crate::ocr::OcrEngine;
use crate::pdf::PdfExtractor;
use crate::text::PlainTextExtractor;

/// Registry of format-specific extractors.
///
/// Dispatch is purely by [`DocumentFormat`] — from a caller-supplied hint or
/// the file extension. Unknown extensions fall back to plain text when the
/// bytes decode as UTF-8; otherwise extraction fails with
/// [`ExtractError::UnsupportedFormat`].
///
/// Every extractor's output goes through the same finalization: exact-match
/// line deduplication preserving first-seen order, then whitespace trim.
pub struct ExtractorRegistry {
    extractors: HashMap<DocumentFormat, Arc<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// Registry with every built-in extractor, sharing one OCR engine.
    #[must_use]
    pub fn with_defaults(ocr: Arc<dyn OcrEngine>) -> Self {
        let mut registry = Self::new();
        registry.register(PlainTextExtractor::new());
        registry.register(CsvExtractor::new());
        registry.register(DocxExtractor::new());
        registry.register(PdfExtractor::new(Arc::clone(&ocr)));
        registry.register(ImageExtractor::new(ocr));
        registry
    }

    /// Register an extractor under its format.
    pub fn register<E: TextExtractor + 'static>(&mut self, extractor: E) {
        self.extractors.insert(extractor.format(), Arc::new(extractor));
    }

    /// Get the extractor for a format.
    #[must_use]
    pub fn get(&self, format: DocumentFormat) -> Option<Arc<dyn TextExtractor>> {
        self.extractors.get(&format).cloned()
    }

    /// Extract a file's text, dispatching on the hint or the extension.
    pub async fn extract(
        &self,
        path: &Path,
        format_hint: Option<DocumentFormat>,
    ) -> Result<String, ExtractError> {
        let format = format_hint.or_else(|| DocumentFormat::from_path(path));

        let raw = match format.and_then(|f| self.get(f)) {
            Some(extractor) => {
                debug!(?path, format = %extractor.format(), "dispatching extraction");
                extractor.extract(path).await?
            }
            None => self.extract_unknown(path).await?,
        };

        Ok(dedupe_lines(&raw).trim().to_string())
    }

    /// Last resort for unknown extensions: accept the file only if its bytes
    /// decode as UTF-8 text.
    async fn extract_unknown(&self, path: &Path) -> Result<String, ExtractError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("<none>")
            .to_string();

        let bytes = tokio::fs::read(path).await?;
        match String::from_utf8(bytes) {
            Ok(text) => {
                debug!(?path, "unknown extension decoded as plain text");
                Ok(text)
            }
            Err(_) => Err(ExtractError::UnsupportedFormat(extension)),
        }
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
