//! Image extractor (OCR).

use async_trait::async_trait;
use docrag_core::{DocumentFormat, ExtractError, TextExtractor};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::ocr::{preprocess_for_ocr, OcrEngine};

/// Extractor for plain image files.
///
/// OCR is the only text source for an image, so unlike the PDF path a
/// recognition failure here fails the extraction.
pub struct ImageExtractor {
    ocr: Arc<dyn OcrEngine>,
}

impl ImageExtractor {
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self { ocr }
    }
}

#[async_trait]
impl TextExtractor for ImageExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Image
    }

    async fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let bytes = tokio::fs::read(path).await?;
        let ocr = Arc::clone(&self.ocr);

        debug!(?path, engine = ocr.name(), "running ocr on image");

        tokio::task::spawn_blocking(move || {
            let img = image::load_from_memory(&bytes)
                .map_err(|e| ExtractError::Corrupt(format!("image decode: {e}")))?;
            let prepared = preprocess_for_ocr(&img);
            ocr.recognize(&prepared)
                .map_err(|e| ExtractError::Corrupt(e.to_string()))
        })
        .await
        .map_err(|e| ExtractError::Corrupt(format!("task join error: {e}")))?
    }
}
