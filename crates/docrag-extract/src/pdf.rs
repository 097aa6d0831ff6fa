//! PDF extractor.
//!
//! Merges three text sources, in order:
//!
//! 1. page-level selectable text (`pdf-extract`)
//! 2. table rows found in the text layer, re-serialized as comma-joined cells
//! 3. OCR output from embedded page images (`lopdf` image walk → grayscale +
//!    binarize → [`OcrEngine`])
//!
//! OCR failure is non-fatal: it is logged and extraction continues with the
//! text already gathered. A file the PDF parser cannot open at all fails
//! with [`ExtractError::Corrupt`].

use async_trait::async_trait;
use docrag_core::{DocumentFormat, ExtractError, TextExtractor};
use flate2::read::ZlibDecoder;
use lopdf::Document;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::ocr::{preprocess_for_ocr, OcrEngine};

/// Limits for embedded-image OCR.
const MAX_IMAGES: usize = 100;
const MAX_TOTAL_BYTES: usize = 50 * 1024 * 1024;
const MIN_DIMENSION: i64 = 50;

/// A text-layer line is treated as a table row when it splits into at least
/// this many gap-separated cells.
const MIN_TABLE_COLUMNS: usize = 3;

/// Extractor for PDF files.
pub struct PdfExtractor {
    ocr: Arc<dyn OcrEngine>,
}

impl PdfExtractor {
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self { ocr }
    }
}

#[async_trait]
impl TextExtractor for PdfExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    async fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        debug!(?path, "extracting pdf");

        let bytes = tokio::fs::read(path).await?;

        // Selectable text layer (blocking parse).
        let text = tokio::task::spawn_blocking({
            let bytes = bytes.clone();
            move || pdf_extract::extract_text_from_mem(&bytes)
        })
        .await
        .map_err(|e| ExtractError::Corrupt(format!("task join error: {e}")))?
        .map_err(|e| ExtractError::Corrupt(format!("pdf parse: {e}")))?;

        let table_rows = serialize_table_rows(&text);

        // OCR over embedded images; never fatal.
        let ocr = Arc::clone(&self.ocr);
        let ocr_text = tokio::task::spawn_blocking(move || ocr_embedded_images(&bytes, &*ocr))
            .await
            .unwrap_or_else(|e| {
                warn!("pdf ocr task failed: {e}");
                String::new()
            });

        let mut sections = vec![text];
        if !table_rows.is_empty() {
            sections.push(table_rows.join("\n"));
        }
        if !ocr_text.is_empty() {
            sections.push(ocr_text);
        }

        Ok(sections.join("\n"))
    }
}

/// Re-serialize table-looking lines as comma-joined cells.
///
/// The text layer renders table cells separated by runs of whitespace; lines
/// with [`MIN_TABLE_COLUMNS`] or more such cells are emitted again in the
/// original's `cell, cell, cell` form.
fn serialize_table_rows(text: &str) -> Vec<String> {
    let mut rows = Vec::new();

    for line in text.lines() {
        let normalized = line.replace('\t', "  ");
        let cells: Vec<&str> = normalized
            .split("  ")
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();

        if cells.len() >= MIN_TABLE_COLUMNS {
            rows.push(cells.join(", "));
        }
    }

    rows
}

/// Walk embedded images and OCR each one. Failures are logged and skipped.
fn ocr_embedded_images(bytes: &[u8], ocr: &dyn OcrEngine) -> String {
    let doc = match Document::load_mem(bytes) {
        Ok(d) => d,
        Err(e) => {
            warn!("failed to load pdf for image ocr: {e}");
            return String::new();
        }
    };

    let mut texts = Vec::new();
    let mut total_bytes = 0usize;
    let mut image_count = 0usize;

    for (page_num, page_id) in doc.get_pages() {
        if image_count >= MAX_IMAGES || total_bytes >= MAX_TOTAL_BYTES {
            break;
        }

        let page_images = match doc.get_page_images(page_id) {
            Ok(images) => images,
            Err(e) => {
                debug!("no images on page {page_num}: {e}");
                continue;
            }
        };

        for pdf_image in page_images {
            if image_count >= MAX_IMAGES || total_bytes >= MAX_TOTAL_BYTES {
                break;
            }

            if pdf_image.width < MIN_DIMENSION || pdf_image.height < MIN_DIMENSION {
                continue;
            }

            let Some(decoded) = decode_pdf_image(&pdf_image) else {
                continue;
            };

            image_count += 1;
            total_bytes += pdf_image.content.len();

            let prepared = preprocess_for_ocr(&decoded);
            match ocr.recognize(&prepared) {
                Ok(text) if !text.trim().is_empty() => texts.push(text.trim().to_string()),
                Ok(_) => {}
                Err(e) => {
                    warn!("ocr failed on page {page_num}: {e}");
                }
            }
        }
    }

    debug!(
        image_count,
        recognized = texts.len(),
        "pdf embedded-image ocr done"
    );
    texts.join("\n")
}

/// Decode an embedded PDF image into a `DynamicImage`.
fn decode_pdf_image(pdf_image: &lopdf::xobject::PdfImage) -> Option<image::DynamicImage> {
    let filters = pdf_image.filters.as_ref()?;

    if filters.iter().any(|f| f == "DCTDecode") {
        // JPEG content can be decoded directly.
        return image::load_from_memory(pdf_image.content).ok();
    }

    if filters.iter().any(|f| f == "FlateDecode") {
        return decode_flate_image(pdf_image);
    }

    debug!("unsupported image filter: {:?}", filters);
    None
}

/// Decompress `FlateDecode` raw pixels and rebuild the image.
fn decode_flate_image(pdf_image: &lopdf::xobject::PdfImage) -> Option<image::DynamicImage> {
    let mut decoder = ZlibDecoder::new(pdf_image.content);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed).ok()?;

    let color_space = pdf_image.color_space.as_deref().unwrap_or("DeviceRGB");
    let width = pdf_image.width as u32;
    let height = pdf_image.height as u32;

    match color_space {
        "DeviceGray" | "Gray" => image::GrayImage::from_raw(width, height, decompressed)
            .map(image::DynamicImage::ImageLuma8),
        _ => image::RgbImage::from_raw(width, height, decompressed)
            .map(image::DynamicImage::ImageRgb8),
    }
}
