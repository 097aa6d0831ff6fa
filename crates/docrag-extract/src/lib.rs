//! # docrag-extract
//!
//! Text extraction for the docrag indexing pipeline.
//!
//! Converts a raw uploaded file into a single plain-text string, dispatching
//! purely on the detected [`DocumentFormat`](docrag_core::DocumentFormat).
//!
//! ## Supported formats
//!
//! | Extractor | Formats | Sources |
//! |-----------|---------|---------|
//! | [`PdfExtractor`] | `.pdf` | selectable text + table rows + OCR of embedded page images |
//! | [`ImageExtractor`] | `.png`, `.jpg`, `.jpeg` | OCR |
//! | [`CsvExtractor`] | `.csv` | row-wise comma-joined cells |
//! | [`PlainTextExtractor`] | `.txt`, `.md` | lossy UTF-8 read |
//! | [`DocxExtractor`] | `.docx` | paragraph concatenation |
//!
//! The [`ExtractorRegistry`] routes files to extractors, falls back to plain
//! text for unknown extensions when the bytes decode as UTF-8, and applies
//! the final whole-line deduplication + trim to every extractor's output.
//!
//! ## OCR
//!
//! OCR is a pluggable capability behind the [`OcrEngine`] trait. Images are
//! preprocessed the same way for every engine: grayscale conversion followed
//! by binary thresholding for contrast. The default [`NoopOcr`] recognizes
//! nothing, so deployments without an OCR backend still get selectable text.
//! OCR failure inside PDF extraction is non-fatal and logged; extraction
//! continues with whatever text was already gathered.

pub mod csv;
pub mod dedup;
pub mod docx;
pub mod image;
pub mod ocr;
pub mod pdf;
pub mod registry;
pub mod text;

pub use csv::CsvExtractor;
pub use dedup::dedupe_lines;
pub use docx::DocxExtractor;
pub use image::ImageExtractor;
pub use ocr::{preprocess_for_ocr, NoopOcr, OcrEngine, OcrError};
pub use pdf::PdfExtractor;
pub use registry::ExtractorRegistry;
pub use text::PlainTextExtractor;
