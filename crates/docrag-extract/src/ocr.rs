//! Pluggable OCR capability.
//!
//! OCR backends differ wildly in deployment weight (system tesseract,
//! bundled models, remote services), so recognition is a trait. Every engine
//! receives the same preprocessed input: a grayscale image binarized with a
//! fixed contrast threshold.

use image::{DynamicImage, GrayImage};
use thiserror::Error;

/// Threshold for binarization: pixels darker than this become black,
/// everything else white.
const BINARIZE_THRESHOLD: u8 = 150;

/// OCR errors.
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("ocr failed: {0}")]
    Failed(String),
}

/// Trait for optical character recognition over a preprocessed image.
pub trait OcrEngine: Send + Sync {
    /// Engine name for logs.
    fn name(&self) -> &str;

    /// Recognize text in a preprocessed (grayscale, binarized) image.
    fn recognize(&self, image: &GrayImage) -> Result<String, OcrError>;
}

/// Engine that recognizes nothing.
///
/// Deployments without an OCR backend use this; image-only documents then
/// extract no text and are rejected as empty downstream.
pub struct NoopOcr;

impl OcrEngine for NoopOcr {
    fn name(&self) -> &str {
        "noop"
    }

    fn recognize(&self, _image: &GrayImage) -> Result<String, OcrError> {
        Ok(String::new())
    }
}

/// Convert to grayscale and binarize for OCR contrast.
#[must_use]
pub fn preprocess_for_ocr(image: &DynamicImage) -> GrayImage {
    let mut gray = image.to_luma8();
    for pixel in gray.pixels_mut() {
        pixel.0[0] = if pixel.0[0] < BINARIZE_THRESHOLD {
            0
        } else {
            255
        };
    }
    gray
}
