//! Image OCR extraction.

use crate::detect::DocumentFormat;
use crate::error::Result;
use std::path::Path;

use super::{ExtractOptions, Extraction, FormatExtractor, OcrEngine};

/// Runs OCR directly on JPEG and PNG files.
#[derive(Debug, Clone, Default)]
pub struct ImageExtractor {
    ocr: OcrEngine,
}

impl ImageExtractor {
    /// Create a new image extractor.
    pub fn new(options: &ExtractOptions) -> Self {
        Self {
            ocr: OcrEngine::new(options),
        }
    }
}

impl FormatExtractor for ImageExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["jpg", "jpeg", "png"]
    }

    fn name(&self) -> &str {
        "image"
    }

    fn extract(&self, path: &Path) -> Result<Extraction> {
        let text = self.ocr.recognize_image(path)?;
        Ok(Extraction::new(text, DocumentFormat::Image))
    }
}
