//! PDF text extraction with OCR fallback for scanned documents.

use crate::detect::DocumentFormat;
use crate::error::Result;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use super::{ExtractOptions, Extraction, FormatExtractor, OcrEngine};

/// PDF extractor.
///
/// Uses the embedded text layer when it is long enough, otherwise renders
/// each page and runs OCR.
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    ocr: OcrEngine,
    min_text_layer_chars: usize,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new(options: &ExtractOptions) -> Self {
        Self {
            ocr: OcrEngine::new(options),
            min_text_layer_chars: options.min_text_layer_chars,
        }
    }

    /// Whether a text layer is long enough to skip OCR.
    pub fn has_usable_text_layer(&self, text: &str) -> bool {
        text.chars().count() > self.min_text_layer_chars
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new(&ExtractOptions::default())
    }
}

/// Read the embedded text layer, trimmed.
///
/// Any failure, including a panic inside the PDF library on malformed
/// fonts, yields an empty string.
pub fn text_layer(path: &Path) -> String {
    match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text(path))) {
        Ok(Ok(text)) => text.trim().to_string(),
        Ok(Err(e)) => {
            log::warn!("Text layer extraction failed for {}: {}", path.display(), e);
            String::new()
        }
        Err(_) => {
            log::warn!(
                "Text layer extraction panicked for {}, treating as scanned",
                path.display()
            );
            String::new()
        }
    }
}

impl FormatExtractor for PdfExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn name(&self) -> &str {
        "pdf"
    }

    fn extract(&self, path: &Path) -> Result<Extraction> {
        let text = text_layer(path);
        if self.has_usable_text_layer(&text) {
            log::info!(
                "PDF text layer: {} chars from {}",
                text.chars().count(),
                path.display()
            );
            return Ok(Extraction::new(text, DocumentFormat::TextPdf));
        }

        log::debug!(
            "PDF text layer too short ({} chars), falling back to OCR",
            text.chars().count()
        );
        let text = self.ocr.recognize_pdf(path)?;
        Ok(Extraction::new(text, DocumentFormat::ScannedPdf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extractor_name() {
        let extractor = PdfExtractor::default();
        assert_eq!(extractor.name(), "pdf");
        assert!(extractor.supports_extension("PDF"));
    }

    #[test]
    fn test_text_layer_threshold() {
        let extractor = PdfExtractor::default();
        assert!(!extractor.has_usable_text_layer(""));
        // exactly 20 characters is not enough
        assert!(!extractor.has_usable_text_layer("12345678901234567890"));
        assert!(extractor.has_usable_text_layer("123456789012345678901"));
        // counted in characters, not bytes
        assert!(!extractor.has_usable_text_layer("Договор подряда №1"));
    }

    #[test]
    fn test_text_layer_missing_file() {
        assert_eq!(text_layer(Path::new("/nonexistent/contract.pdf")), "");
    }
}
