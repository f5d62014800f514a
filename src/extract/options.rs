//! Extraction options and OCR configuration.

use std::path::PathBuf;

/// Default OCR language set (Russian + English).
pub const DEFAULT_OCR_LANGUAGES: &str = "rus+eng";

/// Default page rendering resolution for scanned PDFs.
pub const DEFAULT_RENDER_DPI: u32 = 300;

/// A PDF text layer must be longer than this many characters to be used.
pub const DEFAULT_MIN_TEXT_LAYER_CHARS: usize = 20;

/// Options for extracting text from documents.
///
/// OCR programs are resolved from these paths on each call; nothing is
/// stored globally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Path or name of the `tesseract` executable
    pub tesseract_cmd: PathBuf,

    /// Path or name of the `pdftoppm` executable
    pub pdftoppm_cmd: PathBuf,

    /// Tesseract language set (e.g. "rus+eng")
    pub languages: String,

    /// Resolution used when rasterizing scanned PDF pages
    pub dpi: u32,

    /// Minimum text-layer length (exclusive) before falling back to OCR
    pub min_text_layer_chars: usize,
}

impl ExtractOptions {
    /// Create new extraction options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tesseract executable.
    pub fn with_tesseract(mut self, cmd: impl Into<PathBuf>) -> Self {
        self.tesseract_cmd = cmd.into();
        self
    }

    /// Set the pdftoppm executable.
    pub fn with_pdftoppm(mut self, cmd: impl Into<PathBuf>) -> Self {
        self.pdftoppm_cmd = cmd.into();
        self
    }

    /// Set OCR languages.
    pub fn with_languages(mut self, languages: impl Into<String>) -> Self {
        self.languages = languages.into();
        self
    }

    /// Set the rendering resolution for scanned pages.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the text-layer length threshold.
    pub fn with_min_text_layer_chars(mut self, chars: usize) -> Self {
        self.min_text_layer_chars = chars;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            tesseract_cmd: PathBuf::from("tesseract"),
            pdftoppm_cmd: PathBuf::from("pdftoppm"),
            languages: DEFAULT_OCR_LANGUAGES.to_string(),
            dpi: DEFAULT_RENDER_DPI,
            min_text_layer_chars: DEFAULT_MIN_TEXT_LAYER_CHARS,
        }
    }
}
