//! Text extraction with per-format extractors.
//!
//! The registry maps file extensions to extractors and dispatches on the
//! extension of the input path. Unsupported extensions fail before the file
//! is opened.
//!
//! # Example
//!
//! ```no_run
//! use contract_check::extract::{ExtractOptions, ExtractorRegistry};
//! use std::path::Path;
//!
//! fn main() -> contract_check::Result<()> {
//!     let options = ExtractOptions::new().with_tesseract("/usr/local/bin/tesseract");
//!     let registry = ExtractorRegistry::with_defaults(&options);
//!
//!     let doc = registry.extract(Path::new("contract.pdf"))?;
//!     println!("{} ({})", doc.text, doc.format);
//!     Ok(())
//! }
//! ```

mod docx;
mod image;
mod ocr;
mod options;
mod pdf;

pub use docx::DocxExtractor;
pub use image::ImageExtractor;
pub use ocr::OcrEngine;
pub use options::{
    ExtractOptions, DEFAULT_MIN_TEXT_LAYER_CHARS, DEFAULT_OCR_LANGUAGES, DEFAULT_RENDER_DPI,
};
pub use pdf::{text_layer, PdfExtractor};

use crate::detect::{self, DocumentFormat};
use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Text produced by one extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Raw extracted text
    pub text: String,

    /// Format the text was actually read as
    pub format: DocumentFormat,
}

impl Extraction {
    /// Create a new extraction result.
    pub fn new(text: String, format: DocumentFormat) -> Self {
        Self { text, format }
    }
}

/// A document whose text has been read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedDocument {
    /// Source path
    pub path: PathBuf,

    /// Detected format
    pub format: DocumentFormat,

    /// Raw text, before normalization
    pub text: String,
}

/// Trait for format-specific text extractors.
///
/// Implement this trait to add support for another document format.
pub trait FormatExtractor: Send + Sync {
    /// Supported file extensions, lowercase without the leading dot.
    fn supported_extensions(&self) -> &[&str];

    /// Name of this extractor.
    fn name(&self) -> &str;

    /// Extract the full plain text of a file.
    fn extract(&self, path: &Path) -> Result<Extraction>;

    /// Check if this extractor supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry of format extractors keyed by extension.
pub struct ExtractorRegistry {
    extractors: HashMap<String, Arc<dyn FormatExtractor>>,
    by_name: HashMap<String, Arc<dyn FormatExtractor>>,
}

impl ExtractorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the DOCX, PDF and image extractors.
    pub fn with_defaults(options: &ExtractOptions) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DocxExtractor::new()));
        registry.register(Arc::new(PdfExtractor::new(options)));
        registry.register(Arc::new(ImageExtractor::new(options)));
        registry
    }

    /// Register an extractor for all of its extensions.
    pub fn register(&mut self, extractor: Arc<dyn FormatExtractor>) {
        for ext in extractor.supported_extensions() {
            self.extractors.insert(ext.to_lowercase(), extractor.clone());
        }
        self.by_name.insert(extractor.name().to_lowercase(), extractor);
    }

    /// Get an extractor by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn FormatExtractor>> {
        self.extractors.get(&ext.to_lowercase()).cloned()
    }

    /// Get an extractor by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn FormatExtractor>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.extractors.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.extractors.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Extract a document using the extractor registered for its extension.
    pub fn extract(&self, path: &Path) -> Result<ExtractedDocument> {
        let ext = detect::extension_of(path).ok_or_else(|| {
            Error::UnsupportedFormat(format!("{} has no extension", path.display()))
        })?;

        let extractor = self
            .get_by_extension(&ext)
            .ok_or_else(|| Error::UnsupportedFormat(ext.clone()))?;

        warn_on_content_mismatch(path, &ext);
        log::debug!("Extracting {} with '{}'", path.display(), extractor.name());

        let extraction = extractor.extract(path)?;
        Ok(ExtractedDocument {
            path: path.to_path_buf(),
            format: extraction.format,
            text: extraction.text,
        })
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults(&ExtractOptions::default())
    }
}

fn warn_on_content_mismatch(path: &Path, ext: &str) {
    let Some(expected) = detect::FileKind::from_extension(ext) else {
        return;
    };
    match detect::sniff_kind_from_path(path) {
        Ok(Some(actual)) if actual != expected => log::warn!(
            "{} has extension .{} but looks like {}",
            path.display(),
            ext,
            actual
        ),
        Ok(_) => {}
        Err(e) => log::debug!("Could not sniff {}: {}", path.display(), e),
    }
}

/// Extract the text of a file with default options.
///
/// # Example
///
/// ```no_run
/// let text = contract_check::extract_text("contract.docx").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    extract_text_with_options(path, &ExtractOptions::default())
}

/// Extract the text of a file with explicit options.
pub fn extract_text_with_options<P: AsRef<Path>>(
    path: P,
    options: &ExtractOptions,
) -> Result<String> {
    extract_document(path, options).map(|doc| doc.text)
}

/// Extract a file into an [`ExtractedDocument`].
pub fn extract_document<P: AsRef<Path>>(
    path: P,
    options: &ExtractOptions,
) -> Result<ExtractedDocument> {
    ExtractorRegistry::with_defaults(options).extract(path.as_ref())
}
