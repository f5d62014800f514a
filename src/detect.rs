//! Document format detection.
//!
//! Dispatch is decided by file extension alone. Magic bytes are only sniffed
//! to flag files whose content disagrees with their extension.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Extensions accepted by the default extractors (lowercase, no dot).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["docx", "pdf", "jpg", "jpeg", "png"];

/// Kind of input file, as implied by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Office Open XML word-processing document
    Docx,
    /// PDF, with or without a text layer
    Pdf,
    /// Raster image (JPEG or PNG)
    Image,
}

impl FileKind {
    /// Map a file extension (without the dot, any case) to a file kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "docx" => Some(FileKind::Docx),
            "pdf" => Some(FileKind::Pdf),
            "jpg" | "jpeg" | "png" => Some(FileKind::Image),
            _ => None,
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileKind::Docx => write!(f, "DOCX"),
            FileKind::Pdf => write!(f, "PDF"),
            FileKind::Image => write!(f, "image"),
        }
    }
}

/// Format of a document once its text has been obtained.
///
/// PDFs are split by whether an embedded text layer was usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Docx,
    TextPdf,
    ScannedPdf,
    Image,
}

impl DocumentFormat {
    /// Whether the text of this format came from OCR.
    pub fn is_ocr(&self) -> bool {
        matches!(self, DocumentFormat::ScannedPdf | DocumentFormat::Image)
    }

    /// The file kind this format was read from.
    pub fn file_kind(&self) -> FileKind {
        match self {
            DocumentFormat::Docx => FileKind::Docx,
            DocumentFormat::TextPdf | DocumentFormat::ScannedPdf => FileKind::Pdf,
            DocumentFormat::Image => FileKind::Image,
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentFormat::Docx => write!(f, "DOCX"),
            DocumentFormat::TextPdf => write!(f, "PDF (text layer)"),
            DocumentFormat::ScannedPdf => write!(f, "PDF (scanned)"),
            DocumentFormat::Image => write!(f, "image"),
        }
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8] = b"\xFF\xD8\xFF";

/// Lowercase extension of a path, if any.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Detect the file kind from a path's extension.
///
/// Does not touch the file system.
///
/// # Example
/// ```
/// use contract_check::detect::{detect_kind_from_path, FileKind};
///
/// assert_eq!(detect_kind_from_path("scan.JPG").unwrap(), FileKind::Image);
/// assert!(detect_kind_from_path("notes.txt").is_err());
/// ```
pub fn detect_kind_from_path<P: AsRef<Path>>(path: P) -> Result<FileKind> {
    let path = path.as_ref();
    let ext = extension_of(path).unwrap_or_default();
    FileKind::from_extension(&ext).ok_or_else(|| {
        if ext.is_empty() {
            Error::UnsupportedFormat(format!("{} has no extension", path.display()))
        } else {
            Error::UnsupportedFormat(ext)
        }
    })
}

/// Guess the file kind from leading bytes.
///
/// A ZIP header is reported as DOCX since that is the only ZIP-based
/// format accepted here.
pub fn sniff_kind_from_bytes(data: &[u8]) -> Option<FileKind> {
    if data.starts_with(PDF_MAGIC) {
        Some(FileKind::Pdf)
    } else if data.starts_with(ZIP_MAGIC) {
        Some(FileKind::Docx)
    } else if data.starts_with(PNG_MAGIC) || data.starts_with(JPEG_MAGIC) {
        Some(FileKind::Image)
    } else {
        None
    }
}

/// Guess the file kind from the first bytes of a file.
pub fn sniff_kind_from_path<P: AsRef<Path>>(path: P) -> Result<Option<FileKind>> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(16);
    file.take(16).read_to_end(&mut header)?;
    Ok(sniff_kind_from_bytes(&header))
}

/// Check whether a path has a supported extension.
pub fn is_supported<P: AsRef<Path>>(path: P) -> bool {
    extension_of(path.as_ref()).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}
