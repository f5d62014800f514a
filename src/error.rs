//! Error types for contract-check library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for contract-check operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting or checking a contract.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file extension is not one of the supported document formats.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// Error reading a DOCX package.
    #[error("DOCX error: {0}")]
    Docx(String),

    /// An external program (tesseract, pdftoppm) could not be located.
    #[error("Required tool not found: {}", .0.display())]
    ToolNotFound(PathBuf),

    /// The OCR engine or page renderer failed.
    #[error("OCR error: {0}")]
    Ocr(String),

    /// A ruble amount token could not be converted to an integer.
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),

    /// A DD.MM.YYYY token is not a valid calendar date.
    #[error("Invalid date: {0:?}")]
    InvalidDate(String),

    /// A numeric token could not be converted.
    #[error("Invalid number: {0:?}")]
    InvalidNumber(String),

    /// A rule pattern failed to compile.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The contract profile could not be loaded.
    #[error("Profile error: {0}")]
    Profile(String),

    /// Error loading or running the paragraph classifier.
    #[error("Model error: {0}")]
    Model(String),

    /// Error during report rendering.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::PdfParse(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Profile(err.to_string())
    }
}

#[cfg(feature = "bert")]
impl From<candle_core::Error> for Error {
    fn from(err: candle_core::Error) -> Self {
        Error::Model(err.to_string())
    }
}
