//! Integration tests for text extraction.

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use contract_check::detect::DocumentFormat;
use contract_check::error::{Error, Result};
use contract_check::extract::{
    extract_document, extract_text, DocxExtractor, ExtractOptions, Extraction, ExtractorRegistry,
    FormatExtractor,
};
use docx_rs::{Docx, Paragraph, Run};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// Mock extractor for testing.
struct MockExtractor {
    extensions: Vec<&'static str>,
    name: &'static str,
}

impl MockExtractor {
    fn new(extensions: Vec<&'static str>, name: &'static str) -> Self {
        Self { extensions, name }
    }
}

impl FormatExtractor for MockExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &self.extensions
    }

    fn name(&self) -> &str {
        self.name
    }

    fn extract(&self, path: &Path) -> Result<Extraction> {
        Ok(Extraction::new(
            format!("Extracted {} by {}", path.display(), self.name),
            DocumentFormat::Docx,
        ))
    }
}

fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let mut docx = Docx::new();
    for text in paragraphs {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)));
    }
    let mut cursor = Cursor::new(Vec::new());
    docx.build().pack(&mut cursor).unwrap();
    cursor.into_inner()
}

/// Write a one-page PDF. `None` leaves the page without text.
fn write_pdf(path: &Path, text: Option<&str>) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let operations = match text {
        Some(text) => vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
        None => vec![],
    };
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

fn missing_tools() -> ExtractOptions {
    ExtractOptions::new()
        .with_tesseract("/nonexistent/bin/tesseract-missing")
        .with_pdftoppm("/nonexistent/bin/pdftoppm-missing")
}

#[test]
fn test_extract_options_builder() {
    let options = ExtractOptions::new()
        .with_tesseract("/opt/tesseract/bin/tesseract")
        .with_languages("rus")
        .with_dpi(150)
        .with_min_text_layer_chars(5);

    assert_eq!(options.tesseract_cmd, Path::new("/opt/tesseract/bin/tesseract"));
    assert_eq!(options.pdftoppm_cmd, Path::new("pdftoppm"));
    assert_eq!(options.languages, "rus");
    assert_eq!(options.dpi, 150);
    assert_eq!(options.min_text_layer_chars, 5);
}

#[test]
fn test_registry_new_is_empty() {
    let registry = ExtractorRegistry::new();
    assert!(!registry.supports("pdf"));
    assert!(!registry.supports("docx"));
    assert!(registry.supported_extensions().is_empty());
}

#[test]
fn test_registry_register() {
    let mut registry = ExtractorRegistry::new();
    registry.register(Arc::new(MockExtractor::new(vec!["txt", "text"], "plain")));

    assert!(registry.supports("txt"));
    assert!(registry.supports("TEXT"));
    assert!(!registry.supports("pdf"));
    assert_eq!(registry.get_by_name("plain").unwrap().name(), "plain");
}

#[test]
fn test_registry_override() {
    let mut registry = ExtractorRegistry::with_defaults(&ExtractOptions::default());
    registry.register(Arc::new(MockExtractor::new(vec!["pdf"], "mock-pdf")));

    let extractor = registry.get_by_extension("PDF").unwrap();
    assert_eq!(extractor.name(), "mock-pdf");
}

#[test]
fn test_registry_dispatch_by_extension() {
    let mut registry = ExtractorRegistry::new();
    registry.register(Arc::new(MockExtractor::new(vec!["docx"], "mock")));

    // the file does not exist; the mock never opens it
    let doc = registry.extract(Path::new("/nonexistent/Договор.DOCX")).unwrap();
    assert_eq!(doc.format, DocumentFormat::Docx);
    assert!(doc.text.ends_with("by mock"));
}

#[test]
fn test_supports_extension_case_insensitive() {
    let extractor = DocxExtractor::new();
    assert!(extractor.supports_extension("docx"));
    assert!(extractor.supports_extension("DOCX"));
    assert!(!extractor.supports_extension("doc"));
}

#[test]
fn test_unsupported_extension() {
    for path in ["/nonexistent/contract.txt", "/nonexistent/contract.doc"] {
        let result = extract_text(path);
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))), "{}", path);
    }
}

#[test]
fn test_docx_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contract.docx");
    std::fs::write(&path, docx_bytes(&["first", "second"])).unwrap();

    let doc = extract_document(&path, &ExtractOptions::default()).unwrap();
    assert_eq!(doc.format, DocumentFormat::Docx);
    assert_eq!(doc.text, "first\nsecond");
    assert_eq!(doc.path, path);
}

#[test]
fn test_docx_cyrillic() {
    let bytes = docx_bytes(&["Договор № 1", "ООО «Ромашка»"]);
    let text = DocxExtractor::new().extract_bytes(&bytes).unwrap();
    assert_eq!(text, "Договор № 1\nООО «Ромашка»");
}

#[test]
fn test_docx_invalid_package() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.docx");
    std::fs::write(&path, b"not a zip archive").unwrap();

    let result = extract_text(&path);
    assert!(matches!(result, Err(Error::Docx(_))));
}

#[test]
fn test_image_without_tesseract() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.png");
    std::fs::write(&path, b"\x89PNG\r\n\x1a\n").unwrap();

    let result = extract_document(&path, &missing_tools());
    assert!(matches!(result, Err(Error::ToolNotFound(_))));
}

#[test]
fn test_missing_docx_file() {
    let result = extract_text("/nonexistent/contract.docx");
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_pdf_text_layer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contract.pdf");
    write_pdf(&path, Some("Service contract with VAT included"));

    // the text layer is used, so missing OCR tools do not matter
    let doc = extract_document(&path, &missing_tools()).unwrap();
    assert_eq!(doc.format, DocumentFormat::TextPdf);
    let words: Vec<&str> = doc.text.split_whitespace().collect();
    assert_eq!(words.join(" "), "Service contract with VAT included");
}

#[test]
fn test_pdf_without_text_falls_back_to_ocr() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.pdf");
    write_pdf(&path, None);

    let result = extract_document(&path, &missing_tools());
    match result {
        Err(Error::ToolNotFound(tool)) => {
            assert_eq!(tool, Path::new("/nonexistent/bin/pdftoppm-missing"));
        }
        other => panic!("expected ToolNotFound, got {:?}", other.map(|d| d.format)),
    }
}
