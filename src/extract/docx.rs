//! DOCX text extraction.

use crate::detect::DocumentFormat;
use crate::error::{Error, Result};
use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use std::path::Path;

use super::{Extraction, FormatExtractor};

/// Extracts body paragraphs from Word documents.
#[derive(Debug, Clone, Default)]
pub struct DocxExtractor {
    _private: (),
}

impl DocxExtractor {
    /// Create a new DOCX extractor.
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Extract text from an in-memory DOCX package.
    ///
    /// Body paragraphs are joined with `\n`; tables and headers are skipped.
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<String> {
        let doc = docx_rs::read_docx(bytes).map_err(|e| Error::Docx(e.to_string()))?;

        let paragraphs: Vec<String> = doc
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(para) => Some(paragraph_text(&para.children)),
                _ => None,
            })
            .collect();

        Ok(paragraphs.join("\n"))
    }
}

fn paragraph_text(children: &[ParagraphChild]) -> String {
    let mut output = String::new();
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(&run.children, &mut output),
            ParagraphChild::Hyperlink(link) => {
                for inner in &link.children {
                    if let ParagraphChild::Run(run) = inner {
                        push_run(&run.children, &mut output);
                    }
                }
            }
            _ => {}
        }
    }
    output
}

fn push_run(children: &[RunChild], output: &mut String) {
    for child in children {
        match child {
            RunChild::Text(text) => output.push_str(&text.text),
            RunChild::Tab(_) => output.push('\t'),
            RunChild::Break(_) => output.push('\n'),
            _ => {}
        }
    }
}

impl FormatExtractor for DocxExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["docx"]
    }

    fn name(&self) -> &str {
        "docx"
    }

    fn extract(&self, path: &Path) -> Result<Extraction> {
        let bytes = std::fs::read(path)?;
        let text = self.extract_bytes(&bytes)?;
        log::info!(
            "DOCX extracted: {} chars from {}",
            text.chars().count(),
            path.display()
        );
        Ok(Extraction::new(text, DocumentFormat::Docx))
    }
}
