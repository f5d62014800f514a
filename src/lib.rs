//! # contract-check
//!
//! Automated compliance checking for Russian-language service contracts.
//!
//! A contract file (DOCX, PDF with or without a text layer, or a scanned
//! image) is read into plain text, normalized, checked against a fixed
//! checklist of business rules and, optionally, split into paragraphs that
//! a trained text classifier labels by topic.
//!
//! ## Quick Start
//!
//! ```no_run
//! use contract_check::{check_contract, report};
//!
//! fn main() -> contract_check::Result<()> {
//!     let report = check_contract("contract.docx", &["Спецификация.pdf"], None)?;
//!     report::print_report(&report);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Format-aware extraction**: DOCX body text, PDF text layers, OCR via
//!   `tesseract` for scans and images
//! - **Rule checklist**: amounts, dates, required parties, signatures,
//!   prohibited terms and attachments
//! - **Configurable profile**: company data and limits from JSON
//! - **Paragraph classification**: BERT sequence classifier on CPU
//!   (feature `bert`, on by default)
//! - **Reports**: plain text and JSON

pub mod classify;
pub mod detect;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod report;
pub mod rules;

// Re-export commonly used types
pub use classify::{classify, split_paragraphs, ParagraphLabel, Prediction, TextClassifier};
pub use detect::{DocumentFormat, FileKind};
pub use error::{Error, Result};
pub use extract::{
    extract_document, extract_text, extract_text_with_options, ExtractOptions, ExtractedDocument,
    ExtractorRegistry, FormatExtractor,
};
pub use normalize::{normalize, NormalizeOptions, Normalizer};
pub use report::{CheckReport, JsonFormat};
pub use rules::{
    check_rules, ContractProfile, RuleChecker, RuleId, RuleOutcome, RuleResults, Verdict,
};

#[cfg(feature = "bert")]
pub use classify::BertClassifier;

use std::path::Path;

/// Check a contract file with the default profile and options.
///
/// `available_files` are attachment filenames supplied with the contract.
/// Paragraphs are classified only when a classifier is given.
///
/// # Example
///
/// ```no_run
/// use contract_check::{check_contract, RuleId};
///
/// let report = check_contract("contract.pdf", &["График работ.pdf"], None).unwrap();
/// println!("VAT mentioned: {:?}", report.rules.passed(RuleId::Vat));
/// ```
pub fn check_contract<P: AsRef<Path>, S: AsRef<str>>(
    path: P,
    available_files: &[S],
    classifier: Option<&dyn TextClassifier>,
) -> Result<CheckReport> {
    let mut check = ContractCheck::new().with_available_files(available_files);
    if let Some(classifier) = classifier {
        check = check.with_classifier(classifier);
    }
    check.check(path)
}

/// Builder for checking contracts.
///
/// # Example
///
/// ```no_run
/// use contract_check::{ContractCheck, ContractProfile, ExtractOptions};
///
/// let profile = ContractProfile::from_json_file("profile.json")?;
/// let report = ContractCheck::new()
///     .with_profile(profile)
///     .with_extract_options(ExtractOptions::new().with_languages("rus"))
///     .with_available_files(&["Спецификация.pdf"])
///     .check("contract.pdf")?;
/// # Ok::<(), contract_check::Error>(())
/// ```
pub struct ContractCheck<'a> {
    extract_options: ExtractOptions,
    registry: Option<ExtractorRegistry>,
    normalize_options: NormalizeOptions,
    profile: ContractProfile,
    available_files: Vec<String>,
    classifier: Option<&'a dyn TextClassifier>,
}

impl<'a> ContractCheck<'a> {
    /// Create a builder with default options and profile.
    pub fn new() -> Self {
        Self {
            extract_options: ExtractOptions::default(),
            registry: None,
            normalize_options: NormalizeOptions::default(),
            profile: ContractProfile::default(),
            available_files: Vec::new(),
            classifier: None,
        }
    }

    /// Set extraction options (OCR tools, languages, resolution).
    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extract_options = options;
        self
    }

    /// Use a custom extractor registry instead of the default one.
    pub fn with_registry(mut self, registry: ExtractorRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set normalization options.
    pub fn with_normalize_options(mut self, options: NormalizeOptions) -> Self {
        self.normalize_options = options;
        self
    }

    /// Set the contract profile.
    pub fn with_profile(mut self, profile: ContractProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Set attachment filenames supplied with the contract.
    pub fn with_available_files<S: AsRef<str>>(mut self, files: &[S]) -> Self {
        self.available_files = files.iter().map(|f| f.as_ref().to_string()).collect();
        self
    }

    /// Classify paragraphs with the given classifier.
    pub fn with_classifier(mut self, classifier: &'a dyn TextClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Extract, normalize and check a contract file.
    pub fn check<P: AsRef<Path>>(&self, path: P) -> Result<CheckReport> {
        let path = path.as_ref();
        let document = match &self.registry {
            Some(registry) => registry.extract(path)?,
            None => ExtractorRegistry::with_defaults(&self.extract_options).extract(path)?,
        };
        log::info!(
            "Extracted {} characters from {} ({})",
            document.text.chars().count(),
            path.display(),
            document.format
        );
        self.check_document(document)
    }

    /// Normalize and check an already extracted document.
    pub fn check_document(&self, document: ExtractedDocument) -> Result<CheckReport> {
        let text = Normalizer::new(self.normalize_options).normalize(&document.text);

        let checker = RuleChecker::new(self.profile.clone())?;
        let rules = checker.check(&text, self.available_files.as_slice())?;

        let paragraphs = match self.classifier {
            Some(classifier) => Some(classify(&text, classifier)?),
            None => None,
        };

        Ok(CheckReport {
            path: document.path,
            format: document.format,
            text,
            rules,
            paragraphs,
        })
    }
}

impl Default for ContractCheck<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct FixedClassifier;

    impl TextClassifier for FixedClassifier {
        fn predict(&self, _text: &str) -> Result<Prediction> {
            Ok(Prediction::new("OTHER", 0.5))
        }
    }

    fn document(text: &str) -> ExtractedDocument {
        ExtractedDocument {
            path: PathBuf::from("contract.docx"),
            format: DocumentFormat::Docx,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_check_document_normalizes() {
        let report = ContractCheck::new()
            .check_document(document("ООО «Ромашка»\n\nпечать\u{a0}и подпись"))
            .unwrap();
        assert_eq!(report.text, "ООО «Ромашка» печать и подпись");
        assert_eq!(report.rules.passed(RuleId::Stamp), Some(true));
        assert!(report.paragraphs.is_none());
    }

    #[test]
    fn test_check_document_with_classifier() {
        let classifier = FixedClassifier;
        let report = ContractCheck::new()
            .with_classifier(&classifier)
            .check_document(document("Первый. Второй."))
            .unwrap();
        let paragraphs = report.paragraphs.unwrap();
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[1].paragraph, "Второй.");
    }

    #[test]
    fn test_available_files() {
        let report = ContractCheck::new()
            .with_available_files(&["График работ.pdf"])
            .check_document(document(""))
            .unwrap();
        assert_eq!(report.rules.attachment("График работ"), Some(true));
        assert_eq!(report.rules.attachment("Спецификация"), Some(false));
    }

    #[test]
    fn test_invalid_amount_aborts() {
        let result = ContractCheck::new().check_document(document("сумма ₽"));
        assert!(matches!(result, Err(Error::InvalidAmount(_))));
    }

    #[test]
    fn test_unsupported_format() {
        let result = check_contract("/nonexistent/contract.odt", &[] as &[&str], None);
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }
}
