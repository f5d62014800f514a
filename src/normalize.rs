//! Text normalization ahead of rule matching.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Options for text normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizeOptions {
    /// Compose Unicode to NFC before collapsing whitespace.
    ///
    /// OCR output sometimes carries decomposed letters (`и` + combining
    /// breve instead of `й`) that would otherwise miss substring rules.
    pub compose_unicode: bool,
}

impl NormalizeOptions {
    /// Create default options (no Unicode composition).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable NFC composition.
    pub fn with_compose_unicode(mut self, compose: bool) -> Self {
        self.compose_unicode = compose;
        self
    }
}

/// Collapses a document into a single line of space-separated words.
pub struct Normalizer {
    options: NormalizeOptions,
    whitespace: Regex,
}

impl Normalizer {
    /// Create a new normalizer with the given options.
    pub fn new(options: NormalizeOptions) -> Self {
        Self {
            options,
            whitespace: Regex::new(r"\s+").unwrap(),
        }
    }

    /// Normalize text.
    ///
    /// Non-breaking spaces and newlines become spaces, whitespace runs
    /// collapse to a single space and the ends are trimmed.
    pub fn normalize(&self, text: &str) -> String {
        let composed;
        let text = if self.options.compose_unicode {
            composed = text.nfc().collect::<String>();
            composed.as_str()
        } else {
            text
        };

        let text = text.replace('\u{a0}', " ").replace('\n', " ");
        self.whitespace.replace_all(&text, " ").trim().to_string()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizeOptions::default())
    }
}

/// Normalize text with default options.
///
/// # Example
/// ```
/// use contract_check::normalize;
///
/// assert_eq!(normalize("  Сумма:\u{a0}100\n\n₽ "), "Сумма: 100 ₽");
/// ```
pub fn normalize(text: &str) -> String {
    Normalizer::default().normalize(text)
}
