//! Paragraph classification.
//!
//! Text is split into sentence-like paragraphs and each one is labeled by a
//! [`TextClassifier`]. The bundled [`BertClassifier`] (feature `bert`) runs a
//! fine-tuned BERT sequence classifier on CPU; tests and callers can plug in
//! any other implementation.

#[cfg(feature = "bert")]
mod bert;

#[cfg(feature = "bert")]
pub use bert::{BertClassifier, DEFAULT_MODEL_DIR};

use crate::error::Result;
use regex::Regex;
use serde::Serialize;

/// Top prediction for one input.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    /// Probability in `[0, 1]`
    pub score: f32,
}

impl Prediction {
    /// Create a prediction, clamping the score into `[0, 1]`.
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score: score.clamp(0.0, 1.0),
        }
    }
}

/// A model that labels a single piece of text.
pub trait TextClassifier {
    /// Return the top label for `text`.
    fn predict(&self, text: &str) -> Result<Prediction>;
}

impl<T: TextClassifier + ?Sized> TextClassifier for &T {
    fn predict(&self, text: &str) -> Result<Prediction> {
        (**self).predict(text)
    }
}

impl<T: TextClassifier + ?Sized> TextClassifier for Box<T> {
    fn predict(&self, text: &str) -> Result<Prediction> {
        (**self).predict(text)
    }
}

/// A labeled paragraph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParagraphLabel {
    pub paragraph: String,
    pub label: String,
    pub score: f32,
}

/// Split text after sentence-ending punctuation followed by spaces.
///
/// The punctuation stays with the preceding paragraph. Fragments are
/// trimmed and empty ones dropped.
///
/// ```
/// use contract_check::classify::split_paragraphs;
///
/// let parts = split_paragraphs("Первый пункт. Второй пункт!  Третий?");
/// assert_eq!(parts, vec!["Первый пункт.", "Второй пункт!", "Третий?"]);
/// ```
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    let boundary = Regex::new(r"[.!?] +").unwrap();

    let mut paragraphs = Vec::new();
    let mut start = 0;
    for m in boundary.find_iter(text) {
        // punctuation is a single ASCII byte
        push_trimmed(&mut paragraphs, &text[start..m.start() + 1]);
        start = m.end();
    }
    push_trimmed(&mut paragraphs, &text[start..]);
    paragraphs
}

fn push_trimmed<'t>(out: &mut Vec<&'t str>, fragment: &'t str) {
    let fragment = fragment.trim();
    if !fragment.is_empty() {
        out.push(fragment);
    }
}

/// Label every paragraph of `text`, in document order.
pub fn classify(text: &str, classifier: &dyn TextClassifier) -> Result<Vec<ParagraphLabel>> {
    let paragraphs = split_paragraphs(text);
    log::debug!("Classifying {} paragraphs", paragraphs.len());

    paragraphs
        .into_iter()
        .map(|paragraph| {
            let prediction = classifier.predict(paragraph)?;
            Ok(ParagraphLabel {
                paragraph: paragraph.to_string(),
                label: prediction.label,
                score: prediction.score,
            })
        })
        .collect()
}
