//! Check reports: the combined result of one contract check and its
//! text and JSON renderings.

mod json;
mod text;

pub use json::{to_json, JsonFormat};
pub use text::{print_report, to_text};

use crate::classify::ParagraphLabel;
use crate::detect::DocumentFormat;
use crate::rules::RuleResults;
use serde::Serialize;
use std::path::PathBuf;

/// Everything produced by checking one contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    /// Checked file
    pub path: PathBuf,

    /// Format the text was read as
    pub format: DocumentFormat,

    /// Normalized contract text
    pub text: String,

    /// Outcome of every checklist rule
    pub rules: RuleResults,

    /// Paragraph labels; `None` when classification was skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraphs: Option<Vec<ParagraphLabel>>,
}

impl CheckReport {
    /// Whether every applicable rule passed.
    pub fn all_passed(&self) -> bool {
        self.rules.failed().is_empty()
    }
}
