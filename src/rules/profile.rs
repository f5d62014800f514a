//! Contract profile: the constants the checklist compares against.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contract-specific values used by the rule checklist.
///
/// Every field has a default, so a JSON profile only needs the keys it
/// overrides:
///
/// ```
/// use contract_check::ContractProfile;
///
/// let profile = ContractProfile::from_json_str(r#"{"tax_id": "7701234567"}"#).unwrap();
/// assert_eq!(profile.tax_id, "7701234567");
/// assert_eq!(profile.company_name, "ООО «Ромашка»");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractProfile {
    /// Exact legal name of the contracting company
    pub company_name: String,

    /// Taxpayer identification number (ИНН)
    pub tax_id: String,

    /// Director's name as it appears on the signature line
    pub director_name: String,

    /// Expected sign-off date, matched verbatim
    pub sign_date: String,

    /// Upper bound (inclusive) for any ruble amount
    pub max_contract_sum: u64,

    /// Upper bound (exclusive) for amounts when a subcontractor is involved
    pub max_subcontract_sum: u64,

    /// Upper bound (inclusive) for the contract term in months
    pub max_duration_months: u64,

    /// Payment terms that must not appear
    pub forbidden_words: Vec<String>,

    /// Vague wording that must not appear
    pub bad_phrases: Vec<String>,

    /// Attachments that must be embedded or supplied as files
    pub required_attachments: Vec<String>,
}

impl ContractProfile {
    /// Parse a profile from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a profile from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Profile(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }
}

impl Default for ContractProfile {
    fn default() -> Self {
        Self {
            company_name: "ООО «Ромашка»".to_string(),
            tax_id: "6678122494".to_string(),
            director_name: "Иванов И. И.".to_string(),
            sign_date: "25.01.2025".to_string(),
            max_contract_sum: 10_000_000,
            max_subcontract_sum: 2_000_000,
            max_duration_months: 12,
            forbidden_words: vec![
                "предоплата".to_string(),
                "аванс".to_string(),
                "до начала работ".to_string(),
            ],
            bad_phrases: vec![
                "по договорённости сторон".to_string(),
                "в разумный срок".to_string(),
            ],
            required_attachments: vec!["Спецификация".to_string(), "График работ".to_string()],
        }
    }
}
