//! Contract rule checklist.
//!
//! The checklist is a fixed table of independent rules. Every rule runs
//! against the same normalized text and produces one [`RuleOutcome`]; the
//! result always holds one entry per rule, in checklist order.
//!
//! # Example
//!
//! ```
//! use contract_check::rules::{check_rules, RuleId, Verdict, NO_ATTACHMENTS};
//!
//! let results = check_rules("Сумма договора 500 000 ₽, НДС включён.", NO_ATTACHMENTS)?;
//! assert_eq!(results.verdict(RuleId::SumLimit), Some(Verdict::Pass));
//! assert_eq!(results.verdict(RuleId::SubcontractSum), Some(Verdict::NotApplicable));
//! assert_eq!(results.passed(RuleId::Vat), Some(true));
//! # Ok::<(), contract_check::Error>(())
//! ```

mod profile;
mod tokens;

pub use profile::ContractProfile;
pub use tokens::{parse_amount, parse_date, DATE_FORMAT};

use crate::error::Result;
use regex::Regex;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use tokens::TokenPatterns;

/// Empty attachment list, for checks without supplied files.
pub const NO_ATTACHMENTS: &[&str] = &[];

const SUBCONTRACTOR: &str = "субподрядчик";
const VAT_ABBREVIATION: &str = "НДС";
const VAT_WITHHELD: &str = "удержан";
const SOLE_PROPRIETOR: &str = r"\bИП\b";
const PRIVATE_INDIVIDUAL: &str = "физлицо";
const DEPUTY: &str = "заместител";
const SIGNATURE: &str = "подпись";
const SEAL: &str = "печать";
const TERM: &str = "срок";
const NDA: &str = "NDA";
const NON_DISCLOSURE: &str = "неразглаш";
const LIABILITY: &str = "ответственность";
const FINE: &str = "штраф";
const PERPETUAL: &str = "бессрочн";

/// Identifier of a checklist rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleId {
    #[serde(rename = "sum_10m")]
    SumLimit,
    #[serde(rename = "subcontract_sum")]
    SubcontractSum,
    #[serde(rename = "forbidden_words")]
    ForbiddenWords,
    #[serde(rename = "nds")]
    Vat,
    #[serde(rename = "company_ok")]
    Company,
    #[serde(rename = "inn_ok")]
    TaxId,
    #[serde(rename = "not_individual")]
    NotIndividual,
    #[serde(rename = "director_signature")]
    DirectorSignature,
    #[serde(rename = "customer_signature")]
    CustomerSignature,
    #[serde(rename = "stamp")]
    Stamp,
    #[serde(rename = "sign_date")]
    SignDate,
    #[serde(rename = "work_term")]
    WorkTerm,
    #[serde(rename = "nda")]
    Nda,
    #[serde(rename = "responsibility")]
    Responsibility,
    #[serde(rename = "no_fines")]
    NoFines,
    #[serde(rename = "bad_phrases")]
    BadPhrases,
    #[serde(rename = "duration_ok")]
    Duration,
    #[serde(rename = "end_after_start")]
    EndAfterStart,
    #[serde(rename = "not_perpetual")]
    NotPerpetual,
    #[serde(rename = "applications")]
    Applications,
}

impl RuleId {
    /// Stable snake_case key used in reports.
    pub fn key(&self) -> &'static str {
        match self {
            RuleId::SumLimit => "sum_10m",
            RuleId::SubcontractSum => "subcontract_sum",
            RuleId::ForbiddenWords => "forbidden_words",
            RuleId::Vat => "nds",
            RuleId::Company => "company_ok",
            RuleId::TaxId => "inn_ok",
            RuleId::NotIndividual => "not_individual",
            RuleId::DirectorSignature => "director_signature",
            RuleId::CustomerSignature => "customer_signature",
            RuleId::Stamp => "stamp",
            RuleId::SignDate => "sign_date",
            RuleId::WorkTerm => "work_term",
            RuleId::Nda => "nda",
            RuleId::Responsibility => "responsibility",
            RuleId::NoFines => "no_fines",
            RuleId::BadPhrases => "bad_phrases",
            RuleId::Duration => "duration_ok",
            RuleId::EndAfterStart => "end_after_start",
            RuleId::NotPerpetual => "not_perpetual",
            RuleId::Applications => "applications",
        }
    }

    /// Look up a rule by its key.
    pub fn from_key(key: &str) -> Option<Self> {
        CHECKLIST.iter().map(|rule| rule.id).find(|id| id.key() == key)
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Three-way result of a rule guarded by a precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
    /// The rule's precondition was not met
    NotApplicable,
}

impl Verdict {
    /// Pass or fail from a boolean.
    pub fn from_bool(ok: bool) -> Self {
        if ok {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }

    /// `Some(true)` / `Some(false)`, or `None` when not applicable.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Verdict::Pass => Some(true),
            Verdict::Fail => Some(false),
            Verdict::NotApplicable => None,
        }
    }
}

/// Presence of one required attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentStatus {
    pub name: String,
    pub present: bool,
}

/// Value produced by a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// Plain pass/fail check
    Check(bool),
    /// Check with a precondition
    Conditional(Verdict),
    /// Offending items found; empty means the rule passed
    Findings(Vec<String>),
    /// Required attachments in checklist order
    Attachments(Vec<AttachmentStatus>),
}

impl RuleOutcome {
    /// Whether the rule passed; `None` when it did not apply.
    pub fn passed(&self) -> Option<bool> {
        match self {
            RuleOutcome::Check(ok) => Some(*ok),
            RuleOutcome::Conditional(verdict) => verdict.as_bool(),
            RuleOutcome::Findings(items) => Some(items.is_empty()),
            RuleOutcome::Attachments(items) => Some(items.iter().all(|a| a.present)),
        }
    }
}

impl Serialize for RuleOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            RuleOutcome::Check(ok) => serializer.serialize_bool(*ok),
            RuleOutcome::Conditional(verdict) => verdict.as_bool().serialize(serializer),
            RuleOutcome::Findings(items) => items.serialize(serializer),
            RuleOutcome::Attachments(items) => {
                let mut map = serializer.serialize_map(Some(items.len()))?;
                for item in items {
                    map.serialize_entry(&item.name, &item.present)?;
                }
                map.end()
            }
        }
    }
}

/// Outcome of one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleResult {
    pub id: RuleId,
    pub outcome: RuleOutcome,
}

/// Outcomes of the whole checklist, in checklist order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleResults {
    results: Vec<RuleResult>,
}

impl RuleResults {
    /// Outcome of a rule.
    pub fn get(&self, id: RuleId) -> Option<&RuleOutcome> {
        self.results.iter().find(|r| r.id == id).map(|r| &r.outcome)
    }

    /// Outcome of a rule by key.
    pub fn get_key(&self, key: &str) -> Option<&RuleOutcome> {
        RuleId::from_key(key).and_then(|id| self.get(id))
    }

    /// Whether a rule passed; `None` if it did not apply.
    pub fn passed(&self, id: RuleId) -> Option<bool> {
        self.get(id).and_then(RuleOutcome::passed)
    }

    /// Three-way verdict of a conditional rule.
    pub fn verdict(&self, id: RuleId) -> Option<Verdict> {
        match self.get(id) {
            Some(RuleOutcome::Conditional(verdict)) => Some(*verdict),
            _ => None,
        }
    }

    /// Findings of a list rule.
    pub fn findings(&self, id: RuleId) -> Option<&[String]> {
        match self.get(id) {
            Some(RuleOutcome::Findings(items)) => Some(items),
            _ => None,
        }
    }

    /// Presence of a required attachment.
    pub fn attachment(&self, name: &str) -> Option<bool> {
        match self.get(RuleId::Applications) {
            Some(RuleOutcome::Attachments(items)) => {
                items.iter().find(|a| a.name == name).map(|a| a.present)
            }
            _ => None,
        }
    }

    /// Rules that failed.
    pub fn failed(&self) -> Vec<RuleId> {
        self.results
            .iter()
            .filter(|r| r.outcome.passed() == Some(false))
            .map(|r| r.id)
            .collect()
    }

    /// Iterate over results in checklist order.
    pub fn iter(&self) -> std::slice::Iter<'_, RuleResult> {
        self.results.iter()
    }

    /// Number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether there are no results.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleResults {
    type Item = &'a RuleResult;
    type IntoIter = std::slice::Iter<'a, RuleResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl Serialize for RuleResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.results.len()))?;
        for result in &self.results {
            map.serialize_entry(result.id.key(), &result.outcome)?;
        }
        map.end()
    }
}

/// Inputs shared by every rule evaluation.
struct RuleContext<'a> {
    text: &'a str,
    lower: String,
    files: Vec<&'a str>,
    profile: &'a ContractProfile,
    patterns: &'a Patterns,
}

impl RuleContext<'_> {
    fn has(&self, needle: &str) -> bool {
        self.text.contains(needle)
    }

    fn has_lower(&self, needle: &str) -> bool {
        self.lower.contains(needle)
    }

    fn found_in_lower(&self, items: &[String]) -> Vec<String> {
        items
            .iter()
            .filter(|item| self.lower.contains(&item.to_lowercase()))
            .cloned()
            .collect()
    }
}

/// A checklist entry: identifier, description and evaluator.
pub struct Rule {
    pub id: RuleId,
    pub description: &'static str,
    evaluate: fn(&RuleContext<'_>) -> Result<RuleOutcome>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("description", &self.description)
            .finish()
    }
}

/// The fixed rule checklist, in evaluation order.
pub static CHECKLIST: &[Rule] = &[
    Rule {
        id: RuleId::SumLimit,
        description: "every ruble amount is within the contract limit",
        evaluate: sum_limit,
    },
    Rule {
        id: RuleId::SubcontractSum,
        description: "amounts stay under the subcontract limit when a subcontractor is involved",
        evaluate: subcontract_sum,
    },
    Rule {
        id: RuleId::ForbiddenWords,
        description: "no prepayment or advance terms",
        evaluate: forbidden_words,
    },
    Rule {
        id: RuleId::Vat,
        description: "VAT is mentioned",
        evaluate: vat,
    },
    Rule {
        id: RuleId::Company,
        description: "company name is present",
        evaluate: company,
    },
    Rule {
        id: RuleId::TaxId,
        description: "tax ID is present",
        evaluate: tax_id,
    },
    Rule {
        id: RuleId::NotIndividual,
        description: "counterparty is not a sole proprietor or private individual",
        evaluate: not_individual,
    },
    Rule {
        id: RuleId::DirectorSignature,
        description: "director or deputy signature line is present",
        evaluate: director_signature,
    },
    Rule {
        id: RuleId::CustomerSignature,
        description: "customer signature is present",
        evaluate: customer_signature,
    },
    Rule {
        id: RuleId::Stamp,
        description: "company seal is present",
        evaluate: stamp,
    },
    Rule {
        id: RuleId::SignDate,
        description: "sign-off date is present",
        evaluate: sign_date,
    },
    Rule {
        id: RuleId::WorkTerm,
        description: "a term is specified",
        evaluate: work_term,
    },
    Rule {
        id: RuleId::Nda,
        description: "non-disclosure clause is present",
        evaluate: nda,
    },
    Rule {
        id: RuleId::Responsibility,
        description: "liability clause is present",
        evaluate: responsibility,
    },
    Rule {
        id: RuleId::NoFines,
        description: "no fines or penalties",
        evaluate: no_fines,
    },
    Rule {
        id: RuleId::BadPhrases,
        description: "no vague wording",
        evaluate: bad_phrases,
    },
    Rule {
        id: RuleId::Duration,
        description: "contract term does not exceed the month limit",
        evaluate: duration,
    },
    Rule {
        id: RuleId::EndAfterStart,
        description: "end date is after start date",
        evaluate: end_after_start,
    },
    Rule {
        id: RuleId::NotPerpetual,
        description: "contract is not perpetual",
        evaluate: not_perpetual,
    },
    Rule {
        id: RuleId::Applications,
        description: "required attachments are embedded or supplied",
        evaluate: applications,
    },
];

fn sum_limit(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    let amounts = ctx.patterns.tokens.ruble_amounts(ctx.text)?;
    let verdict = if amounts.is_empty() {
        Verdict::NotApplicable
    } else {
        Verdict::from_bool(amounts.iter().all(|a| *a <= ctx.profile.max_contract_sum))
    };
    Ok(RuleOutcome::Conditional(verdict))
}

fn subcontract_sum(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    if !ctx.has_lower(SUBCONTRACTOR) {
        return Ok(RuleOutcome::Conditional(Verdict::NotApplicable));
    }
    let amounts = ctx.patterns.tokens.ruble_amounts(ctx.text)?;
    let ok = amounts.iter().all(|a| *a < ctx.profile.max_subcontract_sum);
    Ok(RuleOutcome::Conditional(Verdict::from_bool(ok)))
}

fn forbidden_words(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    Ok(RuleOutcome::Findings(
        ctx.found_in_lower(&ctx.profile.forbidden_words),
    ))
}

fn vat(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    Ok(RuleOutcome::Check(
        ctx.has(VAT_ABBREVIATION) || ctx.has(VAT_WITHHELD),
    ))
}

fn company(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    Ok(RuleOutcome::Check(ctx.has(&ctx.profile.company_name)))
}

fn tax_id(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    Ok(RuleOutcome::Check(ctx.has(&ctx.profile.tax_id)))
}

fn not_individual(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    let proprietor = ctx.patterns.sole_proprietor.is_match(ctx.text);
    Ok(RuleOutcome::Check(
        !proprietor && !ctx.has_lower(PRIVATE_INDIVIDUAL),
    ))
}

fn director_signature(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    Ok(RuleOutcome::Check(ctx.patterns.director.is_match(ctx.text)))
}

fn customer_signature(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    Ok(RuleOutcome::Check(ctx.has_lower(SIGNATURE)))
}

fn stamp(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    Ok(RuleOutcome::Check(
        ctx.has(&ctx.profile.company_name) && ctx.has_lower(SEAL),
    ))
}

fn sign_date(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    Ok(RuleOutcome::Check(ctx.has(&ctx.profile.sign_date)))
}

fn work_term(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    Ok(RuleOutcome::Check(ctx.has_lower(TERM)))
}

fn nda(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    Ok(RuleOutcome::Check(ctx.has(NDA) || ctx.has_lower(NON_DISCLOSURE)))
}

fn responsibility(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    Ok(RuleOutcome::Check(ctx.has_lower(LIABILITY)))
}

fn no_fines(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    Ok(RuleOutcome::Check(!ctx.has_lower(FINE)))
}

fn bad_phrases(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    Ok(RuleOutcome::Findings(
        ctx.found_in_lower(&ctx.profile.bad_phrases),
    ))
}

fn duration(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    let verdict = match ctx.patterns.tokens.duration_months(ctx.text)? {
        Some(months) => Verdict::from_bool(months <= ctx.profile.max_duration_months),
        None => Verdict::NotApplicable,
    };
    Ok(RuleOutcome::Conditional(verdict))
}

fn end_after_start(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    let tokens = ctx.patterns.tokens.date_tokens(ctx.text);
    if tokens.len() < 2 {
        return Ok(RuleOutcome::Check(false));
    }
    let start = parse_date(tokens[0])?;
    let end = parse_date(tokens[1])?;
    Ok(RuleOutcome::Check(end > start))
}

fn not_perpetual(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    Ok(RuleOutcome::Check(!ctx.has_lower(PERPETUAL)))
}

fn applications(ctx: &RuleContext<'_>) -> Result<RuleOutcome> {
    let statuses = ctx
        .profile
        .required_attachments
        .iter()
        .map(|name| {
            let in_text = ctx.has(name);
            let in_files = ctx.files.iter().any(|f| f.contains(name.as_str()));
            AttachmentStatus {
                name: name.clone(),
                present: in_text || in_files,
            }
        })
        .collect();
    Ok(RuleOutcome::Attachments(statuses))
}

/// Patterns compiled once per checker.
#[derive(Debug, Clone)]
struct Patterns {
    tokens: TokenPatterns,
    sole_proprietor: Regex,
    director: Regex,
}

impl Patterns {
    fn new(profile: &ContractProfile) -> Result<Self> {
        let director = if profile.director_name.is_empty() {
            format!("(?i){}", DEPUTY)
        } else {
            format!("(?i){}|{}", regex::escape(&profile.director_name), DEPUTY)
        };

        Ok(Self {
            tokens: TokenPatterns::new(),
            sole_proprietor: Regex::new(SOLE_PROPRIETOR)?,
            director: Regex::new(&director)?,
        })
    }
}

/// Evaluates the checklist against contract text.
#[derive(Debug, Clone)]
pub struct RuleChecker {
    profile: ContractProfile,
    patterns: Patterns,
}

impl RuleChecker {
    /// Create a checker for a contract profile.
    pub fn new(profile: ContractProfile) -> Result<Self> {
        let patterns = Patterns::new(&profile)?;
        Ok(Self { profile, patterns })
    }

    /// The profile this checker compares against.
    pub fn profile(&self) -> &ContractProfile {
        &self.profile
    }

    /// Evaluate every rule.
    ///
    /// `available_files` are attachment filenames supplied alongside the
    /// contract. The first amount or date token that fails to convert aborts
    /// the whole check.
    pub fn check<S: AsRef<str>>(&self, text: &str, available_files: &[S]) -> Result<RuleResults> {
        let ctx = RuleContext {
            text,
            lower: text.to_lowercase(),
            files: available_files.iter().map(|f| f.as_ref()).collect(),
            profile: &self.profile,
            patterns: &self.patterns,
        };

        let mut results = Vec::with_capacity(CHECKLIST.len());
        for rule in CHECKLIST {
            let outcome = (rule.evaluate)(&ctx)?;
            log::debug!("rule {}: {:?}", rule.id, outcome);
            results.push(RuleResult {
                id: rule.id,
                outcome,
            });
        }

        Ok(RuleResults { results })
    }
}

impl Default for RuleChecker {
    fn default() -> Self {
        // the default profile has no user-supplied patterns
        Self::new(ContractProfile::default()).expect("default profile patterns compile")
    }
}

/// Check text against the default profile.
pub fn check_rules<S: AsRef<str>>(text: &str, available_files: &[S]) -> Result<RuleResults> {
    RuleChecker::default().check(text, available_files)
}
