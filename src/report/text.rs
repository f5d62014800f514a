//! Plain-text report rendering.

use super::CheckReport;
use crate::classify::ParagraphLabel;
use crate::rules::{RuleOutcome, RuleResults, Verdict};
use std::fmt::Write;

const RULES_HEADER: &str = "===== Проверка правил =====";
const PARAGRAPHS_HEADER: &str = "===== Классификация абзацев =====";

const PASSED: &str = "Пройдена";
const FAILED: &str = "Не пройдена";
const NOT_APPLICABLE: &str = "Не применимо";
const FOUND: &str = "Найдены: ";
const ATTACHMENT: &str = "Приложение";
const PRESENT: &str = "Присутствует";
const MISSING: &str = "Отсутствует";

/// Render a report as text.
///
/// One line per rule in checklist order, one line per required attachment,
/// then one line per classified paragraph. The classification section is
/// left out when classification was skipped.
pub fn to_text(report: &CheckReport) -> String {
    let mut out = String::new();
    render_rules(&mut out, &report.rules);

    if let Some(paragraphs) = &report.paragraphs {
        out.push('\n');
        render_paragraphs(&mut out, paragraphs);
    }
    out
}

/// Print a report to stdout.
pub fn print_report(report: &CheckReport) {
    print!("{}", to_text(report));
}

fn render_rules(out: &mut String, rules: &RuleResults) {
    out.push_str(RULES_HEADER);
    out.push('\n');

    for result in rules {
        let key = result.id.key();
        match &result.outcome {
            RuleOutcome::Check(ok) => line(out, key, if *ok { PASSED } else { FAILED }),
            RuleOutcome::Conditional(verdict) => line(out, key, verdict_text(*verdict)),
            RuleOutcome::Findings(items) if items.is_empty() => line(out, key, PASSED),
            RuleOutcome::Findings(items) => {
                let _ = writeln!(out, "{}: {}{}", key, FOUND, items.join(", "));
            }
            RuleOutcome::Attachments(items) => {
                for item in items {
                    let status = if item.present { PRESENT } else { MISSING };
                    let _ = writeln!(out, "{} {}: {}", ATTACHMENT, item.name, status);
                }
            }
        }
    }
}

fn render_paragraphs(out: &mut String, paragraphs: &[ParagraphLabel]) {
    out.push_str(PARAGRAPHS_HEADER);
    out.push('\n');

    for item in paragraphs {
        let _ = writeln!(out, "[{}] ({:.2}) {}", item.label, item.score, item.paragraph);
    }
}

fn line(out: &mut String, key: &str, status: &str) {
    let _ = writeln!(out, "{}: {}", key, status);
}

fn verdict_text(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Pass => PASSED,
        Verdict::Fail => FAILED,
        Verdict::NotApplicable => NOT_APPLICABLE,
    }
}
