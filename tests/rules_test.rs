//! Integration tests for the rule checklist.

use contract_check::error::Error;
use contract_check::normalize;
use contract_check::rules::{
    check_rules, ContractProfile, RuleChecker, RuleId, RuleOutcome, Verdict, CHECKLIST,
    NO_ATTACHMENTS,
};

/// A contract that passes every rule under the default profile.
const COMPLIANT: &str = "Договор оказания услуг между ООО «Ромашка» (ИНН 6678122494) и \
     АО «Заказчик». Стоимость услуг 1 500 000 ₽, в том числе НДС. \
     Срок действия договора 6 месяцев: с 01.02.2025 по 31.07.2025. \
     Стороны обязуются соблюдать неразглашение сведений. \
     Стороны несут ответственность по закону. \
     Подписано 25.01.2025. Директор Иванов И. И., подпись, печать. \
     Приложения: Спецификация, График работ.";

#[test]
fn test_compliant_contract_passes() {
    let results = check_rules(COMPLIANT, NO_ATTACHMENTS).unwrap();

    assert_eq!(results.len(), CHECKLIST.len());
    assert!(results.failed().is_empty(), "failed: {:?}", results.failed());
    assert_eq!(results.verdict(RuleId::SumLimit), Some(Verdict::Pass));
    assert_eq!(results.verdict(RuleId::Duration), Some(Verdict::Pass));
    assert_eq!(results.passed(RuleId::EndAfterStart), Some(true));
}

#[test]
fn test_no_amounts_not_applicable() {
    let results = check_rules("Договор без цены", NO_ATTACHMENTS).unwrap();
    assert_eq!(results.verdict(RuleId::SumLimit), Some(Verdict::NotApplicable));
    assert_eq!(results.passed(RuleId::SumLimit), None);
}

#[test]
fn test_sum_limit() {
    let results = check_rules("Итого 10 000 000 ₽", NO_ATTACHMENTS).unwrap();
    assert_eq!(results.verdict(RuleId::SumLimit), Some(Verdict::Pass));

    let results = check_rules("Итого 500 ₽ и 10 000 001 ₽", NO_ATTACHMENTS).unwrap();
    assert_eq!(results.verdict(RuleId::SumLimit), Some(Verdict::Fail));
}

#[test]
fn test_subcontract_sum() {
    let results = check_rules("Сумма 3 000 000 ₽", NO_ATTACHMENTS).unwrap();
    assert_eq!(
        results.verdict(RuleId::SubcontractSum),
        Some(Verdict::NotApplicable)
    );

    let results = check_rules(
        "Субподрядчик получает 1 999 999 ₽ и 50 000 ₽",
        NO_ATTACHMENTS,
    )
    .unwrap();
    assert_eq!(results.verdict(RuleId::SubcontractSum), Some(Verdict::Pass));

    let results = check_rules("Оплата 2 000 000 ₽ субподрядчику", NO_ATTACHMENTS).unwrap();
    assert_eq!(results.verdict(RuleId::SubcontractSum), Some(Verdict::Fail));

    // the amount may come after the mention
    let results = check_rules(
        "Субподрядчику выплачивается 2 500 000 ₽",
        NO_ATTACHMENTS,
    )
    .unwrap();
    assert_eq!(results.verdict(RuleId::SubcontractSum), Some(Verdict::Fail));
}

#[test]
fn test_subcontract_without_amounts_passes() {
    let results = check_rules("Привлечение субподрядчика допускается", NO_ATTACHMENTS).unwrap();
    assert_eq!(results.verdict(RuleId::SubcontractSum), Some(Verdict::Pass));
}

#[test]
fn test_forbidden_words_in_checklist_order() {
    let results = check_rules(
        "До начала работ вносится АВАНС, предоплата не требуется",
        NO_ATTACHMENTS,
    )
    .unwrap();
    assert_eq!(
        results.findings(RuleId::ForbiddenWords).unwrap(),
        ["предоплата", "аванс", "до начала работ"]
    );

    let results = check_rules("Оплата по факту", NO_ATTACHMENTS).unwrap();
    assert!(results.findings(RuleId::ForbiddenWords).unwrap().is_empty());
    assert_eq!(results.passed(RuleId::ForbiddenWords), Some(true));
}

#[test]
fn test_vat() {
    assert_eq!(
        check_rules("Цена включает НДС", NO_ATTACHMENTS)
            .unwrap()
            .passed(RuleId::Vat),
        Some(true)
    );
    assert_eq!(
        check_rules("налог удержан", NO_ATTACHMENTS)
            .unwrap()
            .passed(RuleId::Vat),
        Some(true)
    );
    // case-sensitive
    assert_eq!(
        check_rules("ндс", NO_ATTACHMENTS)
            .unwrap()
            .passed(RuleId::Vat),
        Some(false)
    );
}

#[test]
fn test_not_individual() {
    for text in ["ИП Сидоров", "Исполнитель физлицо", "Исполнитель ФИЗЛИЦО"] {
        let results = check_rules(text, NO_ATTACHMENTS).unwrap();
        assert_eq!(results.passed(RuleId::NotIndividual), Some(false), "{}", text);
    }

    let results = check_rules("ООО «Ромашка»", NO_ATTACHMENTS).unwrap();
    assert_eq!(results.passed(RuleId::NotIndividual), Some(true));
}

#[test]
fn test_stamp_requires_company_and_seal() {
    let results = check_rules("ООО «Ромашка», печать", NO_ATTACHMENTS).unwrap();
    assert_eq!(results.passed(RuleId::Stamp), Some(true));

    let results = check_rules("ООО «Ромашка»", NO_ATTACHMENTS).unwrap();
    assert_eq!(results.passed(RuleId::Stamp), Some(false));

    let results = check_rules("Печать", NO_ATTACHMENTS).unwrap();
    assert_eq!(results.passed(RuleId::Stamp), Some(false));
}

#[test]
fn test_end_after_start() {
    let results = check_rules("с 01.01.2025 по 01.01.2024", NO_ATTACHMENTS).unwrap();
    assert_eq!(results.passed(RuleId::EndAfterStart), Some(false));

    let results = check_rules("с 01.01.2024 по 01.01.2025", NO_ATTACHMENTS).unwrap();
    assert_eq!(results.passed(RuleId::EndAfterStart), Some(true));

    let results = check_rules("с 01.01.2024", NO_ATTACHMENTS).unwrap();
    assert_eq!(results.passed(RuleId::EndAfterStart), Some(false));

    let results = check_rules("без дат", NO_ATTACHMENTS).unwrap();
    assert_eq!(results.passed(RuleId::EndAfterStart), Some(false));

    // equal dates are not "after"
    let results = check_rules("01.01.2024 - 01.01.2024", NO_ATTACHMENTS).unwrap();
    assert_eq!(results.passed(RuleId::EndAfterStart), Some(false));
}

#[test]
fn test_invalid_date_aborts() {
    let result = check_rules("с 31.02.2024 по 01.03.2024", NO_ATTACHMENTS);
    assert!(matches!(result, Err(Error::InvalidDate(ref d)) if d == "31.02.2024"));
}

#[test]
fn test_invalid_amount_aborts() {
    let result = check_rules("Стоимость: ₽", NO_ATTACHMENTS);
    assert!(matches!(result, Err(Error::InvalidAmount(_))));
}

#[test]
fn test_duration() {
    let results = check_rules("Срок действия договора 12 месяцев", NO_ATTACHMENTS).unwrap();
    assert_eq!(results.verdict(RuleId::Duration), Some(Verdict::Pass));

    let results = check_rules("Срок действия договора 24 мес.", NO_ATTACHMENTS).unwrap();
    assert_eq!(results.verdict(RuleId::Duration), Some(Verdict::Fail));

    let results = check_rules("Срок оказания услуг 24 месяца", NO_ATTACHMENTS).unwrap();
    assert_eq!(results.verdict(RuleId::Duration), Some(Verdict::NotApplicable));
}

#[test]
fn test_keyword_rules() {
    let results = check_rules(
        "Договор бессрочный. Штраф за просрочку. Соглашение NDA.",
        NO_ATTACHMENTS,
    )
    .unwrap();
    assert_eq!(results.passed(RuleId::NotPerpetual), Some(false));
    assert_eq!(results.passed(RuleId::NoFines), Some(false));
    assert_eq!(results.passed(RuleId::Nda), Some(true));
    assert_eq!(results.passed(RuleId::Responsibility), Some(false));
    assert_eq!(results.passed(RuleId::WorkTerm), Some(false));
}

#[test]
fn test_bad_phrases() {
    let results = check_rules(
        "Работы выполняются в разумный срок",
        NO_ATTACHMENTS,
    )
    .unwrap();
    assert_eq!(
        results.findings(RuleId::BadPhrases).unwrap(),
        ["в разумный срок"]
    );
}

#[test]
fn test_attachments_from_files() {
    let results = check_rules("Договор", &["Спецификация.pdf"]).unwrap();
    assert_eq!(results.attachment("Спецификация"), Some(true));
    assert_eq!(results.attachment("График работ"), Some(false));

    match results.get(RuleId::Applications) {
        Some(RuleOutcome::Attachments(items)) => {
            let names: Vec<&str> = items.iter().map(|a| a.name.as_str()).collect();
            assert_eq!(names, ["Спецификация", "График работ"]);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_attachments_from_text() {
    let results = check_rules("Приложение: График работ", NO_ATTACHMENTS).unwrap();
    assert_eq!(results.attachment("График работ"), Some(true));
    assert_eq!(results.attachment("Спецификация"), Some(false));
}

#[test]
fn test_custom_profile() {
    let profile = ContractProfile::from_json_str(
        r#"{
            "company_name": "АО «Лютик»",
            "tax_id": "7701234567",
            "director_name": "Петров П. П.",
            "max_duration_months": 36,
            "forbidden_words": ["задаток"],
            "required_attachments": ["Смета"]
        }"#,
    )
    .unwrap();
    let checker = RuleChecker::new(profile).unwrap();
    let results = checker
        .check(
            "АО «Лютик» ИНН 7701234567, Петров П. П. Задаток. Срок действия 30 месяцев",
            &["Смета.xlsx"],
        )
        .unwrap();

    assert_eq!(results.passed(RuleId::Company), Some(true));
    assert_eq!(results.passed(RuleId::TaxId), Some(true));
    assert_eq!(results.passed(RuleId::DirectorSignature), Some(true));
    assert_eq!(results.findings(RuleId::ForbiddenWords).unwrap(), ["задаток"]);
    assert_eq!(results.verdict(RuleId::Duration), Some(Verdict::Pass));
    assert_eq!(results.attachment("Смета"), Some(true));
    assert_eq!(results.attachment("Спецификация"), None);
}

#[test]
fn test_normalized_amounts_with_nbsp() {
    let text = normalize("Итого\u{a0}12\u{a0}000\u{a0}000\n₽");
    let results = check_rules(&text, NO_ATTACHMENTS).unwrap();
    assert_eq!(results.verdict(RuleId::SumLimit), Some(Verdict::Fail));
}

#[test]
fn test_results_in_checklist_order() {
    let results = check_rules(COMPLIANT, NO_ATTACHMENTS).unwrap();
    let keys: Vec<&str> = results.iter().map(|r| r.id.key()).collect();
    assert_eq!(
        keys,
        [
            "sum_10m",
            "subcontract_sum",
            "forbidden_words",
            "nds",
            "company_ok",
            "inn_ok",
            "not_individual",
            "director_signature",
            "customer_signature",
            "stamp",
            "sign_date",
            "work_term",
            "nda",
            "responsibility",
            "no_fines",
            "bad_phrases",
            "duration_ok",
            "end_after_start",
            "not_perpetual",
            "applications",
        ]
    );
}
