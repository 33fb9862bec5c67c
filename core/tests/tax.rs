//! Tax check: ICMS grossed up from the total, PIS/COFINS on the energy line,
//! tolerance 1 % of the bill total.

mod common;

use common::{clean_residential_bill, of_kind, sample_bill};
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use tariff_audit_core::{
    finding::{FindingKind, Severity},
    AuditEngine, BillRecord, TariffTable,
};

fn tax_findings(record: &BillRecord) -> Vec<tariff_audit_core::Finding> {
    let result = AuditEngine::build().audit(record, &TariffTable::reference());
    of_kind(&result.findings, FindingKind::Tax).into_iter().cloned().collect()
}

#[test]
fn sample_bill_icms_is_overcharged() {
    // 485.75 / 1.25 × 0.25 = 97.15 expected vs 121.44 charged.
    let findings = tax_findings(&sample_bill());

    assert_eq!(findings.len(), 1, "only ICMS should be off: {findings:?}");
    assert_eq!(findings[0].severity, Severity::High);
    assert_eq!(findings[0].financial_impact, dec!(24.29));
    assert!(findings[0].description.starts_with("ICMS"));
}

#[test]
fn correct_icms_passes() {
    let record = BillRecord {
        taxes: BTreeMap::from([("ICMS".to_string(), dec!(97.15))]),
        ..sample_bill()
    };
    assert!(tax_findings(&record).is_empty());
}

#[test]
fn large_icms_overcharge_reports_the_full_difference() {
    let record = BillRecord {
        taxes: BTreeMap::from([("ICMS".to_string(), dec!(200))]),
        ..sample_bill()
    };
    let findings = tax_findings(&record);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].financial_impact, dec!(102.85));
}

#[test]
fn tax_names_are_matched_case_insensitively() {
    let raw = r#"{
        "total_amount": 485.75,
        "taxes": { "icms": 200, "Pis": "5.65" },
        "energy_amount": 342.50
    }"#;
    let record = BillRecord::from_json(raw).unwrap();
    assert_eq!(record.tax("ICMS"), Some(dec!(200)));

    let findings = tax_findings(&record);
    assert_eq!(findings.len(), 1, "{findings:?}");
    assert!(findings[0].description.starts_with("ICMS"));
}

#[test]
fn missing_total_skips_the_check() {
    let record = BillRecord { total_amount: None, ..sample_bill() };
    let result = AuditEngine::build().audit(&record, &TariffTable::reference());

    assert!(of_kind(&result.findings, FindingKind::Tax).is_empty());
    assert!(result
        .skipped_checks
        .iter()
        .any(|s| s.check == "tax" && s.missing_field == "total_amount"));
}

#[test]
fn energy_based_tax_needs_the_energy_line() {
    let record = BillRecord {
        energy_amount: None,
        taxes: BTreeMap::from([("PIS".to_string(), dec!(50))]),
        ..sample_bill()
    };
    assert!(tax_findings(&record).is_empty());
}

#[test]
fn taxes_not_charged_on_the_bill_are_not_audited() {
    let record = BillRecord { taxes: BTreeMap::new(), ..sample_bill() };
    assert!(tax_findings(&record).is_empty());
    assert!(tax_findings(&clean_residential_bill()).is_empty());
}
