//! Consumption-history heuristic over the last three months.

mod common;

use common::{of_kind, sample_bill};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tariff_audit_core::{
    finding::{FindingKind, Severity},
    AuditEngine, BillRecord, TariffTable,
};

fn anomalies(history: Vec<Decimal>) -> Vec<tariff_audit_core::Finding> {
    let record = BillRecord { consumption_history: history, ..Default::default() };
    let result = AuditEngine::build().audit(&record, &TariffTable::reference());
    of_kind(&result.findings, FindingKind::ConsumptionAnomaly)
        .into_iter()
        .cloned()
        .collect()
}

#[test]
fn steady_consumption_is_not_flagged() {
    assert!(anomalies(sample_bill().consumption_history).is_empty());
}

#[test]
fn spike_is_flagged_as_high_consumption() {
    // mean 200, latest 400 > 300
    let findings = anomalies(vec![dec!(100), dec!(100), dec!(400)]);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::Low);
    assert!(findings[0].financial_impact.is_zero());
    assert!(findings[0].description.starts_with("Anomalously high consumption"));
}

#[test]
fn drop_is_flagged_as_low_consumption() {
    // mean 300, latest 100 < 150
    let findings = anomalies(vec![dec!(400), dec!(400), dec!(100)]);
    assert_eq!(findings.len(), 1);
    assert!(findings[0].description.starts_with("Anomalously low consumption"));
}

#[test]
fn only_the_last_three_months_count() {
    assert!(anomalies(vec![dec!(10), dec!(10), dec!(10), dec!(100), dec!(100), dec!(100)]).is_empty());
    assert_eq!(
        anomalies(vec![dec!(900), dec!(900), dec!(100), dec!(100), dec!(400)]).len(),
        1
    );
}

#[test]
fn short_history_skips_the_check() {
    let record = BillRecord {
        consumption_history: vec![dec!(100), dec!(900)],
        ..Default::default()
    };
    let result = AuditEngine::build().audit(&record, &TariffTable::reference());

    assert!(of_kind(&result.findings, FindingKind::ConsumptionAnomaly).is_empty());
    assert!(result
        .skipped_checks
        .iter()
        .any(|s| s.check == "consumption_history" && s.missing_field == "consumption_history"));
}

#[test]
fn all_zero_history_is_not_an_anomaly() {
    assert!(anomalies(vec![dec!(0), dec!(0), dec!(0)]).is_empty());
}
