//! Same record, same table: identical findings, every time.
//! Only the audit id and timestamp may differ between runs.

mod common;

use common::sample_bill;
use tariff_audit_core::{AuditEngine, BillRecord, TariffTable};

#[test]
fn repeated_audits_produce_identical_findings() {
    let engine = AuditEngine::build();
    let table = TariffTable::reference();
    let record = sample_bill();

    let a = engine.audit(&record, &table);
    let b = engine.audit(&record, &table);

    assert_eq!(a.findings.len(), b.findings.len());
    for (i, (fa, fb)) in a.findings.iter().zip(b.findings.iter()).enumerate() {
        assert_eq!(fa, fb, "Findings diverged at entry {i}:\n  A: {fa:?}\n  B: {fb:?}");
    }
    assert_eq!(a.summary, b.summary);
    assert_eq!(a.skipped_checks, b.skipped_checks);
    assert_eq!(a.failed_checks, b.failed_checks);
    assert_ne!(a.audit_id, b.audit_id, "each audit gets a fresh id");
}

#[test]
fn findings_serialize_identically_across_engines() {
    let table = TariffTable::reference();
    let record = BillRecord { energy_amount: None, ..sample_bill() };

    let a = AuditEngine::build().audit(&record, &table);
    let b = AuditEngine::build().audit(&record, &table);

    assert_eq!(
        serde_json::to_string(&a.findings).unwrap(),
        serde_json::to_string(&b.findings).unwrap()
    );
}
