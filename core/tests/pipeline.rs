//! End-to-end: JSON in, report out.

mod common;

use common::{data_dir, init_logging, sample_bill};
use rust_decimal_macros::dec;
use tariff_audit_core::{
    advisor::{EFFICIENCY_AUDIT_ADVICE, MONITORING_ADVICE, TIME_OF_USE_ADVICE},
    pipeline::BatchSummary,
    result::{AuditStatus, OverallStatus},
    validator::MISSING_SUBGROUP,
    AuditConfig, AuditPipeline, FindingKind,
};

fn pipeline() -> AuditPipeline {
    AuditPipeline::new(AuditConfig::reference())
}

fn read_sample(name: &str) -> String {
    std::fs::read_to_string(format!("{}/samples/{name}", data_dir())).expect("sample file")
}

#[test]
fn sample_file_produces_the_expected_report() {
    init_logging();
    let report = pipeline().run_json(&read_sample("bill_sample.json"));

    assert_eq!(report.result.status, AuditStatus::Processed);
    assert_eq!(report.result.summary.financial_impact, dec!(339.05));
    assert_eq!(report.result.summary.overall_status, OverallStatus::NonConforming);
    assert_eq!(
        report.recommendations,
        vec![TIME_OF_USE_ADVICE, EFFICIENCY_AUDIT_ADVICE, MONITORING_ADVICE]
    );
    assert!(report.field_warnings.is_clean());
}

#[test]
fn decoded_sample_audits_like_the_typed_record() {
    let from_json = pipeline().run_json(&read_sample("bill_sample.json"));
    let typed = pipeline().run(&sample_bill());
    assert_eq!(from_json.result.findings, typed.result.findings);
}

#[test]
fn report_json_is_flat_with_numeric_amounts() {
    let report = pipeline().run(&sample_bill());
    let json = serde_json::to_value(&report).unwrap();

    for key in ["audit_id", "status", "timestamp", "findings", "summary", "recommendations"] {
        assert!(json.get(key).is_some(), "missing key {key}: {json}");
    }
    assert!(json.get("error").is_none());
    assert_eq!(json["status"], "processed");
    assert_eq!(json["summary"]["overall_status"], "Non-Conforming");
    let impact = json["summary"]["financial_impact"].as_f64().unwrap();
    assert!((impact - 339.05).abs() < 1e-9, "{impact}");
    assert_eq!(json["findings"][0]["kind"], "energy_charge");
    assert_eq!(json["findings"][0]["severity"], "high");
    assert!(json["findings"][0]["financial_impact"].is_number());
}

#[test]
fn undecodable_input_is_a_processing_error() {
    let report = pipeline().run_json("{\"consumption_kwh\": 1250,");

    assert_eq!(report.result.status, AuditStatus::Error);
    assert_eq!(report.result.summary.overall_status, OverallStatus::ProcessingError);
    assert!(report.result.findings.is_empty());
    assert!(report
        .result
        .error
        .as_deref()
        .is_some_and(|e| e.starts_with("Could not decode bill record")));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["summary"]["overall_status"], "Processing Error");
}

#[test]
fn locale_formatted_amounts_are_accepted() {
    let raw = r#"{
        "consumption_kwh": 2347,
        "energy_amount": "R$ 1.234,56",
        "total_amount": "R$ 1.700,00",
        "tariff_subgroup": "b3",
        "consumer_type": "Comercial"
    }"#;
    let report = pipeline().run_json(raw);
    let energy: Vec<_> = report
        .result
        .findings
        .iter()
        .filter(|f| f.kind == FindingKind::EnergyCharge)
        .collect();

    // 2347 kWh × 0.52581 = 1234.07607 expected vs 1234.56 charged: within 5 %.
    assert!(energy.is_empty(), "{energy:?}");
    assert_eq!(report.result.status, AuditStatus::Processed);
}

#[test]
fn critical_field_issues_do_not_block_the_audit() {
    let report = pipeline().run_json(r#"{"consumption_kwh": 500, "total_amount": 300}"#);

    assert_eq!(report.result.status, AuditStatus::Processed);
    assert_eq!(report.field_warnings.critical, vec![MISSING_SUBGROUP]);
}

#[test]
fn batch_audits_each_line_independently() {
    let pipeline = AuditPipeline::new(AuditConfig::load(&data_dir()).expect("data/ should load"));
    let reports: Vec<_> = read_sample("bill_batch.jsonl")
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| pipeline.run_json(l))
        .collect();

    assert_eq!(reports.len(), 4);
    assert_eq!(reports[1].result.summary.overall_status, OverallStatus::Conforming);
    assert_eq!(reports[2].result.findings.len(), 4);
    assert_eq!(reports[3].result.status, AuditStatus::Error);

    let summary = BatchSummary::from_reports(&reports);
    assert_eq!(summary.audited, 4);
    assert_eq!(summary.conforming, 1);
    assert_eq!(summary.non_conforming, 2);
    assert_eq!(summary.errors, 1);
    assert_eq!(
        summary.financial_impact,
        reports
            .iter()
            .map(|r| r.result.summary.financial_impact)
            .sum::<rust_decimal::Decimal>()
    );
}

#[test]
fn run_batch_keeps_input_order() {
    let records = vec![sample_bill(), Default::default(), sample_bill()];
    let reports = pipeline().run_batch(&records);

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].result.findings, reports[2].result.findings);
    assert!(reports[1].result.is_conforming());
}

#[test]
fn non_object_json_is_a_processing_error() {
    for raw in ["[1250, 485.75, 342.5]", "[1,2]", "1250", "\"B3\"", "null"] {
        let report = pipeline().run_json(raw);

        assert_eq!(report.result.status, AuditStatus::Error, "input {raw}");
        assert_eq!(report.result.summary.overall_status, OverallStatus::ProcessingError);
        assert!(report.record.is_none());
        assert!(report
            .result
            .error
            .as_deref()
            .is_some_and(|e| e.contains("expected a JSON object")), "{:?}", report.result.error);
    }
}

#[test]
fn dot_grouped_consumption_is_read_as_thousands() {
    // "1.250" kWh is 1250 kWh, not 1.25: the energy line is then only
    // off by the sample bill's real undercharge.
    let raw = r#"{
        "consumption_kwh": "1.250",
        "energy_amount": "342,50",
        "tariff_subgroup": "b3",
        "consumer_type": "Comercial"
    }"#;
    let report = pipeline().run_json(raw);
    let energy: Vec<_> = report
        .result
        .findings
        .iter()
        .filter(|f| f.kind == FindingKind::EnergyCharge)
        .collect();

    assert_eq!(energy.len(), 1, "{energy:?}");
    assert_eq!(energy[0].financial_impact, dec!(314.76));
}

#[test]
fn report_carries_the_decoded_record() {
    let report = pipeline().run_json(r#"{"consumption_kwh": "R$ 1.250", "price_flag": "Amarela"}"#);
    let record = report.record.as_ref().expect("decoded record");
    assert_eq!(record.consumption_kwh, Some(dec!(1250)));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["record"]["price_flag"], "yellow");
    assert_eq!(json["record"]["consumption_kwh"].as_f64(), Some(1250.0));
}

#[test]
fn portuguese_field_names_are_audited() {
    let raw = r#"{
        "consumo_kwh": 1250,
        "valor_total": 485.75,
        "valor_energia": 342.50,
        "valor_bandeira": 0,
        "icms": 121.44,
        "subgrupo": "B3",
        "tipo_consumidor": "Poder Público",
        "tipo_ligacao": "trifasico",
        "bandeira_tarifaria": "verde",
        "numero_instalacao": "123456789",
        "mes_referencia": "05/2025",
        "historico_consumo": [1180, 1320, 1250]
    }"#;
    let from_portuguese = pipeline().run_json(raw);
    let typed = pipeline().run(&sample_bill());

    assert_eq!(from_portuguese.result.findings, typed.result.findings);
    assert_eq!(from_portuguese.result.summary.financial_impact, dec!(339.05));
}
