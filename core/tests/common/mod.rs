#![allow(dead_code)]

use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use tariff_audit_core::{
    finding::{Finding, FindingKind},
    record::{BillRecord, ConnectionType, PriceFlag, TariffSubgroup},
};

/// The public-administration bill the sample data set is built around:
/// 1250 kWh, B3, three-phase, green flag, energy line 342.50.
pub fn sample_bill() -> BillRecord {
    BillRecord {
        consumption_kwh: Some(dec!(1250)),
        total_amount: Some(dec!(485.75)),
        energy_amount: Some(dec!(342.50)),
        flag_surcharge_amount: Some(dec!(0)),
        taxes: BTreeMap::from([
            ("ICMS".to_string(), dec!(121.44)),
            ("PIS".to_string(), dec!(5.68)),
            ("COFINS".to_string(), dec!(26.03)),
        ]),
        tariff_subgroup: Some(TariffSubgroup::B3),
        consumer_type: Some("Poder Público".into()),
        connection_type: Some(ConnectionType::ThreePhase),
        price_flag: Some(PriceFlag::Green),
        installation_id: Some("123456789".into()),
        reference_period: Some("05/2025".into()),
        consumption_history: vec![dec!(1180), dec!(1320), dec!(1250)],
        utility: Some("ENERGISA RONDONIA".into()),
        due_date: Some("2025-06-15".into()),
        reading_date: Some("2025-05-20".into()),
    }
}

/// A residential bill that passes every check.
pub fn clean_residential_bill() -> BillRecord {
    BillRecord {
        consumption_kwh: Some(dec!(100)),
        total_amount: Some(dec!(65.73)),
        energy_amount: Some(dec!(52.58)),
        flag_surcharge_amount: Some(dec!(0)),
        taxes: BTreeMap::from([("ICMS".to_string(), dec!(13.15))]),
        tariff_subgroup: Some(TariffSubgroup::B1),
        consumer_type: Some("Residencial".into()),
        connection_type: Some(ConnectionType::SinglePhase),
        price_flag: Some(PriceFlag::Green),
        installation_id: Some("42".into()),
        reference_period: Some("04/2025".into()),
        consumption_history: vec![dec!(95), dec!(105), dec!(100)],
        ..Default::default()
    }
}

pub fn of_kind(findings: &[Finding], kind: FindingKind) -> Vec<&Finding> {
    findings.iter().filter(|f| f.kind == kind).collect()
}

pub fn data_dir() -> String {
    format!("{}/../data", env!("CARGO_MANIFEST_DIR"))
}

/// Route `log` output through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
