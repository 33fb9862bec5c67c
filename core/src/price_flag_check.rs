//! Price-flag check: the flag surcharge must equal consumption times the
//! flag's per-kWh rate, within a fixed absolute tolerance.

use crate::{
    config::TariffTable,
    error::EngineResult,
    finding::{Finding, FindingKind, Severity},
    record::BillRecord,
    rule::{self, Field, Requirement, RuleCheck},
};

const NAME: &str = "price_flag";
const REQUIREMENTS: &[Requirement] = &[
    Requirement::skip(Field::PriceFlag),
    Requirement::skip(Field::ConsumptionKwh),
    Requirement::skip(Field::FlagSurchargeAmount),
];

pub struct PriceFlagCheck;

impl RuleCheck for PriceFlagCheck {
    fn name(&self) -> &'static str {
        NAME
    }

    fn requirements(&self) -> &'static [Requirement] {
        REQUIREMENTS
    }

    fn evaluate(&self, record: &BillRecord, table: &TariffTable) -> EngineResult<Vec<Finding>> {
        let (Some(flag), Some(kwh), Some(charged)) =
            (record.price_flag, record.consumption_kwh, record.flag_surcharge_amount)
        else {
            return Ok(Vec::new());
        };
        let Some(rate) = table.flag_rate(flag) else {
            log::debug!("{NAME}: flag {flag} not in tariff table {}", table.version);
            return Ok(Vec::new());
        };

        let expected = rule::mul(NAME, kwh, rate)?;
        let (difference, violated) =
            rule::exceeds(NAME, charged, expected, table.tolerances.price_flag_abs)?;
        if !violated {
            return Ok(Vec::new());
        }

        Ok(vec![Finding::new(
            FindingKind::PriceFlag,
            Severity::Medium,
            difference,
            format!("Flag {flag} surcharge charged {charged:.2}, expected {expected:.2}"),
            "Verify the price flag in force and its per-kWh surcharge",
        )])
    }
}
