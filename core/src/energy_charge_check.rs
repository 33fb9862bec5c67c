//! Energy-charge check: the energy line must equal consumption times the
//! subgroup's unit price (usage + distribution), within a tolerance that
//! is a fraction of the expected charge.

use crate::{
    config::TariffTable,
    error::EngineResult,
    finding::{Finding, FindingKind, Severity},
    record::BillRecord,
    rule::{self, Field, Requirement, RuleCheck},
};

const NAME: &str = "energy_charge";
const REQUIREMENTS: &[Requirement] = &[
    Requirement::skip(Field::ConsumptionKwh),
    Requirement::skip(Field::TariffSubgroup),
    Requirement::diagnose(Field::EnergyAmount),
];

pub struct EnergyChargeCheck;

impl RuleCheck for EnergyChargeCheck {
    fn name(&self) -> &'static str {
        NAME
    }

    fn requirements(&self) -> &'static [Requirement] {
        REQUIREMENTS
    }

    fn evaluate(&self, record: &BillRecord, table: &TariffTable) -> EngineResult<Vec<Finding>> {
        let (Some(kwh), Some(subgroup), Some(charged)) =
            (record.consumption_kwh, record.tariff_subgroup, record.energy_amount)
        else {
            return Ok(Vec::new());
        };
        let Some(rate) = table.rate(subgroup) else {
            log::debug!("{NAME}: subgroup {subgroup} not in tariff table {}", table.version);
            return Ok(Vec::new());
        };

        let expected = rule::mul(NAME, kwh, rate.unit_price())?;
        let tolerance = rule::mul(NAME, expected, table.tolerances.energy_charge_pct)?;
        let (difference, violated) = rule::exceeds(NAME, charged, expected, tolerance)?;
        if !violated {
            return Ok(Vec::new());
        }

        Ok(vec![Finding::new(
            FindingKind::EnergyCharge,
            Severity::High,
            difference,
            format!(
                "Energy charged {charged:.2}, expected {expected:.2} for {kwh} kWh at {subgroup} rates"
            ),
            "Verify the usage (TE) and distribution (TUSD) rates applied",
        )])
    }
}
