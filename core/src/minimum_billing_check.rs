//! Minimum-billing check: below the connection's minimum volume the bill
//! must charge the minimum volume at the subgroup's unit price.

use crate::{
    config::TariffTable,
    error::EngineResult,
    finding::{Finding, FindingKind, Severity},
    record::BillRecord,
    rule::{self, Field, Requirement, RuleCheck},
};

const NAME: &str = "minimum_billing";
const REQUIREMENTS: &[Requirement] = &[
    Requirement::skip(Field::ConsumptionKwh),
    Requirement::skip(Field::ConnectionType),
    Requirement::skip(Field::TariffSubgroup),
    Requirement::skip(Field::EnergyAmount),
];

pub struct MinimumBillingCheck;

impl RuleCheck for MinimumBillingCheck {
    fn name(&self) -> &'static str {
        NAME
    }

    fn requirements(&self) -> &'static [Requirement] {
        REQUIREMENTS
    }

    fn evaluate(&self, record: &BillRecord, table: &TariffTable) -> EngineResult<Vec<Finding>> {
        let (Some(kwh), Some(connection), Some(subgroup), Some(charged)) = (
            record.consumption_kwh,
            record.connection_type,
            record.tariff_subgroup,
            record.energy_amount,
        ) else {
            return Ok(Vec::new());
        };
        let Some(minimum_kwh) = table.minimum_kwh(connection) else {
            return Ok(Vec::new());
        };
        if kwh >= minimum_kwh {
            return Ok(Vec::new());
        }
        let Some(rate) = table.rate(subgroup) else {
            log::debug!("{NAME}: subgroup {subgroup} not in tariff table {}", table.version);
            return Ok(Vec::new());
        };

        let expected = rule::mul(NAME, minimum_kwh, rate.unit_price())?;
        let tolerance = rule::mul(NAME, expected, table.tolerances.minimum_billing_pct)?;
        let (difference, violated) = rule::exceeds(NAME, charged, expected, tolerance)?;
        if !violated {
            return Ok(Vec::new());
        }

        Ok(vec![Finding::new(
            FindingKind::MinimumBilling,
            Severity::Medium,
            difference,
            format!(
                "Consumption {kwh} kWh is below the {minimum_kwh} kWh minimum for {connection}; \
                 charged {charged:.2}, minimum charge is {expected:.2}"
            ),
            format!("Verify the minimum billing of {minimum_kwh} kWh was applied"),
        )])
    }
}
