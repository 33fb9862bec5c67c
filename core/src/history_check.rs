//! History-anomaly check: compares the latest month against the mean of
//! the last HISTORY_WINDOW months. A local heuristic, not a statistical
//! model; the window is fixed.

use crate::{
    config::TariffTable,
    error::{EngineError, EngineResult},
    finding::{Finding, FindingKind, Severity},
    record::BillRecord,
    rule::{self, Field, Requirement, RuleCheck},
    types::HISTORY_WINDOW,
};
use rust_decimal::Decimal;

const NAME: &str = "consumption_history";
const REQUIREMENTS: &[Requirement] = &[Requirement::skip(Field::ConsumptionHistory)];

pub struct HistoryCheck;

impl RuleCheck for HistoryCheck {
    fn name(&self) -> &'static str {
        NAME
    }

    fn requirements(&self) -> &'static [Requirement] {
        REQUIREMENTS
    }

    fn evaluate(&self, record: &BillRecord, table: &TariffTable) -> EngineResult<Vec<Finding>> {
        let history = &record.consumption_history;
        if history.len() < HISTORY_WINDOW {
            return Ok(Vec::new());
        }
        let window = &history[history.len() - HISTORY_WINDOW..];
        let latest = window[HISTORY_WINDOW - 1];

        let sum = window
            .iter()
            .try_fold(Decimal::ZERO, |acc, kwh| acc.checked_add(*kwh))
            .ok_or(EngineError::Arithmetic { check: NAME, operation: "addition" })?;
        let mean = rule::div(NAME, sum, Decimal::from(HISTORY_WINDOW))?;

        let tolerances = &table.tolerances;
        let high = rule::mul(NAME, mean, tolerances.history_high_ratio)?;
        let low = rule::mul(NAME, mean, tolerances.history_low_ratio)?;

        let finding = if latest > high {
            Finding::informational(
                FindingKind::ConsumptionAnomaly,
                Severity::Low,
                format!(
                    "Anomalously high consumption: {latest} kWh is above {}x the {HISTORY_WINDOW}-month mean ({mean:.1} kWh)",
                    tolerances.history_high_ratio
                ),
                "Check for leaks or faulty equipment",
            )
        } else if latest < low {
            Finding::informational(
                FindingKind::ConsumptionAnomaly,
                Severity::Low,
                format!(
                    "Anomalously low consumption: {latest} kWh is below {}x the {HISTORY_WINDOW}-month mean ({mean:.1} kWh)",
                    tolerances.history_low_ratio
                ),
                "Check for a metering problem or an estimated reading",
            )
        } else {
            return Ok(Vec::new());
        };

        Ok(vec![finding])
    }
}
