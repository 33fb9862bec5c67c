//! Rule-check trait and field requirements.
//!
//! RULE: Every rule check implements RuleCheck.
//! A check declares the fields it needs; the engine enforces them before
//! calling evaluate(), so evaluate() may assume every declared field is
//! present. Checks never read each other's findings.

use crate::{
    config::TariffTable,
    error::{EngineError, EngineResult},
    finding::Finding,
    record::BillRecord,
    types::HISTORY_WINDOW,
};
use rust_decimal::Decimal;

/// A bill field a rule check can depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ConsumptionKwh,
    TotalAmount,
    EnergyAmount,
    FlagSurchargeAmount,
    TariffSubgroup,
    ConsumerType,
    ConnectionType,
    PriceFlag,
    /// At least HISTORY_WINDOW months of history.
    ConsumptionHistory,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::ConsumptionKwh      => "consumption_kwh",
            Field::TotalAmount         => "total_amount",
            Field::EnergyAmount        => "energy_amount",
            Field::FlagSurchargeAmount => "flag_surcharge_amount",
            Field::TariffSubgroup      => "tariff_subgroup",
            Field::ConsumerType        => "consumer_type",
            Field::ConnectionType      => "connection_type",
            Field::PriceFlag           => "price_flag",
            Field::ConsumptionHistory  => "consumption_history",
        }
    }

    pub fn is_present(&self, record: &BillRecord) -> bool {
        match self {
            Field::ConsumptionKwh      => record.consumption_kwh.is_some(),
            Field::TotalAmount         => record.total_amount.is_some(),
            Field::EnergyAmount        => record.energy_amount.is_some(),
            Field::FlagSurchargeAmount => record.flag_surcharge_amount.is_some(),
            Field::TariffSubgroup      => record.tariff_subgroup.is_some(),
            Field::ConsumerType        => record.consumer_type.is_some(),
            Field::ConnectionType      => record.connection_type.is_some(),
            Field::PriceFlag           => record.price_flag.is_some(),
            Field::ConsumptionHistory  => record.consumption_history.len() >= HISTORY_WINDOW,
        }
    }
}

/// What the engine does when a required field is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingFieldPolicy {
    /// Produce nothing for this check.
    Skip,
    /// Produce one `inconsistent_data` finding (medium, zero impact).
    Diagnose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub field: Field,
    pub on_missing: MissingFieldPolicy,
}

impl Requirement {
    pub const fn skip(field: Field) -> Self {
        Self { field, on_missing: MissingFieldPolicy::Skip }
    }

    pub const fn diagnose(field: Field) -> Self {
        Self { field, on_missing: MissingFieldPolicy::Diagnose }
    }
}

/// The contract every rule check must fulfill.
pub trait RuleCheck: Send + Sync {
    /// Unique stable name, used in logs and in skipped/failed check lists.
    fn name(&self) -> &'static str;

    /// Fields that must be present, in the order they are checked.
    /// The first missing one decides the outcome.
    fn requirements(&self) -> &'static [Requirement];

    /// Evaluate the record. Pure: same inputs, same findings.
    /// An empty vec means the bill passed, or the check did not apply.
    fn evaluate(&self, record: &BillRecord, table: &TariffTable) -> EngineResult<Vec<Finding>>;
}

// ── Checked arithmetic helpers shared by the checks ─────────────────────────

pub(crate) fn mul(check: &'static str, a: Decimal, b: Decimal) -> EngineResult<Decimal> {
    a.checked_mul(b)
        .ok_or(EngineError::Arithmetic { check, operation: "multiplication" })
}

pub(crate) fn div(check: &'static str, a: Decimal, b: Decimal) -> EngineResult<Decimal> {
    a.checked_div(b)
        .ok_or(EngineError::Arithmetic { check, operation: "division" })
}

pub(crate) fn sub(check: &'static str, a: Decimal, b: Decimal) -> EngineResult<Decimal> {
    a.checked_sub(b)
        .ok_or(EngineError::Arithmetic { check, operation: "subtraction" })
}

/// Absolute difference between charged and expected, and whether it
/// strictly exceeds the tolerance.
pub(crate) fn exceeds(
    check: &'static str,
    charged: Decimal,
    expected: Decimal,
    tolerance: Decimal,
) -> EngineResult<(Decimal, bool)> {
    let difference = sub(check, charged, expected)?.abs();
    Ok((difference, difference > tolerance))
}
