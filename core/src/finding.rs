//! Findings: the only output a rule check produces.
//!
//! RULE: a Finding is immutable once created. Its financial impact is
//! rounded to cents at construction, so every total computed from a list
//! of findings equals the sum of the impacts a caller sees.

use crate::types::Money;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Every irregularity a rule check can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    Classification,
    EnergyCharge,
    MinimumBilling,
    PriceFlag,
    Tax,
    ConsumptionAnomaly,
    /// A check could not evaluate because a required field was missing.
    InconsistentData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub kind:             FindingKind,
    pub description:      String,
    pub severity:         Severity,
    #[serde(with = "rust_decimal::serde::float")]
    pub financial_impact: Money,
    pub recommendation:   String,
}

impl Finding {
    pub fn new(
        kind: FindingKind,
        severity: Severity,
        financial_impact: Money,
        description: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            description: description.into(),
            severity,
            financial_impact: round_money(financial_impact.abs()),
            recommendation: recommendation.into(),
        }
    }

    /// A finding that flags a condition without a monetary impact.
    pub fn informational(
        kind: FindingKind,
        severity: Severity,
        description: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self::new(kind, severity, Decimal::ZERO, description, recommendation)
    }

    /// The diagnostic emitted when a check cannot run on the record.
    pub fn inconsistent_data(check: &str, missing_field: &str) -> Self {
        Self::informational(
            FindingKind::InconsistentData,
            Severity::Medium,
            format!("Could not run the {check} check: {missing_field} is missing or invalid"),
            "Verify the bill data manually",
        )
    }
}

/// Round a currency amount to cents, midpoints away from zero.
pub fn round_money(amount: Money) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
