//! Shared primitive types used across the audit engine.

use rust_decimal::Decimal;

/// Energy volume in kWh.
pub type Kwh = Decimal;

/// A currency amount in the bill's currency unit.
pub type Money = Decimal;

/// Per-kWh rate in currency units.
pub type Rate = Decimal;

/// The canonical audit identifier.
pub type AuditId = uuid::Uuid;

/// Number of consumption months the history check looks back over.
pub const HISTORY_WINDOW: usize = 3;
