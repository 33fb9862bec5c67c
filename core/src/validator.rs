//! Field validator: screens a record for missing or invalid fields
//! before auditing. Advisory only: it never blocks the audit.

use crate::record::BillRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const MISSING_CONSUMPTION: &str = "consumption_kwh missing or not positive";
pub const MISSING_TOTAL: &str = "total_amount missing or not positive";
pub const MISSING_SUBGROUP: &str = "tariff_subgroup not identified";
pub const MISSING_INSTALLATION: &str = "installation_id not found";
pub const MISSING_PERIOD: &str = "reference_period not identified";
pub const MISSING_FLAG: &str = "price_flag not identified";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub critical: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn has_critical(&self) -> bool {
        !self.critical.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.critical.is_empty() && self.warnings.is_empty()
    }
}

pub struct FieldValidator;

impl FieldValidator {
    pub fn validate(record: &BillRecord) -> ValidationReport {
        let mut report = ValidationReport::default();

        if !record.consumption_kwh.is_some_and(|kwh| kwh > Decimal::ZERO) {
            report.critical.push(MISSING_CONSUMPTION.to_string());
        }
        if !record.total_amount.is_some_and(|total| total > Decimal::ZERO) {
            report.critical.push(MISSING_TOTAL.to_string());
        }
        if record.tariff_subgroup.is_none() {
            report.critical.push(MISSING_SUBGROUP.to_string());
        }

        if record.installation_id.as_deref().map_or(true, |s| s.trim().is_empty()) {
            report.warnings.push(MISSING_INSTALLATION.to_string());
        }
        if record.reference_period.as_deref().map_or(true, |s| s.trim().is_empty()) {
            report.warnings.push(MISSING_PERIOD.to_string());
        }
        if record.price_flag.is_none() {
            report.warnings.push(MISSING_FLAG.to_string());
        }

        report
    }
}
