//! Tax check: each configured tax charged on the bill is recomputed from
//! its base and compared with a tolerance that is a fraction of the bill
//! total.
//!
//! Taxes levied on the total are included in it, so the base is
//! grossed up: base = total / (1 + rate), expected = base × rate.

use crate::{
    config::{TariffTable, TaxBase, TaxRule},
    error::EngineResult,
    finding::{Finding, FindingKind, Severity},
    record::BillRecord,
    rule::{self, Field, Requirement, RuleCheck},
    types::Money,
};
use rust_decimal::Decimal;

const NAME: &str = "tax";
const REQUIREMENTS: &[Requirement] = &[Requirement::skip(Field::TotalAmount)];

pub struct TaxCheck;

impl TaxCheck {
    fn expected_tax(tax: &TaxRule, record: &BillRecord, total: Money) -> EngineResult<Option<Money>> {
        match tax.base {
            TaxBase::TotalAmount => {
                let divisor = Decimal::ONE + tax.rate;
                let base = rule::div(NAME, total, divisor)?;
                Ok(Some(rule::mul(NAME, base, tax.rate)?))
            }
            TaxBase::EnergyAmount => match record.energy_amount {
                Some(energy) => Ok(Some(rule::mul(NAME, energy, tax.rate)?)),
                None => Ok(None),
            },
        }
    }
}

impl RuleCheck for TaxCheck {
    fn name(&self) -> &'static str {
        NAME
    }

    fn requirements(&self) -> &'static [Requirement] {
        REQUIREMENTS
    }

    fn evaluate(&self, record: &BillRecord, table: &TariffTable) -> EngineResult<Vec<Finding>> {
        let Some(total) = record.total_amount else {
            return Ok(Vec::new());
        };
        let tolerance = rule::mul(NAME, total, table.tolerances.tax_pct_of_total)?;
        let mut findings = Vec::new();

        for tax in &table.taxes {
            let Some(charged) = record.tax(&tax.name) else {
                continue;
            };
            let Some(expected) = Self::expected_tax(tax, record, total)? else {
                log::debug!("{NAME}: {} skipped, energy_amount missing", tax.name);
                continue;
            };

            let (difference, violated) = rule::exceeds(NAME, charged, expected, tolerance)?;
            if violated {
                findings.push(Finding::new(
                    FindingKind::Tax,
                    Severity::High,
                    difference,
                    format!("{} charged {charged:.2}, expected {expected:.2}", tax.name),
                    format!("Verify the {} rate and calculation base", tax.name),
                ));
            }
        }

        Ok(findings)
    }
}
