//! Classification check: public entities must be billed under a
//! public-sector subgroup. Informational; carries no monetary impact.

use crate::{
    config::TariffTable,
    error::EngineResult,
    finding::{Finding, FindingKind, Severity},
    record::BillRecord,
    rule::{Field, Requirement, RuleCheck},
};

const NAME: &str = "classification";
const REQUIREMENTS: &[Requirement] = &[Requirement::skip(Field::ConsumerType)];

pub struct ClassificationCheck;

impl RuleCheck for ClassificationCheck {
    fn name(&self) -> &'static str {
        NAME
    }

    fn requirements(&self) -> &'static [Requirement] {
        REQUIREMENTS
    }

    fn evaluate(&self, record: &BillRecord, table: &TariffTable) -> EngineResult<Vec<Finding>> {
        let Some(consumer_type) = record.consumer_type.as_deref() else {
            return Ok(Vec::new());
        };
        let rule = &table.classification;
        if !rule.is_public_entity(consumer_type) {
            return Ok(Vec::new());
        }
        // An absent subgroup is as wrong as an ineligible one.
        if record
            .tariff_subgroup
            .is_some_and(|s| rule.is_public_sector_subgroup(s))
        {
            return Ok(Vec::new());
        }

        let current = record
            .tariff_subgroup
            .map(|s| s.as_str())
            .unwrap_or("no subgroup");
        let eligible = rule
            .public_sector_subgroups
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" or ");

        Ok(vec![Finding::informational(
            FindingKind::Classification,
            Severity::High,
            format!("Public entity '{consumer_type}' billed under {current}, should be {eligible}"),
            "Request reclassification to the applicable tariff subgroup",
        )])
    }
}
