//! Recommendation advisor: non-punitive suggestions derived from a bill.
//! These are advice, not irregularities, and never affect the summary.

use crate::{config::AdvisorConfig, record::BillRecord};

pub const TIME_OF_USE_ADVICE: &str =
    "Consider moving to the time-of-use (white) tariff if consumption is concentrated outside peak hours";
pub const EFFICIENCY_AUDIT_ADVICE: &str =
    "Commission an energy-efficiency audit to identify savings opportunities";
pub const MONITORING_ADVICE: &str =
    "Implement monthly consumption monitoring to detect anomalies early";

#[derive(Debug, Clone)]
pub struct RecommendationAdvisor {
    config: AdvisorConfig,
}

impl RecommendationAdvisor {
    pub fn new(config: AdvisorConfig) -> Self {
        Self { config }
    }

    /// Suggestions in a fixed order; monitoring advice is always last.
    pub fn recommend(&self, record: &BillRecord) -> Vec<String> {
        let mut advice = Vec::new();

        if let (Some(subgroup), Some(kwh)) = (record.tariff_subgroup, record.consumption_kwh) {
            if self.config.time_of_use_subgroups.contains(&subgroup)
                && kwh > self.config.time_of_use_min_kwh
            {
                advice.push(TIME_OF_USE_ADVICE.to_string());
            }
        }

        if record
            .consumption_kwh
            .is_some_and(|kwh| kwh > self.config.efficiency_audit_min_kwh)
        {
            advice.push(EFFICIENCY_AUDIT_ADVICE.to_string());
        }

        advice.push(MONITORING_ADVICE.to_string());
        advice
    }
}

impl Default for RecommendationAdvisor {
    fn default() -> Self {
        Self::new(AdvisorConfig::default())
    }
}
