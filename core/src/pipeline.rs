//! Audit pipeline: validator → engine → advisor, combined into the
//! report handed back to external callers.
//!
//! RULE: a pipeline call never fails. Undecodable input and failing
//! checks come back as error-status reports, so one bad record cannot
//! halt a batch.

use crate::{
    advisor::RecommendationAdvisor,
    config::AuditConfig,
    engine::AuditEngine,
    record::BillRecord,
    result::{AuditResult, AuditStatus, OverallStatus},
    types::Money,
    validator::{FieldValidator, ValidationReport},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The full answer for one bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    #[serde(flatten)]
    pub result: AuditResult,
    pub recommendations: Vec<String>,
    pub field_warnings: ValidationReport,
    /// The record as audited, after lenient decoding. Absent when the
    /// input could not be decoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<BillRecord>,
}

pub struct AuditPipeline {
    config: AuditConfig,
    engine: AuditEngine,
    advisor: RecommendationAdvisor,
}

impl AuditPipeline {
    pub fn new(config: AuditConfig) -> Self {
        Self::with_engine(config, AuditEngine::build())
    }

    /// Use a custom engine, e.g. one with extra checks registered.
    pub fn with_engine(config: AuditConfig, engine: AuditEngine) -> Self {
        let advisor = RecommendationAdvisor::new(config.advisor.clone());
        Self { config, engine, advisor }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn run(&self, record: &BillRecord) -> AuditReport {
        let field_warnings = FieldValidator::validate(record);
        if field_warnings.has_critical() {
            log::warn!(
                "Auditing record {} with critical field issues: {}",
                record.installation_id.as_deref().unwrap_or("<unknown>"),
                field_warnings.critical.join("; ")
            );
        }

        let result = self.engine.audit(record, &self.config.tariffs);
        let recommendations = self.advisor.recommend(record);

        log::info!(
            "Audit {} finished: {} findings, impact {}",
            result.audit_id,
            result.summary.total_irregularities,
            result.summary.financial_impact
        );

        AuditReport {
            result,
            recommendations,
            field_warnings,
            record: Some(record.clone()),
        }
    }

    /// Decode and audit one JSON record.
    pub fn run_json(&self, raw: &str) -> AuditReport {
        match BillRecord::from_json(raw) {
            Ok(record) => self.run(&record),
            Err(e) => {
                log::warn!("Rejected undecodable bill record: {e}");
                AuditReport {
                    result: AuditResult::processing_error(
                        self.config.tariffs.version.clone(),
                        format!("Could not decode bill record: {e}"),
                    ),
                    recommendations: Vec::new(),
                    field_warnings: ValidationReport::default(),
                    record: None,
                }
            }
        }
    }

    /// Audit every record independently, in input order.
    pub fn run_batch(&self, records: &[BillRecord]) -> Vec<AuditReport> {
        records.iter().map(|r| self.run(r)).collect()
    }
}

/// Totals across a batch of reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub audited: usize,
    pub conforming: usize,
    pub non_conforming: usize,
    pub errors: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub financial_impact: Money,
}

impl BatchSummary {
    pub fn from_reports(reports: &[AuditReport]) -> Self {
        let mut summary = BatchSummary {
            audited: reports.len(),
            financial_impact: Decimal::ZERO,
            ..Default::default()
        };
        for report in reports {
            match (report.result.status, report.result.summary.overall_status) {
                (AuditStatus::Error, _) | (_, OverallStatus::ProcessingError) => summary.errors += 1,
                (_, OverallStatus::Conforming) => summary.conforming += 1,
                (_, OverallStatus::NonConforming) => summary.non_conforming += 1,
            }
            summary.financial_impact += report.result.summary.financial_impact;
        }
        summary
    }
}
