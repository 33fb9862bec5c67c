//! Audit results: created once per audit, never mutated afterwards.

use crate::{
    finding::Finding,
    types::{AuditId, Money},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Processed,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallStatus {
    #[serde(rename = "Conforming")]
    Conforming,
    #[serde(rename = "Non-Conforming")]
    NonConforming,
    #[serde(rename = "Processing Error")]
    ProcessingError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total_irregularities: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub financial_impact: Money,
    pub overall_status: OverallStatus,
}

impl AuditSummary {
    /// Recompute the summary from a list of findings. Idempotent.
    pub fn from_findings(findings: &[Finding]) -> Self {
        Self {
            total_irregularities: findings.len(),
            financial_impact: findings.iter().map(|f| f.financial_impact).sum(),
            overall_status: if findings.is_empty() {
                OverallStatus::Conforming
            } else {
                OverallStatus::NonConforming
            },
        }
    }

    fn processing_error() -> Self {
        Self {
            total_irregularities: 0,
            financial_impact: Decimal::ZERO,
            overall_status: OverallStatus::ProcessingError,
        }
    }
}

/// A check the engine did not evaluate because a required field was absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedCheck {
    pub check: String,
    pub missing_field: String,
}

/// A check whose evaluation failed; the remaining checks still ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFailure {
    pub check: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    pub audit_id: AuditId,
    pub status: AuditStatus,
    pub timestamp: DateTime<Utc>,
    pub tariff_version: String,
    /// In check execution order.
    pub findings: Vec<Finding>,
    pub summary: AuditSummary,
    pub skipped_checks: Vec<SkippedCheck>,
    pub failed_checks: Vec<CheckFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditResult {
    pub(crate) fn new(
        tariff_version: String,
        findings: Vec<Finding>,
        skipped_checks: Vec<SkippedCheck>,
        failed_checks: Vec<CheckFailure>,
        evaluated_checks: usize,
    ) -> Self {
        // Low-confidence result: nothing was produced and nothing ran to completion.
        let unusable = findings.is_empty() && evaluated_checks == 0 && !failed_checks.is_empty();
        let (status, summary, error) = if unusable {
            let reasons = failed_checks
                .iter()
                .map(|f| format!("{}: {}", f.check, f.reason))
                .collect::<Vec<_>>()
                .join("; ");
            (
                AuditStatus::Error,
                AuditSummary::processing_error(),
                Some(format!("No rule check could be evaluated ({reasons})")),
            )
        } else {
            (AuditStatus::Processed, AuditSummary::from_findings(&findings), None)
        };

        Self {
            audit_id: uuid::Uuid::new_v4(),
            status,
            timestamp: Utc::now(),
            tariff_version,
            findings,
            summary,
            skipped_checks,
            failed_checks,
            error,
        }
    }

    /// Result for a record that never reached the engine, e.g. undecodable input.
    pub fn processing_error(tariff_version: String, reason: impl Into<String>) -> Self {
        Self {
            audit_id: uuid::Uuid::new_v4(),
            status: AuditStatus::Error,
            timestamp: Utc::now(),
            tariff_version,
            findings: Vec::new(),
            summary: AuditSummary::processing_error(),
            skipped_checks: Vec::new(),
            failed_checks: Vec::new(),
            error: Some(reason.into()),
        }
    }

    pub fn is_conforming(&self) -> bool {
        self.summary.overall_status == OverallStatus::Conforming
    }
}
