//! The audit engine: runs every rule check against one bill record.
//!
//! EXECUTION ORDER (fixed):
//!   1. Classification
//!   2. Energy charge
//!   3. Minimum billing
//!   4. Price flag
//!   5. Tax
//!   6. Consumption history
//!
//! RULES:
//!   - Checks execute in registration order; findings keep that order.
//!   - Required fields are enforced here, before evaluate() is called.
//!   - One failing check never stops the others.
//!   - The engine holds no mutable state; audit() may run on any thread.

use crate::{
    classification_check::ClassificationCheck,
    config::TariffTable,
    energy_charge_check::EnergyChargeCheck,
    error::EngineError,
    finding::Finding,
    history_check::HistoryCheck,
    minimum_billing_check::MinimumBillingCheck,
    price_flag_check::PriceFlagCheck,
    record::BillRecord,
    result::{AuditResult, CheckFailure, SkippedCheck},
    rule::{Field, MissingFieldPolicy, RuleCheck},
    tax_check::TaxCheck,
};
use std::panic::{self, AssertUnwindSafe};

enum CheckRun {
    Evaluated(Vec<Finding>),
    Skipped(Field),
    Diagnosed(Field),
    Failed(EngineError),
}

pub struct AuditEngine {
    checks: Vec<Box<dyn RuleCheck>>,
}

impl AuditEngine {
    /// An engine with no checks registered.
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Build an engine with every rule check registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build() -> Self {
        let mut engine = AuditEngine::new();

        // EXECUTION ORDER: fixed, never reordered.
        engine.register(Box::new(ClassificationCheck));
        engine.register(Box::new(EnergyChargeCheck));
        engine.register(Box::new(MinimumBillingCheck));
        engine.register(Box::new(PriceFlagCheck));
        engine.register(Box::new(TaxCheck));
        engine.register(Box::new(HistoryCheck));
        engine
    }

    /// Register a check. Call in the documented execution order.
    pub fn register(&mut self, check: Box<dyn RuleCheck>) {
        self.checks.push(check);
    }

    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Audit one record. Never fails: problems with the record or with a
    /// check are reported inside the result.
    pub fn audit(&self, record: &BillRecord, table: &TariffTable) -> AuditResult {
        let mut findings = Vec::new();
        let mut skipped = Vec::new();
        let mut failed = Vec::new();
        let mut evaluated = 0usize;

        for check in &self.checks {
            let name = check.name();
            match Self::run_check(check.as_ref(), record, table) {
                CheckRun::Evaluated(new_findings) => {
                    evaluated += 1;
                    findings.extend(new_findings);
                }
                CheckRun::Skipped(field) => {
                    log::debug!("Check '{name}' skipped: {} missing", field.name());
                    skipped.push(SkippedCheck {
                        check: name.to_string(),
                        missing_field: field.name().to_string(),
                    });
                }
                CheckRun::Diagnosed(field) => {
                    log::debug!("Check '{name}' could not run: {} missing", field.name());
                    findings.push(Finding::inconsistent_data(name, field.name()));
                    skipped.push(SkippedCheck {
                        check: name.to_string(),
                        missing_field: field.name().to_string(),
                    });
                }
                CheckRun::Failed(err) => {
                    log::warn!("Check '{name}' failed: {err}");
                    failed.push(CheckFailure {
                        check: name.to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        AuditResult::new(table.version.clone(), findings, skipped, failed, evaluated)
    }

    fn run_check(check: &dyn RuleCheck, record: &BillRecord, table: &TariffTable) -> CheckRun {
        for requirement in check.requirements() {
            if !requirement.field.is_present(record) {
                return match requirement.on_missing {
                    MissingFieldPolicy::Skip => CheckRun::Skipped(requirement.field),
                    MissingFieldPolicy::Diagnose => CheckRun::Diagnosed(requirement.field),
                };
            }
        }

        match panic::catch_unwind(AssertUnwindSafe(|| check.evaluate(record, table))) {
            Ok(Ok(findings)) => CheckRun::Evaluated(findings),
            Ok(Err(err)) => CheckRun::Failed(err),
            Err(_) => CheckRun::Failed(EngineError::CheckPanicked { check: check.name() }),
        }
    }
}

impl Default for AuditEngine {
    fn default() -> Self {
        Self::build()
    }
}
