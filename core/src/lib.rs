//! Electricity-bill audit engine.
//!
//! A bill record is screened by the field validator, evaluated by the
//! rule checks against a versioned tariff table, and enriched with
//! advisory recommendations. See `pipeline::AuditPipeline` for the
//! combined entry point.

pub mod advisor;
pub mod classification_check;
pub mod config;
pub mod energy_charge_check;
pub mod engine;
pub mod error;
pub mod finding;
pub mod history_check;
pub mod lenient;
pub mod minimum_billing_check;
pub mod pipeline;
pub mod price_flag_check;
pub mod record;
pub mod result;
pub mod rule;
pub mod tax_check;
pub mod types;
pub mod validator;

pub use config::{AuditConfig, TariffTable};
pub use engine::AuditEngine;
pub use error::{EngineError, EngineResult};
pub use finding::{Finding, FindingKind, Severity};
pub use pipeline::{AuditPipeline, AuditReport};
pub use record::BillRecord;
pub use result::AuditResult;
