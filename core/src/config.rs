//! Reference data: tariff tables, tax rules, tolerances and advisor
//! thresholds. Loaded once from the data/ directory and never mutated.

use crate::{
    error::{EngineError, EngineResult},
    record::{ConnectionType, PriceFlag, TariffSubgroup},
    types::{Kwh, Rate},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubgroupRate {
    pub subgroup: TariffSubgroup,
    /// Energy component (TE), per kWh.
    pub usage_rate: Rate,
    /// Distribution-system component (TUSD), per kWh.
    pub distribution_rate: Rate,
}

impl SubgroupRate {
    pub fn unit_price(&self) -> Rate {
        self.usage_rate + self.distribution_rate
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimumBilling {
    pub connection_type: ConnectionType,
    pub minimum_kwh: Kwh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagRate {
    pub flag: PriceFlag,
    pub rate_per_kwh: Rate,
}

/// Which bill amount a tax is levied on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxBase {
    /// Tax is included in the bill total ("gross-up").
    TotalAmount,
    /// Tax is a straight percentage of the energy charge.
    EnergyAmount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRule {
    pub name: String,
    pub rate: Rate,
    pub base: TaxBase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRule {
    /// Lower-case fragments that mark a consumer type as a public entity.
    pub public_entity_keywords: Vec<String>,
    pub public_sector_subgroups: Vec<TariffSubgroup>,
}

impl ClassificationRule {
    pub fn is_public_entity(&self, consumer_type: &str) -> bool {
        let consumer_type = consumer_type.to_lowercase();
        self.public_entity_keywords
            .iter()
            .any(|k| consumer_type.contains(&k.to_lowercase()))
    }

    pub fn is_public_sector_subgroup(&self, subgroup: TariffSubgroup) -> bool {
        self.public_sector_subgroups.contains(&subgroup)
    }
}

/// Thresholds above which a difference counts as an irregularity.
/// Percentages are fractions (0.05 = 5 %).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    /// Fraction of the expected energy charge.
    pub energy_charge_pct: Decimal,
    /// Fraction of the expected minimum charge.
    pub minimum_billing_pct: Decimal,
    /// Absolute currency amount.
    pub price_flag_abs: Decimal,
    /// Fraction of the bill total.
    pub tax_pct_of_total: Decimal,
    pub history_high_ratio: Decimal,
    pub history_low_ratio: Decimal,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            energy_charge_pct:   dec!(0.05),
            minimum_billing_pct: dec!(0.05),
            price_flag_abs:      dec!(0.01),
            tax_pct_of_total:    dec!(0.01),
            history_high_ratio:  dec!(1.5),
            history_low_ratio:   dec!(0.5),
        }
    }
}

/// Everything a rule check may look up. Immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct TariffTable {
    pub version: String,
    pub subgroups: HashMap<TariffSubgroup, SubgroupRate>,
    pub minimum_billing: HashMap<ConnectionType, Kwh>,
    pub price_flags: HashMap<PriceFlag, Rate>,
    /// Audited in this order.
    pub taxes: Vec<TaxRule>,
    pub classification: ClassificationRule,
    pub tolerances: Tolerances,
}

impl TariffTable {
    pub fn rate(&self, subgroup: TariffSubgroup) -> Option<&SubgroupRate> {
        self.subgroups.get(&subgroup)
    }

    pub fn minimum_kwh(&self, connection_type: ConnectionType) -> Option<Kwh> {
        self.minimum_billing.get(&connection_type).copied()
    }

    pub fn flag_rate(&self, flag: PriceFlag) -> Option<Rate> {
        self.price_flags.get(&flag).copied()
    }

    /// Reject tables no regulator would publish.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |msg: String| Err(EngineError::InvalidConfig(msg));

        if self.version.trim().is_empty() {
            return invalid("tariff table has no version".into());
        }
        for rate in self.subgroups.values() {
            if rate.usage_rate.is_sign_negative() || rate.distribution_rate.is_sign_negative() {
                return invalid(format!("negative rate for subgroup {}", rate.subgroup));
            }
        }
        for (connection, kwh) in &self.minimum_billing {
            if kwh.is_sign_negative() {
                return invalid(format!("negative minimum billing for {connection}"));
            }
        }
        for (flag, rate) in &self.price_flags {
            if rate.is_sign_negative() {
                return invalid(format!("negative surcharge for flag {flag}"));
            }
        }
        for tax in &self.taxes {
            if tax.rate.is_sign_negative() || tax.rate >= Decimal::ONE {
                return invalid(format!("tax {} rate must be in [0, 1)", tax.name));
            }
        }
        for subgroup in &self.classification.public_sector_subgroups {
            if !self.subgroups.contains_key(subgroup) {
                return invalid(format!("public-sector subgroup {subgroup} has no rate"));
            }
        }

        let t = &self.tolerances;
        let all = [
            t.energy_charge_pct,
            t.minimum_billing_pct,
            t.price_flag_abs,
            t.tax_pct_of_total,
            t.history_high_ratio,
            t.history_low_ratio,
        ];
        if all.iter().any(|v| v.is_sign_negative()) {
            return invalid("tolerances must be non-negative".into());
        }
        if t.history_low_ratio > t.history_high_ratio {
            return invalid("history_low_ratio exceeds history_high_ratio".into());
        }
        Ok(())
    }

    /// The sample publication the engine ships with (ANEEL REN 1.000/2021
    /// group B values). Used by tests and when no data directory is given.
    pub fn reference() -> Self {
        let rates = [
            (TariffSubgroup::B1,            dec!(0.25141), dec!(0.27440)),
            (TariffSubgroup::B1LowIncome,   dec!(0.25141), dec!(0.21623)),
            (TariffSubgroup::B2Rural,       dec!(0.19107), dec!(0.20854)),
            (TariffSubgroup::B2Cooperative, dec!(0.19107), dec!(0.20854)),
            (TariffSubgroup::B2Irrigation,  dec!(0.17096), dec!(0.18659)),
            (TariffSubgroup::B3,            dec!(0.25141), dec!(0.27440)),
            (TariffSubgroup::B4A,           dec!(0.25141), dec!(0.27440)),
        ];

        Self {
            version: "REN-1000-2021-sample".into(),
            subgroups: rates
                .into_iter()
                .map(|(subgroup, usage_rate, distribution_rate)| {
                    (subgroup, SubgroupRate { subgroup, usage_rate, distribution_rate })
                })
                .collect(),
            minimum_billing: [
                (ConnectionType::SinglePhase, dec!(30)),
                (ConnectionType::TwoPhase,    dec!(50)),
                (ConnectionType::ThreePhase,  dec!(100)),
            ]
            .into(),
            price_flags: [
                (PriceFlag::Green,  dec!(0)),
                (PriceFlag::Yellow, dec!(0.01874)),
                (PriceFlag::Red1,   dec!(0.03971)),
                (PriceFlag::Red2,   dec!(0.09492)),
            ]
            .into(),
            taxes: vec![
                TaxRule { name: "ICMS".into(),   rate: dec!(0.25),   base: TaxBase::TotalAmount },
                TaxRule { name: "PIS".into(),    rate: dec!(0.0165), base: TaxBase::EnergyAmount },
                TaxRule { name: "COFINS".into(), rate: dec!(0.076),  base: TaxBase::EnergyAmount },
            ],
            classification: ClassificationRule {
                public_entity_keywords: ["público", "publico", "public", "governo", "government", "prefeitura"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                public_sector_subgroups: vec![TariffSubgroup::B3, TariffSubgroup::B4A],
            },
            tolerances: Tolerances::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Subgroups eligible for the time-of-use ("white") tariff.
    pub time_of_use_subgroups: Vec<TariffSubgroup>,
    /// Strictly above this, time-of-use is suggested.
    pub time_of_use_min_kwh: Kwh,
    /// Strictly above this, an efficiency audit is suggested.
    pub efficiency_audit_min_kwh: Kwh,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            time_of_use_subgroups: vec![TariffSubgroup::B3],
            time_of_use_min_kwh: dec!(250),
            efficiency_audit_min_kwh: dec!(1000),
        }
    }
}

// ── On-disk layout ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct TariffTableFile {
    version: String,
    subgroups: Vec<SubgroupRate>,
    minimum_billing: Vec<MinimumBilling>,
    price_flags: Vec<FlagRate>,
}

#[derive(Debug, Clone, Deserialize)]
struct TaxFile {
    taxes: Vec<TaxRule>,
}

/// The full reference data set the pipeline runs against.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditConfig {
    pub tariffs: TariffTable,
    pub advisor: AdvisorConfig,
}

impl AuditConfig {
    /// Load from the data/ directory.
    /// In tests, use AuditConfig::reference().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let table_file: TariffTableFile = read_json(&format!("{data_dir}/tariffs/tariff_table.json"))?;
        let tax_file: TaxFile = read_json(&format!("{data_dir}/tariffs/taxes.json"))?;
        let classification: ClassificationRule =
            read_json(&format!("{data_dir}/audit/classification.json"))?;
        let tolerances: Tolerances = read_json(&format!("{data_dir}/audit/tolerances.json"))?;
        let advisor: AdvisorConfig = read_json(&format!("{data_dir}/audit/advisor.json"))?;

        let tariffs = TariffTable {
            version: table_file.version,
            subgroups: table_file
                .subgroups
                .into_iter()
                .map(|r| (r.subgroup, r))
                .collect(),
            minimum_billing: table_file
                .minimum_billing
                .into_iter()
                .map(|m| (m.connection_type, m.minimum_kwh))
                .collect(),
            price_flags: table_file
                .price_flags
                .into_iter()
                .map(|f| (f.flag, f.rate_per_kwh))
                .collect(),
            taxes: tax_file.taxes,
            classification,
            tolerances,
        };

        let config = Self { tariffs, advisor };
        config.validate()?;
        log::info!(
            "Loaded tariff table {} ({} subgroups, {} taxes) from {data_dir}",
            config.tariffs.version,
            config.tariffs.subgroups.len(),
            config.tariffs.taxes.len()
        );
        Ok(config)
    }

    /// Built-in reference data with default advisor thresholds.
    pub fn reference() -> Self {
        Self {
            tariffs: TariffTable::reference(),
            advisor: AdvisorConfig::default(),
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        self.tariffs.validate()?;
        for subgroup in &self.advisor.time_of_use_subgroups {
            if self.tariffs.rate(*subgroup).is_none() {
                return Err(EngineError::InvalidConfig(format!(
                    "time-of-use subgroup {subgroup} has no rate"
                )));
            }
        }
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
    serde_json::from_str(&content).map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))
}
