//! The bill record: normalized fields extracted from one electricity bill.
//!
//! RULE: numeric fields are either a valid non-negative decimal or absent.
//! Decoding goes through `crate::lenient`, so a malformed value never
//! reaches a rule check as zero.

use crate::{
    lenient,
    types::{Kwh, Money},
};
use rust_decimal::prelude::ToPrimitive;
use serde::{de::Error as _, Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::{collections::BTreeMap, fmt, str::FromStr};
use thiserror::Error;

/// Field names follow the English schema; the extractor's Portuguese
/// keys (`consumo_kwh`, `valor_total`, ...) are accepted as aliases.
/// Amounts serialize as JSON numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillRecord {
    #[serde(
        default,
        alias = "consumo_kwh",
        deserialize_with = "lenient::decimal",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub consumption_kwh: Option<Kwh>,
    #[serde(
        default,
        alias = "valor_total",
        deserialize_with = "lenient::decimal",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub total_amount: Option<Money>,
    #[serde(
        default,
        alias = "valor_energia",
        deserialize_with = "lenient::decimal",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub energy_amount: Option<Money>,
    #[serde(
        default,
        alias = "valor_bandeira",
        deserialize_with = "lenient::decimal",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub flag_surcharge_amount: Option<Money>,
    /// Tax name (upper-case) → amount charged on the bill.
    #[serde(
        default,
        deserialize_with = "lenient::decimal_map",
        serialize_with = "amounts_as_numbers"
    )]
    pub taxes: BTreeMap<String, Money>,

    #[serde(default, alias = "subgrupo", deserialize_with = "lenient::code")]
    pub tariff_subgroup: Option<TariffSubgroup>,
    #[serde(default, alias = "tipo_consumidor", deserialize_with = "lenient::text")]
    pub consumer_type: Option<String>,
    #[serde(default, alias = "tipo_ligacao", deserialize_with = "lenient::code")]
    pub connection_type: Option<ConnectionType>,
    #[serde(default, alias = "bandeira_tarifaria", deserialize_with = "lenient::code")]
    pub price_flag: Option<PriceFlag>,

    #[serde(default, alias = "numero_instalacao", deserialize_with = "lenient::text")]
    pub installation_id: Option<String>,
    #[serde(default, alias = "mes_referencia", deserialize_with = "lenient::text")]
    pub reference_period: Option<String>,

    /// Past monthly consumption, chronological, most recent last.
    #[serde(
        default,
        alias = "historico_consumo",
        deserialize_with = "lenient::history",
        serialize_with = "series_as_numbers"
    )]
    pub consumption_history: Vec<Kwh>,

    // Informational passthrough, never audited.
    #[serde(default, alias = "distribuidora", deserialize_with = "lenient::text")]
    pub utility: Option<String>,
    #[serde(default, alias = "data_vencimento", deserialize_with = "lenient::text")]
    pub due_date: Option<String>,
    #[serde(default, alias = "data_leitura", deserialize_with = "lenient::text")]
    pub reading_date: Option<String>,
}

/// Tax amounts the extractor reports as top-level keys rather than under
/// `taxes`.
const TOP_LEVEL_TAX_KEYS: &[&str] = &["icms", "pis", "cofins"];

impl BillRecord {
    /// Decode a record from extractor JSON.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        Self::from_value(serde_json::from_str(raw)?)
    }

    /// Decode a record from an already-parsed JSON value. Anything but a
    /// JSON object is rejected.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(serde_json::Error::custom(format!(
                    "expected a JSON object, found {}",
                    json_kind(&other)
                )))
            }
        };

        let loose_keys: Vec<String> = fields
            .keys()
            .filter(|k| TOP_LEVEL_TAX_KEYS.contains(&k.to_lowercase().as_str()))
            .cloned()
            .collect();
        let loose: Vec<(String, Value)> = loose_keys
            .into_iter()
            .filter_map(|k| fields.remove(&k).map(|v| (k, v)))
            .collect();
        if !loose.is_empty() {
            let taxes = fields
                .entry("taxes")
                .or_insert_with(|| Value::Object(Map::new()));
            match taxes {
                Value::Object(taxes) => {
                    for (name, amount) in loose {
                        let listed = taxes.keys().any(|k| k.eq_ignore_ascii_case(&name));
                        if !listed {
                            taxes.insert(name, amount);
                        }
                    }
                }
                other => log::warn!("Dropped top-level tax amounts, taxes is not an object: {other}"),
            }
        }

        serde_json::from_value(Value::Object(fields))
    }

    /// Look up a charged tax by name, case-insensitively.
    pub fn tax(&self, name: &str) -> Option<Money> {
        self.taxes.get(&name.trim().to_uppercase()).copied()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn amounts_as_numbers<S: Serializer>(amounts: &BTreeMap<String, Money>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_map(amounts.iter().map(|(name, amount)| (name, amount.to_f64())))
}

fn series_as_numbers<S: Serializer>(series: &[Kwh], s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(series.iter().map(|kwh| kwh.to_f64()))
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown {kind} code '{value}'")]
pub struct UnknownCode {
    pub kind: &'static str,
    pub value: String,
}

fn normalize_code(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect::<String>()
        .to_lowercase()
}

// ── Tariff subgroup ─────────────────────────────────────────────────────────

/// Regulatory low-voltage (group B) classification of a consumer unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum TariffSubgroup {
    /// Residential.
    #[serde(rename = "B1")]
    B1,
    /// Residential, low-income social tariff.
    #[serde(rename = "B1_LOW_INCOME")]
    B1LowIncome,
    #[serde(rename = "B2_RURAL")]
    B2Rural,
    #[serde(rename = "B2_COOPERATIVE")]
    B2Cooperative,
    #[serde(rename = "B2_IRRIGATION")]
    B2Irrigation,
    /// Commercial, industrial and public administration.
    #[serde(rename = "B3")]
    B3,
    /// Public lighting.
    #[serde(rename = "B4A")]
    B4A,
}

impl TariffSubgroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            TariffSubgroup::B1            => "B1",
            TariffSubgroup::B1LowIncome   => "B1_LOW_INCOME",
            TariffSubgroup::B2Rural       => "B2_RURAL",
            TariffSubgroup::B2Cooperative => "B2_COOPERATIVE",
            TariffSubgroup::B2Irrigation  => "B2_IRRIGATION",
            TariffSubgroup::B3            => "B3",
            TariffSubgroup::B4A           => "B4A",
        }
    }
}

impl FromStr for TariffSubgroup {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_code(s).as_str() {
            "b1" => Ok(TariffSubgroup::B1),
            "b1_low_income" | "b1_baixa_renda" => Ok(TariffSubgroup::B1LowIncome),
            "b2_rural" => Ok(TariffSubgroup::B2Rural),
            "b2_cooperative" | "b2_cooperativa" => Ok(TariffSubgroup::B2Cooperative),
            "b2_irrigation" | "b2_irrigacao" | "b2_irrigação" => Ok(TariffSubgroup::B2Irrigation),
            "b3" => Ok(TariffSubgroup::B3),
            "b4a" => Ok(TariffSubgroup::B4A),
            _ => Err(UnknownCode { kind: "tariff subgroup", value: s.to_string() }),
        }
    }
}

impl TryFrom<String> for TariffSubgroup {
    type Error = UnknownCode;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TariffSubgroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Connection type ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", rename_all = "snake_case")]
pub enum ConnectionType {
    SinglePhase,
    TwoPhase,
    ThreePhase,
}

impl ConnectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::SinglePhase => "single_phase",
            ConnectionType::TwoPhase    => "two_phase",
            ConnectionType::ThreePhase  => "three_phase",
        }
    }
}

impl FromStr for ConnectionType {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_code(s).as_str() {
            "single_phase" | "monofasico" | "monofásico" => Ok(ConnectionType::SinglePhase),
            "two_phase" | "bifasico" | "bifásico" => Ok(ConnectionType::TwoPhase),
            "three_phase" | "trifasico" | "trifásico" => Ok(ConnectionType::ThreePhase),
            _ => Err(UnknownCode { kind: "connection type", value: s.to_string() }),
        }
    }
}

impl TryFrom<String> for ConnectionType {
    type Error = UnknownCode;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Price flag ──────────────────────────────────────────────────────────────

/// Monthly generation-cost signal; each level adds a per-kWh surcharge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum PriceFlag {
    #[serde(rename = "green")]
    Green,
    #[serde(rename = "yellow")]
    Yellow,
    #[serde(rename = "red_1")]
    Red1,
    #[serde(rename = "red_2")]
    Red2,
}

impl PriceFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceFlag::Green  => "green",
            PriceFlag::Yellow => "yellow",
            PriceFlag::Red1   => "red_1",
            PriceFlag::Red2   => "red_2",
        }
    }
}

impl FromStr for PriceFlag {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_code(s).as_str() {
            "green" | "verde" => Ok(PriceFlag::Green),
            "yellow" | "amarela" => Ok(PriceFlag::Yellow),
            "red_1" | "red1" | "vermelha_1" | "vermelha1" => Ok(PriceFlag::Red1),
            "red_2" | "red2" | "vermelha_2" | "vermelha2" => Ok(PriceFlag::Red2),
            _ => Err(UnknownCode { kind: "price flag", value: s.to_string() }),
        }
    }
}

impl TryFrom<String> for PriceFlag {
    type Error = UnknownCode;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for PriceFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
