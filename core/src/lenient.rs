//! Lenient decoding for bill fields handed over by upstream extractors.
//!
//! Extractors deliver numbers as JSON numbers or as locale-formatted
//! strings, and enumerated codes in whatever case the bill printed them.
//! Anything that cannot be read as a valid non-negative value is stored
//! as absent, never as zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::{collections::BTreeMap, fmt::Display, str::FromStr};

/// Optional non-negative decimal.
pub fn decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(parse_amount))
}

/// Map of named amounts. Keys are upper-cased; unreadable entries are dropped.
pub fn decimal_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let mut amounts = BTreeMap::new();
    match raw {
        None | Some(Value::Null) => {}
        Some(Value::Object(entries)) => {
            for (name, value) in entries {
                if let Some(amount) = parse_amount(&value) {
                    amounts.insert(name.trim().to_uppercase(), amount);
                }
            }
        }
        Some(other) => log::warn!("Ignored non-object amount map: {other}"),
    }
    Ok(amounts)
}

/// Enumerated code parsed through `FromStr`; unknown codes become `None`.
pub fn code<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let parsed = match raw {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => match s.parse::<T>() {
            Ok(code) => Some(code),
            Err(e) => {
                log::warn!("{e}");
                None
            }
        },
        Some(other) => {
            log::warn!("Ignored non-text code: {other}");
            None
        }
    };
    Ok(parsed)
}

/// Trimmed free text; blank strings become `None`.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Consumption history. One unreadable entry discards the whole series,
/// since dropping it would shift the look-back window.
pub fn history<'de, D>(deserializer: D) -> Result<Vec<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let entries = match raw {
        Some(Value::Array(entries)) => entries,
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(other) => {
            log::warn!("Ignored non-array consumption history: {other}");
            return Ok(Vec::new());
        }
    };

    let parsed: Option<Vec<Decimal>> = entries.iter().map(parse_amount).collect();
    Ok(parsed.unwrap_or_else(|| {
        log::warn!("Discarded consumption history with unreadable entries");
        Vec::new()
    }))
}

/// Read a single JSON value as a non-negative decimal.
pub fn parse_amount(value: &Value) -> Option<Decimal> {
    let parsed = match value {
        Value::Null => return None,
        Value::Number(n) => decimal_from_str(&n.to_string()),
        Value::String(s) => normalize_amount(s).and_then(|s| decimal_from_str(&s)),
        _ => None,
    };
    match parsed {
        Some(amount) if amount.is_sign_negative() && !amount.is_zero() => {
            log::warn!("Rejected negative amount {amount}");
            None
        }
        // abs() folds a parsed "-0" into plain zero.
        Some(amount) => Some(amount.abs()),
        None => {
            log::warn!("Rejected unreadable amount {value}");
            None
        }
    }
}

/// Strip currency markers and rewrite locale separators as a plain
/// dot-decimal string: "R$ 1.234,56" becomes "1234.56", "1.250" becomes
/// "1250" and "342,50" becomes "342.50".
pub fn normalize_amount(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        // comma decimals, dot thousands
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        // dot decimals, comma thousands
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => single_separator(&cleaned, ','),
        (None, Some(_)) => single_separator(&cleaned, '.'),
        (None, None) => cleaned,
    };
    Some(normalized)
}

/// Only one kind of separator is present. It groups thousands when every
/// group after a 1-3 digit lead has exactly three digits ("1.250",
/// "1,234,567"); otherwise a single occurrence marks the decimals.
/// A lead of zero ("0.125") is always decimal.
fn single_separator(cleaned: &str, separator: char) -> String {
    let mut groups = cleaned.split(separator);
    let lead = groups.next().unwrap_or_default().trim_start_matches('-');
    let rest: Vec<&str> = groups.collect();

    let thousands = (1..=3).contains(&lead.len())
        && !lead.starts_with('0')
        && rest.iter().all(|g| g.len() == 3);
    if thousands {
        cleaned.replace(separator, "")
    } else if rest.len() == 1 {
        cleaned.replace(separator, ".")
    } else {
        // repeated separator with uneven groups: left unparseable
        cleaned.to_string()
    }
}

fn decimal_from_str(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}
