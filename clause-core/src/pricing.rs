//! Tiered pricing
//!
//! Unit prices are looked up from seven applicant-count brackets:
//!
//! | Applicants | Bracket key |
//! |------------|-------------|
//! | 0, 1       | `1`         |
//! | 2          | `2`         |
//! | 3          | `3`         |
//! | 4..=7      | `4-7`       |
//! | 8..=9      | `8-9`       |
//! | 10..=15    | `10-15`     |
//! | 16..       | `16+`       |
//!
//! A count of zero is clamped to the single-applicant bracket; counts are unsigned so negative
//! input cannot reach this module.
//!
//! Content written before the bracket tokens existed carries prices baked into prose, as in
//! `For 4-7 applicants- USD 1800`. [`replace_tier_labels`] rewrites the amount in such labels from
//! the current table.

use crate::error::PricingError;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::de::{Deserializer, Error as _};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TierKey {
    One,
    Two,
    Three,
    FourToSeven,
    EightToNine,
    TenToFifteen,
    SixteenPlus,
}

impl TierKey {
    /// All brackets, in ascending applicant order.
    pub const ALL: [TierKey; 7] = [
        TierKey::One,
        TierKey::Two,
        TierKey::Three,
        TierKey::FourToSeven,
        TierKey::EightToNine,
        TierKey::TenToFifteen,
        TierKey::SixteenPlus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TierKey::One => "1",
            TierKey::Two => "2",
            TierKey::Three => "3",
            TierKey::FourToSeven => "4-7",
            TierKey::EightToNine => "8-9",
            TierKey::TenToFifteen => "10-15",
            TierKey::SixteenPlus => "16+",
        }
    }

    /// Position in [`TierKey::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// The prose label used by legacy content, e.g. `For 4-7 applicants`.
    pub fn label(&self) -> String {
        match self {
            TierKey::One => "For 1 applicant".to_string(),
            other => format!("For {} applicants", other.as_str()),
        }
    }

    /// Identifier of the bracket-specific placeholder, e.g. `price_4_7`.
    pub fn token(&self) -> &'static str {
        match self {
            TierKey::One => "price_1",
            TierKey::Two => "price_2",
            TierKey::Three => "price_3",
            TierKey::FourToSeven => "price_4_7",
            TierKey::EightToNine => "price_8_9",
            TierKey::TenToFifteen => "price_10_15",
            TierKey::SixteenPlus => "price_16_plus",
        }
    }

    pub fn from_token(token: &str) -> Option<TierKey> {
        TierKey::ALL.into_iter().find(|key| key.token() == token)
    }
}

impl fmt::Display for TierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TierKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TierKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s.trim())
            .ok_or_else(|| format!("unknown pricing bracket '{}'", s))
    }
}

/// Bracket for an applicant count.
pub fn bracket_key_for(applicant_count: u32) -> TierKey {
    match applicant_count {
        0 | 1 => TierKey::One,
        2 => TierKey::Two,
        3 => TierKey::Three,
        4..=7 => TierKey::FourToSeven,
        8..=9 => TierKey::EightToNine,
        10..=15 => TierKey::TenToFifteen,
        _ => TierKey::SixteenPlus,
    }
}

/// Unit price per bracket. Every bracket is always present; unset brackets read as 0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PricingTierTable {
    prices: [f64; 7],
}

impl PricingTierTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(bracket, price)` pairs; later pairs win.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, PricingError>
    where
        I: IntoIterator<Item = (TierKey, f64)>,
    {
        let mut table = Self::new();
        for (key, price) in pairs {
            table.set(key, price)?;
        }
        Ok(table)
    }

    pub fn get(&self, key: TierKey) -> f64 {
        self.prices[key.index()]
    }

    pub fn set(&mut self, key: TierKey, price: f64) -> Result<(), PricingError> {
        if !price.is_finite() || price < 0.0 {
            return Err(PricingError::InvalidPrice {
                key: key.as_str().to_string(),
                price,
            });
        }
        self.prices[key.index()] = price;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (TierKey, f64)> + '_ {
        TierKey::ALL.into_iter().map(|key| (key, self.get(key)))
    }
}

impl Serialize for PricingTierTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(TierKey::ALL.len()))?;
        for (key, price) in self.iter() {
            map.serialize_entry(key.as_str(), &price)?;
        }
        map.end()
    }
}

/// Stored tables come from loosely typed records: prices may be numbers, numeric strings or
/// null.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredPrice {
    Number(f64),
    Text(String),
    Null,
}

impl<'de> Deserialize<'de> for PricingTierTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, StoredPrice>::deserialize(deserializer)?;
        let mut table = PricingTierTable::new();
        for (name, stored) in raw {
            let Ok(key) = name.parse::<TierKey>() else {
                log::warn!("ignoring unknown pricing bracket '{}'", name);
                continue;
            };
            let price = match stored {
                StoredPrice::Number(n) => n,
                StoredPrice::Text(s) if s.trim().is_empty() => 0.0,
                StoredPrice::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                    D::Error::custom(format!("price for bracket '{}' is not a number", name))
                })?,
                StoredPrice::Null => 0.0,
            };
            table.set(key, price).map_err(D::Error::custom)?;
        }
        Ok(table)
    }
}

/// `table[bracket_key_for(count)]`.
pub fn unit_price(table: &PricingTierTable, applicant_count: u32) -> f64 {
    table.get(bracket_key_for(applicant_count))
}

pub fn total_amount(unit_price: f64, applicant_count: u32) -> f64 {
    unit_price * f64::from(applicant_count)
}

pub fn discount_amount(total: f64, discount_percentage: f64) -> f64 {
    total * discount_percentage / 100.0
}

pub fn final_amount(total: f64, discount_amount: f64) -> f64 {
    total - discount_amount
}

/// The full price breakdown for one applicant count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub bracket: TierKey,
    pub applicant_count: u32,
    pub unit_price: f64,
    pub total: f64,
    pub discount_percentage: f64,
    pub discount_amount: f64,
    pub final_amount: f64,
}

impl Serialize for TierKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl Quote {
    /// The discount percentage is clamped into 0..=100.
    pub fn compute(table: &PricingTierTable, applicant_count: u32, discount_percentage: f64) -> Self {
        let discount_percentage = if discount_percentage.is_finite() {
            discount_percentage.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let unit = unit_price(table, applicant_count);
        let total = total_amount(unit, applicant_count);
        let discount = discount_amount(total, discount_percentage);
        Quote {
            bracket: bracket_key_for(applicant_count),
            applicant_count,
            unit_price: unit,
            total,
            discount_percentage,
            discount_amount: discount,
            final_amount: final_amount(total, discount),
        }
    }
}

/// Amounts print without decimals when integral, with two otherwise.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}", amount as i64)
    } else {
        format!("{:.2}", amount)
    }
}

static TIER_LABELS: Lazy<Vec<(TierKey, Regex)>> = Lazy::new(|| {
    TierKey::ALL
        .into_iter()
        .map(|key| {
            let pattern = format!(
                r"(?i)(For\s+{}\s+applicants?\s*[-–:]\s*)([^\d\s]+\s*)(\d[\d,]*(?:\.\d+)?)",
                regex::escape(key.as_str())
            );
            (key, Regex::new(&pattern).unwrap())
        })
        .collect()
});

/// Rewrite the amount in every legacy price label with the table's price for that bracket.
///
/// The label and currency text are kept as written. The flag reports whether any label matched.
pub fn replace_tier_labels<'t>(text: &'t str, table: &PricingTierTable) -> (Cow<'t, str>, bool) {
    let mut current = Cow::Borrowed(text);
    let mut matched = false;
    for (key, re) in TIER_LABELS.iter() {
        if !re.is_match(&current) {
            continue;
        }
        matched = true;
        let amount = format_amount(table.get(*key));
        let replaced = re
            .replace_all(&current, |caps: &Captures| {
                format!("{}{}{}", &caps[1], &caps[2], amount)
            })
            .into_owned();
        current = Cow::Owned(replaced);
    }
    (current, matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn table() -> PricingTierTable {
        PricingTierTable::from_pairs([
            (TierKey::One, 2500.0),
            (TierKey::Two, 2300.0),
            (TierKey::Three, 2100.0),
            (TierKey::FourToSeven, 1800.0),
            (TierKey::EightToNine, 1600.0),
            (TierKey::TenToFifteen, 1400.0),
            (TierKey::SixteenPlus, 1200.0),
        ])
        .expect("valid prices")
    }

    #[rstest]
    #[case(0, "1")]
    #[case(1, "1")]
    #[case(2, "2")]
    #[case(3, "3")]
    #[case(4, "4-7")]
    #[case(5, "4-7")]
    #[case(7, "4-7")]
    #[case(8, "8-9")]
    #[case(9, "8-9")]
    #[case(10, "10-15")]
    #[case(15, "10-15")]
    #[case(16, "16+")]
    #[case(100, "16+")]
    fn test_bracket_key_for(#[case] count: u32, #[case] expected: &str) {
        assert_eq!(bracket_key_for(count).as_str(), expected);
    }

    #[test]
    fn test_single_applicant_quote() {
        let quote = Quote::compute(&table(), 1, 10.0);
        assert_eq!(quote.unit_price, 2500.0);
        assert_eq!(quote.total, 2500.0);
        assert_eq!(quote.discount_amount, 250.0);
        assert_eq!(quote.final_amount, 2250.0);
    }

    #[test]
    fn test_bracket_quote_uses_bracket_price() {
        let quote = Quote::compute(&table(), 5, 0.0);
        assert_eq!(quote.bracket, TierKey::FourToSeven);
        assert_eq!(quote.total, 9000.0);
        assert_eq!(quote.final_amount, 9000.0);
    }

    #[test]
    fn test_discount_is_clamped() {
        let quote = Quote::compute(&table(), 1, 150.0);
        assert_eq!(quote.discount_percentage, 100.0);
        assert_eq!(quote.final_amount, 0.0);
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut table = PricingTierTable::new();
        assert!(table.set(TierKey::Two, -1.0).is_err());
        assert!(table.set(TierKey::Two, f64::NAN).is_err());
        assert_eq!(table.get(TierKey::Two), 0.0);
    }

    #[test]
    fn test_deserialize_loose_record() {
        let table: PricingTierTable = serde_json::from_value(json!({
            "1": 2500, "2": "2300", "3": null, "4-7": "", "bogus": 5
        }))
        .expect("deserialize");
        assert_eq!(table.get(TierKey::One), 2500.0);
        assert_eq!(table.get(TierKey::Two), 2300.0);
        assert_eq!(table.get(TierKey::Three), 0.0);
        assert_eq!(table.get(TierKey::SixteenPlus), 0.0);
    }

    #[test]
    fn test_serialize_emits_all_brackets() {
        let value = serde_json::to_value(PricingTierTable::new()).expect("serialize");
        let obj = value.as_object().expect("map");
        assert_eq!(obj.len(), 7);
        assert_eq!(obj.get("16+"), Some(&json!(0.0)));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1000.0), "1000");
        assert_eq!(format_amount(12.5), "12.50");
        assert_eq!(format_amount(0.0), "0");
    }

    #[test]
    fn test_replace_tier_labels() {
        let (text, matched) = replace_tier_labels(
            "For 1 applicant- USD 999 / For 4-7 applicants- USD 1,750.00 / For 16+ applicants- $ 1",
            &table(),
        );
        assert!(matched);
        assert_eq!(
            text,
            "For 1 applicant- USD 2500 / For 4-7 applicants- USD 1800 / For 16+ applicants- $ 1200"
        );
    }

    #[test]
    fn test_replace_tier_labels_leaves_other_text() {
        let (text, matched) = replace_tier_labels("For 10 days, pay USD 5", &table());
        assert!(!matched);
        assert!(matches!(text, Cow::Borrowed(_)));
    }

    #[test]
    fn test_token_names() {
        assert_eq!(TierKey::SixteenPlus.token(), "price_16_plus");
        assert_eq!(TierKey::from_token("price_8_9"), Some(TierKey::EightToNine));
        assert_eq!(TierKey::FourToSeven.label(), "For 4-7 applicants");
    }
}
