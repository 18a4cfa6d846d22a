//! Amount type for handling monetary values exactly.
//!
//! This module provides the `Amount` type which wraps `Decimal`. It parses what a user types into
//! an amount field and is stored in JSON as a plain number carrying the exact decimal digits.

use crate::model::Currency;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

/// Represents the magnitude of an expense. It carries no currency of its own.
///
/// Equality is numeric, so `3.5` and `3.50` are equal.
///
/// # Examples
///
/// ```
/// # use expense_tracker::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("1,250.5").unwrap();
/// assert_eq!(amount.to_string(), "1250.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// The largest magnitude accepted when parsing, one trillion. Sums of parsed amounts stay far
    /// below `Decimal::MAX`.
    pub fn limit() -> Amount {
        Amount(Decimal::from(1_000_000_000_000_i64))
    }

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Formats the amount for display with the currency symbol, thousands separators and two
    /// decimal places, e.g. `$1,234.50`.
    pub fn display_with(&self, currency: Currency) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.0.abs().round_dp(2);
        format!(
            "{sign}{}{}",
            currency.symbol(),
            format_num::format_num!(",.2", abs.to_f64().unwrap_or_default())
        )
    }
}

/// An error that can occur when parsing user input into an `Amount`.
#[derive(Clone, PartialEq, Eq)]
pub enum AmountError {
    Empty,
    Invalid(String),
    TooLarge(String),
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => write!(f, "the amount is empty"),
            AmountError::Invalid(s) => write!(f, "'{s}' is not a number"),
            AmountError::TooLarge(s) => {
                write!(f, "'{s}' is larger than {}", Amount::limit().value())
            }
        }
    }
}

impl Error for AmountError {}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        // Remove commas (thousand separators)
        let without_commas = trimmed.replace(',', "");

        let value = Decimal::from_str(&without_commas)
            .or_else(|_| Decimal::from_scientific(&without_commas))
            .map_err(|_| AmountError::Invalid(trimmed.to_string()))?;
        if value.abs() > Amount::limit().value() {
            return Err(AmountError::TooLarge(trimmed.to_string()));
        }
        Ok(Amount(value))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0.round_dp(2))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // serde_json's `arbitrary_precision` keeps these digits verbatim
        let number = serde_json::Number::from_str(&self.0.normalize().to_string())
            .map_err(serde::ser::Error::custom)?;
        number.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Accepts JSON numbers and, leniently, numeric strings. Every path goes through `Amount::from_str`
/// so the same limits apply to saved and imported amounts as to typed ones.
struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Amount::from_str(&v.to_string()).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Amount::from_str(&v.to_string()).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        if !v.is_finite() {
            return Err(E::custom("amount must be a finite number"));
        }
        // `f64` displays as the shortest string that round-trips, so 85.75 stays 85.75
        Amount::from_str(&v.to_string()).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::from_str(v).map_err(E::custom)
    }

    /// With `arbitrary_precision`, serde_json presents a number as a map holding its digits.
    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Amount, A::Error> {
        let number = serde_json::Number::deserialize(de::value::MapAccessDeserializer::new(map))?;
        Amount::from_str(&number.to_string()).map_err(de::Error::custom)
    }
}

impl Add for Amount {
    type Output = Amount;

    /// Saturates at `Decimal::MAX` rather than overflowing.
    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
