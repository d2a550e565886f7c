//! Non-negative unit prices using decimal arithmetic.
//!
//! Catalog payloads carry prices as JSON numbers or as numeric strings
//! (`"price": "125000"`). [`UnitPrice::from_value`] normalizes both at the
//! boundary; anything that does not resolve to a finite, non-negative number
//! no larger than [`MAX_PRICE_UNITS`] is rejected with a [`PriceError`].
//!
//! Amounts are rounded to [`SIGNIFICANT_DIGITS`] significant digits, the
//! precision a JSON number keeps through an `f64`, so a stored price reads
//! back unchanged.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Largest accepted unit price. Any line total (price times a `u32`
/// quantity) stays far inside `Decimal`'s range.
pub const MAX_PRICE_UNITS: i64 = 1_000_000_000_000_000;

/// Significant digits kept from a parsed price.
pub const SIGNIFICANT_DIGITS: u32 = 15;

/// Reasons a raw price cannot become a [`UnitPrice`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// No price was present in the payload.
    #[error("price is missing")]
    Missing,

    /// The value could not be read as a number.
    #[error("price is not a number: {0}")]
    NotANumber(String),

    /// The number parsed but is below zero.
    #[error("price must not be negative: {0}")]
    Negative(Decimal),

    /// The number is larger than [`MAX_PRICE_UNITS`].
    #[error("price is out of range: {0}")]
    OutOfRange(Decimal),
}

/// Price of a single unit of a product.
///
/// Serialized as a plain JSON number so the persisted cart stays readable by
/// any consumer of the storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UnitPrice(Decimal);

impl UnitPrice {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` for amounts below zero and
    /// `PriceError::OutOfRange` for amounts above [`MAX_PRICE_UNITS`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        if amount > Decimal::from(MAX_PRICE_UNITS) {
            return Err(PriceError::OutOfRange(amount));
        }
        let rounded = amount.round_sf(SIGNIFICANT_DIGITS).unwrap_or(amount);
        Ok(Self(rounded.normalize()))
    }

    /// Create a price from whole currency units.
    #[must_use]
    pub fn from_units(units: u32) -> Self {
        Self(Decimal::from(units))
    }

    /// Normalize an untyped JSON price.
    ///
    /// Accepts numbers and numeric strings (surrounding whitespace ignored,
    /// scientific notation allowed).
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Missing` for `null`, `PriceError::NotANumber` for
    /// any other non-numeric value, `PriceError::Negative` for amounts below
    /// zero and `PriceError::OutOfRange` for amounts that are too large.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, PriceError> {
        match value {
            serde_json::Value::Null => Err(PriceError::Missing),
            serde_json::Value::Number(number) => Self::parse(&number.to_string()),
            serde_json::Value::String(text) => Self::parse(text),
            other => Err(PriceError::NotANumber(other.to_string())),
        }
    }

    /// Parse a price from text.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotANumber` if the text is empty or not numeric,
    /// `PriceError::Negative` for amounts below zero and
    /// `PriceError::OutOfRange` for amounts that are too large.
    pub fn parse(text: &str) -> Result<Self, PriceError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(PriceError::NotANumber(text.to_string()));
        }
        let amount = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| PriceError::NotANumber(text.to_string()))?;
        Self::new(amount)
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0.saturating_mul(Decimal::from(quantity))
    }
}

impl FromStr for UnitPrice {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for UnitPrice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.fract().is_zero()
            && let Some(whole) = self.0.to_i64()
        {
            return serializer.serialize_i64(whole);
        }
        let float = self
            .0
            .to_f64()
            .ok_or_else(|| serde::ser::Error::custom("price out of range"))?;
        serializer.serialize_f64(float)
    }
}

impl<'de> Deserialize<'de> for UnitPrice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Self::from_value(&raw).map_err(serde::de::Error::custom)
    }
}
