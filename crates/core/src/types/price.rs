//! Listing price parsed from free-text record store values.
//!
//! Prices are typed by whoever edits the hosted table, so the same column can
//! hold `1200`, `"1200"`, `"$1,200"` or `"RM 1,200.50"`. Parsing keeps only
//! digits and the decimal point and falls back to zero when nothing usable
//! remains. The sign is stripped like any other non-digit character, so a
//! [`Price`] is never negative.

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A non-negative listing price in the shop's display currency.
///
/// Serializes as a plain JSON number so the frontend can sort and filter
/// without re-parsing.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    /// The fallback price for missing or unparseable values.
    pub const ZERO: Self = Self(0.0);

    /// Parse a free-text price such as `"$1,234.50"`.
    ///
    /// Every character that is not an ASCII digit or `.` is discarded before
    /// parsing. Empty, ambiguous (`"1.2.3"`) or non-finite results yield
    /// [`Price::ZERO`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let cleaned: String = raw
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        match cleaned.parse::<f64>() {
            Ok(amount) if amount.is_finite() => Self(amount),
            _ => Self::ZERO,
        }
    }

    /// Parse a price from an untyped record store value.
    ///
    /// Numbers keep their magnitude, strings go through [`Price::parse`],
    /// lookup lists use their first element, and everything else is zero.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => n
                .as_f64()
                .filter(|amount| amount.is_finite())
                .map_or(Self::ZERO, |amount| Self(amount.abs())),
            Value::String(s) => Self::parse(s),
            Value::Array(items) => items.first().map_or(Self::ZERO, Self::from_value),
            Value::Null | Value::Bool(_) | Value::Object(_) => Self::ZERO,
        }
    }

    /// The numeric amount.
    #[must_use]
    pub const fn amount(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
