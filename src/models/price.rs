//! Fixed-point recipe price.
//!
//! Prices are held as whole cents so arithmetic and storage never go through
//! floating point. The accepted range mirrors a `DECIMAL(5, 2)` column:
//! at most five digits, two of them after the decimal point.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Total significant digits allowed, integer and fractional.
pub const MAX_DIGITS: usize = 5;

/// Digits allowed after the decimal point.
pub const DECIMAL_PLACES: usize = 2;

const MAX_CENTS: i64 = 99_999;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    #[error("A valid number is required")]
    Invalid,

    #[error("Ensure this value is greater than or equal to 0")]
    Negative,

    #[error("Ensure that there are no more than {DECIMAL_PLACES} decimal places")]
    TooManyDecimalPlaces,

    #[error("Ensure that there are no more than {MAX_DIGITS} digits in total")]
    TooManyDigits,
}

/// A non-negative price with two decimal places.
///
/// ```rust
/// use recipebox::models::price::Price;
///
/// let price: Price = "5.3".parse().unwrap();
/// assert_eq!(price.cents(), 530);
/// assert_eq!(price.to_string(), "5.30");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(i64);

impl Price {
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        if cents < 0 {
            return Err(PriceError::Negative);
        }
        if cents > MAX_CENTS {
            return Err(PriceError::TooManyDigits);
        }
        Ok(Self(cents))
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('-') {
            return Err(PriceError::Negative);
        }

        let (whole, fraction) = s.split_once('.').unwrap_or((s, ""));
        let whole = if whole.is_empty() { "0" } else { whole };

        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
            || (s.is_empty() || s == ".")
        {
            return Err(PriceError::Invalid);
        }

        let fraction = fraction.trim_end_matches('0');
        if fraction.len() > DECIMAL_PLACES {
            return Err(PriceError::TooManyDecimalPlaces);
        }

        let whole = whole.trim_start_matches('0');
        if whole.len() > MAX_DIGITS - DECIMAL_PLACES {
            return Err(PriceError::TooManyDigits);
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| PriceError::Invalid)?
        };
        let fraction_value: i64 = format!("{fraction:0<2}")
            .parse()
            .map_err(|_| PriceError::Invalid)?;

        Self::from_cents(whole_value * 100 + fraction_value)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

struct PriceVisitor;

impl Visitor<'_> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal number or numeric string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Price, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Price, E> {
        let cents = i64::try_from(v)
            .ok()
            .and_then(|v| v.checked_mul(100))
            .ok_or_else(|| E::custom(PriceError::TooManyDigits))?;
        Price::from_cents(cents).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Price, E> {
        if v < 0 {
            return Err(E::custom(PriceError::Negative));
        }
        self.visit_u64(v.unsigned_abs())
    }

    // Floats go through their shortest decimal rendering so 5.3 stays 5.30.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Price, E> {
        if !v.is_finite() {
            return Err(E::custom(PriceError::Invalid));
        }
        v.to_string().parse().map_err(E::custom)
    }
}
