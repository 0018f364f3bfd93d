//! Resource quantities.
//!
//! # Responsibilities
//! - Parse `<number><suffix>` strings such as `500m`, `1.5`, `128Mi`, `1e3`
//! - Compare quantities by value, not by spelling (`1` == `1000m`)
//! - Round-trip the original spelling through serde and `Display`
//!
//! # Grammar
//! ```text
//! quantity := sign? digits ('.' digits?)? suffix
//!           | sign? '.' digits suffix
//! suffix   := '' | n | u | m | k | M | G | T | P | E      (decimal SI)
//!           | Ki | Mi | Gi | Ti | Pi | Ei                  (binary SI)
//!           | (e | E) sign? digits                         (decimal exponent)
//! ```
//!
//! Values are held in nano-units, rounded up when the input is finer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const NANOS_PER_UNIT: i128 = 1_000_000_000;

/// Error returned when a quantity string does not follow the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("quantity is empty")]
    Empty,

    #[error("invalid numeric part in quantity {0:?}")]
    InvalidNumber(String),

    #[error("unknown unit suffix in quantity {0:?}")]
    InvalidSuffix(String),

    #[error("quantity {0:?} is out of range")]
    OutOfRange(String),
}

/// A parsed resource amount.
#[derive(Debug, Clone)]
pub struct Quantity {
    text: String,
    nanos: i128,
}

/// How a suffix scales the numeric part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scale {
    Decimal(i32),
    Binary(u32),
}

impl Quantity {
    /// Parse a quantity string.
    pub fn parse(text: &str) -> Result<Self, QuantityError> {
        if text.is_empty() {
            return Err(QuantityError::Empty);
        }

        let (negative, unsigned) = match text.as_bytes()[0] {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };

        let number_len = unsigned
            .bytes()
            .take_while(|b| b.is_ascii_digit() || *b == b'.')
            .count();
        let (number, suffix) = unsigned.split_at(number_len);

        let (whole, fraction) = match number.split_once('.') {
            Some((w, f)) => (w, f),
            None => (number, ""),
        };
        if fraction.contains('.') || (whole.is_empty() && fraction.is_empty()) {
            return Err(QuantityError::InvalidNumber(text.to_string()));
        }

        let scale = parse_suffix(suffix).ok_or_else(|| QuantityError::InvalidSuffix(text.to_string()))?;
        let out_of_range = || QuantityError::OutOfRange(text.to_string());

        let mut mantissa: i128 = 0;
        for digit in whole.bytes().chain(fraction.bytes()) {
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(i128::from(digit - b'0')))
                .ok_or_else(out_of_range)?;
        }

        let fraction_len = u32::try_from(fraction.len()).map_err(|_| out_of_range())?;
        let mut numerator = mantissa.checked_mul(NANOS_PER_UNIT).ok_or_else(out_of_range)?;
        let mut denominator = 10_i128.checked_pow(fraction_len).ok_or_else(out_of_range)?;

        match scale {
            Scale::Binary(shift) => {
                numerator = numerator
                    .checked_mul(1_i128 << shift)
                    .ok_or_else(out_of_range)?;
            }
            Scale::Decimal(exp) if exp >= 0 => {
                let factor = 10_i128.checked_pow(exp.unsigned_abs()).ok_or_else(out_of_range)?;
                numerator = numerator.checked_mul(factor).ok_or_else(out_of_range)?;
            }
            Scale::Decimal(exp) => {
                let factor = 10_i128.checked_pow(exp.unsigned_abs()).ok_or_else(out_of_range)?;
                denominator = denominator.checked_mul(factor).ok_or_else(out_of_range)?;
            }
        }

        let magnitude = div_ceil(numerator, denominator);
        Ok(Self {
            text: text.to_string(),
            nanos: if negative { -magnitude } else { magnitude },
        })
    }

    /// The spelling this quantity was parsed from.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Value in thousandths of a unit, rounded up.
    pub fn milli_value(&self) -> i128 {
        div_ceil(self.nanos, 1_000_000)
    }

    /// Value in whole units, rounded up.
    pub fn value(&self) -> i128 {
        div_ceil(self.nanos, NANOS_PER_UNIT)
    }
}

fn parse_suffix(suffix: &str) -> Option<Scale> {
    let scale = match suffix {
        "" => Scale::Decimal(0),
        "n" => Scale::Decimal(-9),
        "u" => Scale::Decimal(-6),
        "m" => Scale::Decimal(-3),
        "k" => Scale::Decimal(3),
        "M" => Scale::Decimal(6),
        "G" => Scale::Decimal(9),
        "T" => Scale::Decimal(12),
        "P" => Scale::Decimal(15),
        "E" => Scale::Decimal(18),
        "Ki" => Scale::Binary(10),
        "Mi" => Scale::Binary(20),
        "Gi" => Scale::Binary(30),
        "Ti" => Scale::Binary(40),
        "Pi" => Scale::Binary(50),
        "Ei" => Scale::Binary(60),
        _ => {
            let exponent = suffix.strip_prefix(['e', 'E'])?;
            let digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            Scale::Decimal(exponent.parse().ok()?)
        }
    };
    Some(scale)
}

/// Division rounding toward positive infinity; `d` must be positive.
fn div_ceil(n: i128, d: i128) -> i128 {
    if n >= 0 {
        n / d + i128::from(n % d != 0)
    } else {
        n / d
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.nanos == other.nanos
    }
}

impl Eq for Quantity {}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Quantity::parse(&text).map_err(serde::de::Error::custom)
    }
}
