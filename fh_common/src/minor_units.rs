use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Sub},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The currency used when a checkout request does not name one.
pub const DEFAULT_CURRENCY: &str = "GHS";

//--------------------------------------     MinorUnits       ---------------------------------------------------------
/// An amount of money expressed in the smallest unit of its currency (pesewas, cents, kobo).
///
/// The gateway only ever deals in integer minor units, so fractional amounts cannot be represented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorUnits(i64);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in minor units: {0}")]
pub struct MinorUnitsConversionError(String);

impl From<i64> for MinorUnits {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<u64> for MinorUnits {
    type Error = MinorUnitsConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        i64::try_from(value)
            .map(Self)
            .map_err(|_| MinorUnitsConversionError(format!("Value {value} is too large to convert to MinorUnits")))
    }
}

impl TryFrom<&serde_json::Number> for MinorUnits {
    type Error = MinorUnitsConversionError;

    fn try_from(value: &serde_json::Number) -> Result<Self, Self::Error> {
        value.as_i64().map(Self).ok_or_else(|| MinorUnitsConversionError(format!("{value} is not an integer")))
    }
}

impl Add for MinorUnits {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for MinorUnits {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sum for MinorUnits {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl Display for MinorUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let major = self.0 / 100;
        let minor = (self.0 % 100).abs();
        let sign = if self.0 < 0 && major == 0 { "-" } else { "" };
        write!(f, "{sign}{major}.{minor:02}")
    }
}

impl MinorUnits {
    pub fn value(&self) -> i64 {
        self.0
    }
}

/// True if `code` looks like an ISO-4217 currency code (three ASCII letters).
pub fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}
