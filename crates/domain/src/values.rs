//! Validated numeric value objects.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

fn non_negative(field: &str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::invalid_number(field, value))
    }
}

/// A volume of fuel in liters. Always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Liters(f64);

impl Liters {
    /// Validates a raw volume, naming `field` in the error.
    pub fn parse(field: &str, value: f64) -> Result<Self, ValidationError> {
        non_negative(field, value).map(Self)
    }

    /// Returns zero liters.
    pub fn zero() -> Self {
        Self(0.0)
    }

    /// Returns the raw value.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Applies a signed change. Returns None if the result would be negative.
    pub fn offset(&self, delta: f64) -> Option<Liters> {
        let next = self.0 + delta;
        (next.is_finite() && next >= 0.0).then_some(Liters(next))
    }
}

impl TryFrom<f64> for Liters {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::parse("liters", value)
    }
}

impl From<Liters> for f64 {
    fn from(liters: Liters) -> Self {
        liters.0
    }
}

impl std::ops::Add for Liters {
    type Output = Liters;

    fn add(self, rhs: Self) -> Self::Output {
        Liters(self.0 + rhs.0)
    }
}

impl std::fmt::Display for Liters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A price per liter. Always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct PricePerLiter(f64);

impl PricePerLiter {
    /// Validates a raw price, naming `field` in the error.
    pub fn parse(field: &str, value: f64) -> Result<Self, ValidationError> {
        non_negative(field, value).map(Self)
    }

    /// Returns the raw value.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Revenue for selling `liters` at this price.
    pub fn total_for(&self, liters: Liters) -> f64 {
        self.0 * liters.value()
    }
}

impl TryFrom<f64> for PricePerLiter {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::parse("pricePerLtr", value)
    }
}

impl From<PricePerLiter> for f64 {
    fn from(price: PricePerLiter) -> Self {
        price.0
    }
}

impl std::fmt::Display for PricePerLiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
