//! Fuel types stocked by a station.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The kind of fuel held by a tank.
///
/// Parsing is case-insensitive; serialization uses the canonical spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum FuelType {
    Petrol,
    Diesel,
    Kerosene,
    Gas,
    #[serde(rename = "PMS")]
    Pms,
    #[serde(rename = "AGO")]
    Ago,
}

impl FuelType {
    /// Every fuel type, in canonical order.
    pub const ALL: [FuelType; 6] = [
        FuelType::Petrol,
        FuelType::Diesel,
        FuelType::Kerosene,
        FuelType::Gas,
        FuelType::Pms,
        FuelType::Ago,
    ];

    /// Returns the canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Petrol => "Petrol",
            FuelType::Diesel => "Diesel",
            FuelType::Kerosene => "Kerosene",
            FuelType::Gas => "Gas",
            FuelType::Pms => "PMS",
            FuelType::Ago => "AGO",
        }
    }
}

impl std::fmt::Display for FuelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FuelType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|fuel| fuel.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownFuelType(s.to_string()))
    }
}

impl TryFrom<String> for FuelType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
