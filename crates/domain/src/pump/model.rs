use chrono::{DateTime, Utc};
use common::DocumentId;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids::{PumpId, StationId, TankId};
use crate::record::Record;
use crate::values::{Liters, PricePerLiter};

/// Operating status of a pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PumpStatus {
    Active,
    #[default]
    Idle,
    Maintenance,
    Inactive,
}

impl PumpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PumpStatus::Active => "Active",
            PumpStatus::Idle => "Idle",
            PumpStatus::Maintenance => "Maintenance",
            PumpStatus::Inactive => "Inactive",
        }
    }
}

impl std::fmt::Display for PumpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PumpStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(PumpStatus::Active),
            "idle" => Ok(PumpStatus::Idle),
            "maintenance" => Ok(PumpStatus::Maintenance),
            "inactive" => Ok(PumpStatus::Inactive),
            _ => Err(ValidationError::invalid_value("status", s)),
        }
    }
}

/// Liters sold by a pump on one day, at the price in force that day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySale {
    pub date: DateTime<Utc>,
    pub ltr_sale: Liters,
    pub price_per_ltr: PricePerLiter,
}

impl DailySale {
    pub fn revenue(&self) -> f64 {
        self.price_per_ltr.total_for(self.ltr_sale)
    }
}

/// One dispensing pump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubPump {
    pub id: PumpId,
    pub title: String,
    #[serde(default)]
    pub status: PumpStatus,
    pub price_per_ltr: PricePerLiter,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub last_maintenance: Option<DateTime<Utc>>,
    #[serde(default)]
    pub daily_ltr_sales: Vec<DailySale>,
}

impl SubPump {
    /// Creates an idle pump with no sales. A blank title is filled in when
    /// the pump joins a bank.
    pub fn new(title: impl Into<String>, price_per_ltr: PricePerLiter, start_date: DateTime<Utc>) -> Self {
        Self {
            id: PumpId::new(),
            title: title.into(),
            status: PumpStatus::Idle,
            price_per_ltr,
            start_date,
            last_maintenance: None,
            daily_ltr_sales: Vec::new(),
        }
    }
}

/// Title given to a pump appended without one.
///
/// Positional: it is not kept stable when earlier pumps are deleted, so
/// titles can repeat or skip numbers.
pub fn next_pump_title(existing: usize) -> String {
    format!("Pump {}", existing + 1)
}

/// All pumps drawing from one tank. Stored under the tank's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpBank {
    pub tank_id: TankId,
    pub station_id: StationId,
    #[serde(default)]
    pub pumps: Vec<SubPump>,
}

impl Record for PumpBank {
    const COLLECTION: &'static str = "pump_banks";

    fn key(&self) -> DocumentId {
        self.tank_id.document_id()
    }
}

impl PumpBank {
    pub fn new(tank_id: TankId, station_id: StationId) -> Self {
        Self {
            tank_id,
            station_id,
            pumps: Vec::new(),
        }
    }

    /// Appends a pump, titling it by position if its title is blank.
    pub fn push(&mut self, mut pump: SubPump) -> &SubPump {
        if pump.title.trim().is_empty() {
            pump.title = next_pump_title(self.pumps.len());
        } else {
            pump.title = pump.title.trim().to_string();
        }
        self.pumps.push(pump);
        &self.pumps[self.pumps.len() - 1]
    }

    pub fn pump(&self, id: PumpId) -> Option<&SubPump> {
        self.pumps.iter().find(|p| p.id == id)
    }

    pub fn pump_mut(&mut self, id: PumpId) -> Option<&mut SubPump> {
        self.pumps.iter_mut().find(|p| p.id == id)
    }

    /// Removes a pump without touching the titles of the others.
    pub fn remove(&mut self, id: PumpId) -> Option<SubPump> {
        let index = self.pumps.iter().position(|p| p.id == id)?;
        Some(self.pumps.remove(index))
    }

    /// Sets the price on every pump, returning how many were updated.
    pub fn set_price(&mut self, price: PricePerLiter) -> usize {
        for pump in &mut self.pumps {
            pump.price_per_ltr = price;
        }
        self.pumps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(v: f64) -> PricePerLiter {
        PricePerLiter::parse("p", v).unwrap()
    }

    fn bank() -> PumpBank {
        PumpBank::new(TankId::new(), StationId::new())
    }

    #[test]
    fn untitled_pumps_are_numbered_by_position() {
        let mut bank = bank();
        assert_eq!(bank.push(SubPump::new("", price(1.0), Utc::now())).title, "Pump 1");
        assert_eq!(bank.push(SubPump::new("  ", price(1.0), Utc::now())).title, "Pump 2");
        assert_eq!(
            bank.push(SubPump::new("Island 3", price(1.0), Utc::now())).title,
            "Island 3"
        );
        assert_eq!(bank.push(SubPump::new("", price(1.0), Utc::now())).title, "Pump 4");
    }

    #[test]
    fn deleting_does_not_renumber_and_titles_can_repeat() {
        let mut bank = bank();
        let first = bank.push(SubPump::new("", price(1.0), Utc::now())).id;
        bank.push(SubPump::new("", price(1.0), Utc::now()));
        bank.push(SubPump::new("", price(1.0), Utc::now()));

        bank.remove(first).unwrap();
        let titles: Vec<_> = bank.pumps.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["Pump 2", "Pump 3"]);

        // Two pumps left, so the next one is "Pump 3" again
        assert_eq!(bank.push(SubPump::new("", price(1.0), Utc::now())).title, "Pump 3");
    }

    #[test]
    fn set_price_touches_every_pump() {
        let mut bank = bank();
        bank.push(SubPump::new("", price(1.0), Utc::now()));
        bank.push(SubPump::new("", price(2.0), Utc::now()));

        assert_eq!(bank.set_price(price(850.0)), 2);
        assert!(bank.pumps.iter().all(|p| p.price_per_ltr == price(850.0)));
    }

    #[test]
    fn new_pump_is_idle() {
        let pump = SubPump::new("", price(1.0), Utc::now());
        assert_eq!(pump.status, PumpStatus::Idle);
        assert!(pump.daily_ltr_sales.is_empty());
        assert_eq!("MAINTENANCE".parse::<PumpStatus>().unwrap(), PumpStatus::Maintenance);
        assert!("broken".parse::<PumpStatus>().is_err());
    }
}
