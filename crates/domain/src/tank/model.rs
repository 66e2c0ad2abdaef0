use common::DocumentId;
use serde::{Deserialize, Serialize};

use crate::fuel::FuelType;
use crate::ids::{StationId, TankId};
use crate::record::Record;
use crate::values::Liters;

use super::{TankError, check_capacity};

/// One physical tank.
///
/// Invariant: `0 <= current_quantity <= limit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTank {
    pub id: TankId,
    pub title: String,
    pub fuel_type: FuelType,
    pub limit: Liters,
    pub threshold: Liters,
    pub current_quantity: Liters,
}

impl SubTank {
    /// Creates an empty tank.
    pub fn new(title: impl Into<String>, fuel_type: FuelType, limit: Liters, threshold: Liters) -> Self {
        Self {
            id: TankId::new(),
            title: title.into(),
            fuel_type,
            limit,
            threshold,
            current_quantity: Liters::zero(),
        }
    }

    /// Adds fuel, enforcing the capacity limit.
    pub fn receive(&mut self, amount: Liters) -> Result<(), TankError> {
        self.current_quantity = check_capacity(self.current_quantity, self.limit, amount)?;
        Ok(())
    }

    /// Applies a signed change to the quantity.
    ///
    /// Positive deltas go through the capacity check; negative deltas may not
    /// empty the tank below zero.
    pub fn adjust(&mut self, delta: f64) -> Result<(), TankError> {
        if delta >= 0.0 {
            let amount = Liters::parse("currentQuantity", delta).map_err(|_| {
                TankError::CapacityExceeded {
                    attempted: delta,
                    current: self.current_quantity.value(),
                    limit: self.limit.value(),
                }
            })?;
            return self.receive(amount);
        }

        self.current_quantity =
            self.current_quantity
                .offset(delta)
                .ok_or(TankError::BelowEmpty {
                    requested: -delta,
                    current: self.current_quantity.value(),
                })?;
        Ok(())
    }

    /// Changes the limit. The tank must still fit its contents.
    pub fn set_limit(&mut self, limit: Liters) -> Result<(), TankError> {
        if limit < self.current_quantity {
            return Err(TankError::LimitBelowCurrent {
                limit: limit.value(),
                current: self.current_quantity.value(),
            });
        }
        self.limit = limit;
        Ok(())
    }

    /// Returns true when the quantity is at or below the low-stock threshold.
    pub fn is_low(&self) -> bool {
        self.current_quantity <= self.threshold
    }
}

/// All tanks of one station. Stored under the station's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TankInventory {
    pub station_id: StationId,
    #[serde(default)]
    pub tanks: Vec<SubTank>,
}

impl Record for TankInventory {
    const COLLECTION: &'static str = "tank_inventories";

    fn key(&self) -> DocumentId {
        self.station_id.document_id()
    }
}

impl TankInventory {
    pub fn new(station_id: StationId) -> Self {
        Self {
            station_id,
            tanks: Vec::new(),
        }
    }

    pub fn tank(&self, id: TankId) -> Option<&SubTank> {
        self.tanks.iter().find(|t| t.id == id)
    }

    pub fn tank_mut(&mut self, id: TankId) -> Option<&mut SubTank> {
        self.tanks.iter_mut().find(|t| t.id == id)
    }

    /// Returns true if another tank already uses `title` (case-insensitive).
    pub fn title_taken(&self, title: &str, except: Option<TankId>) -> bool {
        let wanted = title.trim().to_lowercase();
        self.tanks
            .iter()
            .any(|t| Some(t.id) != except && t.title.trim().to_lowercase() == wanted)
    }

    /// Appends a tank, rejecting duplicate titles.
    pub fn add(&mut self, tank: SubTank) -> Result<&SubTank, TankError> {
        if self.title_taken(&tank.title, None) {
            return Err(TankError::DuplicateTitle { title: tank.title });
        }
        self.tanks.push(tank);
        Ok(&self.tanks[self.tanks.len() - 1])
    }

    /// Removes a tank, returning it.
    pub fn remove(&mut self, id: TankId) -> Option<SubTank> {
        let index = self.tanks.iter().position(|t| t.id == id)?;
        Some(self.tanks.remove(index))
    }

    /// Tanks holding `fuel_type`.
    pub fn tanks_of(&self, fuel_type: FuelType) -> impl Iterator<Item = &SubTank> {
        self.tanks.iter().filter(move |t| t.fuel_type == fuel_type)
    }

    /// Sum of the current quantity of every tank.
    pub fn total_quantity(&self) -> f64 {
        self.tanks.iter().map(|t| t.current_quantity.value()).sum()
    }
}
