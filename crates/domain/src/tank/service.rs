//! Tank service: add, list, update and delete sub-tanks of a station.

use std::sync::Arc;

use document_store::DocumentStore;
use serde::{Deserialize, Serialize};

use crate::actor::StationAccess;
use crate::error::{DomainError, ErrorCategory, ValidationError};
use crate::fuel::FuelType;
use crate::ids::{StationId, TankId};
use crate::notifier::{Notification, Notifier};
use crate::pump::PumpBank;
use crate::record::{Record, Repository, retry_on_conflict};
use crate::validation::{non_blank, present, required};
use crate::values::Liters;

use super::{SubTank, TankInventory};

/// Request to add a tank.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTank {
    pub title: Option<String>,
    pub fuel_type: Option<String>,
    pub limit: Option<f64>,
    pub threshold: Option<f64>,
}

impl NewTank {
    fn validate(&self) -> Result<SubTank, ValidationError> {
        let title = required("title", self.title.as_deref());
        let fuel_type = required("fuelType", self.fuel_type.as_deref())
            .and_then(|f| f.parse::<FuelType>());
        let limit = present("limit", self.limit).and_then(|v| Liters::parse("limit", v));
        let threshold =
            present("threshold", self.threshold).and_then(|v| Liters::parse("threshold", v));

        match (title, fuel_type, limit, threshold) {
            (Ok(title), Ok(fuel_type), Ok(limit), Ok(threshold)) => {
                Ok(SubTank::new(title, fuel_type, limit, threshold))
            }
            (title, fuel_type, limit, threshold) => {
                let errors = [
                    title.err(),
                    fuel_type.err(),
                    limit.err(),
                    threshold.err(),
                ];
                Err(ValidationError::from_errors(
                    errors.into_iter().flatten().collect(),
                ))
            }
        }
    }
}

/// Request to edit a tank. `current_quantity` is a delta, not an absolute value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TankUpdate {
    pub tank_id: Option<TankId>,
    pub title: Option<String>,
    pub fuel_type: Option<String>,
    pub limit: Option<f64>,
    pub threshold: Option<f64>,
    pub current_quantity: Option<f64>,
}

#[derive(Debug, Clone)]
struct TankChanges {
    title: Option<String>,
    fuel_type: Option<FuelType>,
    limit: Option<Liters>,
    threshold: Option<Liters>,
    delta: Option<f64>,
}

impl TankUpdate {
    fn validate(&self) -> Result<TankChanges, ValidationError> {
        let fuel_type = non_blank(self.fuel_type.as_deref())
            .map(|f| f.parse::<FuelType>())
            .transpose()?;
        let limit = self
            .limit
            .map(|v| Liters::parse("limit", v))
            .transpose()?;
        let threshold = self
            .threshold
            .map(|v| Liters::parse("threshold", v))
            .transpose()?;
        if let Some(delta) = self.current_quantity
            && !delta.is_finite()
        {
            return Err(ValidationError::invalid_number("currentQuantity", delta));
        }

        Ok(TankChanges {
            title: non_blank(self.title.as_deref()),
            fuel_type,
            limit,
            threshold,
            delta: self.current_quantity,
        })
    }
}

/// A station's tanks and their combined quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TankListing {
    pub total: f64,
    pub tanks: Vec<SubTank>,
}

/// Service for managing a station's tanks.
pub struct TankService<S: DocumentStore> {
    repo: Repository<S>,
    notifier: Arc<dyn Notifier>,
}

impl<S: DocumentStore> TankService<S> {
    /// Creates a new tank service.
    pub fn new(store: S, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repo: Repository::new(store),
            notifier,
        }
    }

    /// Adds a tank to the station, creating the station's inventory on first use.
    #[tracing::instrument(skip(self, access, input), fields(station = %access.station()))]
    pub async fn add_tank(
        &self,
        access: &StationAccess,
        input: NewTank,
    ) -> Result<TankInventory, DomainError> {
        let tank = input.validate()?;
        let station = access.station();
        let tank = &tank;

        let inventory =
            retry_on_conflict("add_tank", move || self.try_add_tank(station, tank.clone())).await?;
        tracing::info!(tank_id = %tank.id, title = %tank.title, "tank added");
        Ok(inventory)
    }

    async fn try_add_tank(
        &self,
        station: StationId,
        tank: SubTank,
    ) -> Result<TankInventory, DomainError> {
        match self.repo.load::<TankInventory>(station).await? {
            None => {
                let mut inventory = TankInventory::new(station);
                inventory.add(tank)?;
                self.repo.commit(vec![inventory.insert_op()?]).await?;
                Ok(inventory)
            }
            Some(mut current) => {
                current.record.add(tank)?;
                self.repo.commit(vec![current.replace_op()?]).await?;
                Ok(current.record)
            }
        }
    }

    /// Lists the station's tanks with their combined quantity.
    #[tracing::instrument(skip(self, access), fields(station = %access.station()))]
    pub async fn list_tanks(&self, access: &StationAccess) -> Result<TankListing, DomainError> {
        let inventory = self
            .repo
            .load::<TankInventory>(access.station())
            .await?
            .map(|v| v.record)
            .filter(|inv| !inv.tanks.is_empty())
            .ok_or_else(|| DomainError::not_found("Tanks for station", access.station()))?;

        Ok(TankListing {
            total: inventory.total_quantity(),
            tanks: inventory.tanks,
        })
    }

    /// Edits a tank.
    ///
    /// A supplied `currentQuantity` is added to the stored quantity under the
    /// same capacity check as a completed delivery. A low-stock notification
    /// is sent when the result sits at or below the threshold.
    #[tracing::instrument(skip(self, access, input), fields(station = %access.station()))]
    pub async fn update_tank(
        &self,
        access: &StationAccess,
        input: TankUpdate,
    ) -> Result<SubTank, DomainError> {
        let tank_id = present("tankId", input.tank_id)?;
        let changes = input.validate()?;
        let station = access.station();
        let changes = &changes;

        let updated = retry_on_conflict("update_tank", move || {
            self.try_update_tank(station, tank_id, changes)
        })
        .await
        .inspect_err(|err| {
            if err.category() == ErrorCategory::Unprocessable {
                metrics::counter!("tank_capacity_rejections_total").increment(1);
                tracing::info!(%tank_id, error = %err, "tank update rejected");
            }
        })?;

        if updated.is_low() {
            self.notify_low_stock(station, &updated).await;
        }
        Ok(updated)
    }

    async fn try_update_tank(
        &self,
        station: StationId,
        tank_id: TankId,
        changes: &TankChanges,
    ) -> Result<SubTank, DomainError> {
        let mut inventory = self
            .repo
            .load::<TankInventory>(station)
            .await?
            .ok_or_else(|| DomainError::not_found("Tank inventory", station))?;

        if let Some(title) = &changes.title
            && inventory.record.title_taken(title, Some(tank_id))
        {
            return Err(super::TankError::DuplicateTitle {
                title: title.clone(),
            }
            .into());
        }

        let tank = inventory
            .record
            .tank_mut(tank_id)
            .ok_or_else(|| DomainError::not_found("Tank", tank_id))?;

        if let Some(title) = &changes.title {
            tank.title = title.clone();
        }
        if let Some(fuel_type) = changes.fuel_type {
            tank.fuel_type = fuel_type;
        }
        if let Some(threshold) = changes.threshold {
            tank.threshold = threshold;
        }

        let target_limit = changes.limit.unwrap_or(tank.limit);
        if let Some(delta) = changes.delta {
            tank.limit = target_limit;
            tank.adjust(delta)?;
        }
        tank.set_limit(target_limit)?;

        let updated = tank.clone();
        self.repo.commit(vec![inventory.replace_op()?]).await?;
        Ok(updated)
    }

    /// Deletes a tank together with its pump bank.
    #[tracing::instrument(skip(self, access), fields(station = %access.station()))]
    pub async fn delete_tank(
        &self,
        access: &StationAccess,
        tank_id: Option<TankId>,
    ) -> Result<SubTank, DomainError> {
        let tank_id = present("tankId", tank_id)?;
        let station = access.station();

        let removed =
            retry_on_conflict("delete_tank", move || self.try_delete_tank(station, tank_id))
                .await?;
        tracing::info!(%tank_id, title = %removed.title, "tank deleted");
        Ok(removed)
    }

    async fn try_delete_tank(
        &self,
        station: StationId,
        tank_id: TankId,
    ) -> Result<SubTank, DomainError> {
        let mut inventory = self
            .repo
            .load::<TankInventory>(station)
            .await?
            .ok_or_else(|| DomainError::not_found("Tank inventory", station))?;

        let removed = inventory
            .record
            .remove(tank_id)
            .ok_or_else(|| DomainError::not_found("Tank", tank_id))?;

        let mut ops = vec![inventory.replace_op()?];
        if let Some(bank) = self.repo.load::<PumpBank>(tank_id).await? {
            ops.push(bank.delete_op());
        }
        self.repo.commit(ops).await?;
        Ok(removed)
    }

    async fn notify_low_stock(&self, station: StationId, tank: &SubTank) {
        let notification = Notification::LowStock {
            station_id: station,
            tank_id: tank.id,
            title: tank.title.clone(),
            fuel_type: tank.fuel_type,
            current_quantity: tank.current_quantity.value(),
            threshold: tank.threshold.value(),
        };
        if let Err(err) = self.notifier.send(notification).await {
            tracing::error!(tank_id = %tank.id, error = %err, "failed to send low-stock notification");
        }
    }
}
