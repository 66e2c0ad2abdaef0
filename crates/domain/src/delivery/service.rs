//! Delivery service: records deliveries and reconciles completed ones with the tank.

use chrono::{DateTime, Utc};
use document_store::{DocumentStore, WriteOp};
use serde::{Deserialize, Serialize};

use crate::actor::StationAccess;
use crate::dates::{parse_date, parse_optional_date};
use crate::error::{DomainError, ErrorCategory, ValidationError};
use crate::ids::{DeliveryId, StationId, TankId};
use crate::record::{Record, Repository, Versioned, retry_on_conflict};
use crate::tank::{TankInventory, check_capacity};
use crate::validation::{non_blank, present, required};
use crate::values::{Liters, PricePerLiter};

use super::{Delivery, DeliveryError, DeliveryStatus, Transition};

const UNKNOWN_TANK: &str = "Unknown Tank";
const UNKNOWN_FUEL: &str = "Unknown";

fn positive_quantity(value: f64) -> Result<Liters, ValidationError> {
    let quantity = Liters::parse("quantity", value)?;
    if quantity.value() == 0.0 {
        return Err(ValidationError::Other(
            "quantity must be greater than zero".into(),
        ));
    }
    Ok(quantity)
}

fn parse_status(value: Option<&str>) -> Result<Option<DeliveryStatus>, ValidationError> {
    non_blank(value).map(|s| s.parse()).transpose()
}

/// Request to record a delivery.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDelivery {
    pub tank: Option<TankId>,
    pub price_per_ltr: Option<f64>,
    pub quantity: Option<f64>,
    pub supplier: Option<String>,
    pub delivery_date: Option<String>,
    pub status: Option<String>,
}

impl NewDelivery {
    fn validate(&self, station_id: StationId) -> Result<Delivery, ValidationError> {
        let tank_id = present("tank", self.tank);
        let price = present("pricePerLtr", self.price_per_ltr)
            .and_then(|v| PricePerLiter::parse("pricePerLtr", v));
        let quantity = present("quantity", self.quantity).and_then(positive_quantity);
        let supplier = required("supplier", self.supplier.as_deref());
        let delivery_date = required("deliveryDate", self.delivery_date.as_deref())
            .and_then(|v| parse_date("deliveryDate", &v));
        let status = parse_status(self.status.as_deref());

        match (tank_id, price, quantity, supplier, delivery_date, status) {
            (Ok(tank_id), Ok(price_per_ltr), Ok(quantity), Ok(supplier), Ok(delivery_date), Ok(status)) => {
                Ok(Delivery {
                    id: DeliveryId::new(),
                    station_id,
                    tank_id,
                    price_per_ltr,
                    quantity,
                    supplier,
                    delivery_date,
                    status: status.unwrap_or_default(),
                })
            }
            (tank_id, price, quantity, supplier, delivery_date, status) => {
                let errors = [
                    tank_id.err(),
                    price.err(),
                    quantity.err(),
                    supplier.err(),
                    delivery_date.err(),
                    status.err(),
                ];
                Err(ValidationError::from_errors(
                    errors.into_iter().flatten().collect(),
                ))
            }
        }
    }
}

/// Request to edit a delivery. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryUpdate {
    pub supply_id: Option<DeliveryId>,
    pub price_per_ltr: Option<f64>,
    pub quantity: Option<f64>,
    pub supplier: Option<String>,
    pub delivery_date: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone)]
struct DeliveryChanges {
    price_per_ltr: Option<PricePerLiter>,
    quantity: Option<Liters>,
    supplier: Option<String>,
    delivery_date: Option<DateTime<Utc>>,
    status: Option<DeliveryStatus>,
}

impl DeliveryUpdate {
    fn validate(&self) -> Result<DeliveryChanges, ValidationError> {
        Ok(DeliveryChanges {
            price_per_ltr: self
                .price_per_ltr
                .map(|v| PricePerLiter::parse("pricePerLtr", v))
                .transpose()?,
            quantity: self.quantity.map(positive_quantity).transpose()?,
            supplier: non_blank(self.supplier.as_deref()),
            delivery_date: parse_optional_date("deliveryDate", self.delivery_date.as_deref())?,
            status: parse_status(self.status.as_deref())?,
        })
    }
}

/// A delivery joined with the title and fuel type of its tank.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryView {
    pub id: DeliveryId,
    pub tank: TankId,
    pub tank_title: String,
    pub fuel_type: String,
    pub price_per_ltr: PricePerLiter,
    pub quantity: Liters,
    pub supplier: String,
    pub delivery_date: DateTime<Utc>,
    pub status: DeliveryStatus,
}

/// Service for recording fuel deliveries.
pub struct DeliveryService<S: DocumentStore> {
    repo: Repository<S>,
}

impl<S: DocumentStore> DeliveryService<S> {
    /// Creates a new delivery service.
    pub fn new(store: S) -> Self {
        Self {
            repo: Repository::new(store),
        }
    }

    /// Records a delivery.
    ///
    /// The quantity must fit the tank even when the delivery is still
    /// pending. A delivery created as Completed fills the tank in the same
    /// commit.
    #[tracing::instrument(skip(self, access, input), fields(station = %access.station()))]
    pub async fn add_delivery(
        &self,
        access: &StationAccess,
        input: NewDelivery,
    ) -> Result<Versioned<Delivery>, DomainError> {
        let delivery = input.validate(access.station())?;
        let delivery = &delivery;

        retry_on_conflict("add_delivery", move || self.try_add_delivery(delivery.clone()))
            .await
            .inspect_err(|err| record_rejection(delivery.tank_id, err))?;

        metrics::counter!("deliveries_created_total", "status" => delivery.status.as_str())
            .increment(1);
        if delivery.status == DeliveryStatus::Completed {
            metrics::counter!("deliveries_completed_total").increment(1);
        }
        tracing::info!(
            delivery_id = %delivery.id,
            tank_id = %delivery.tank_id,
            quantity = %delivery.quantity,
            status = %delivery.status,
            "delivery recorded"
        );
        Ok(Versioned::inserted(delivery.clone()))
    }

    async fn try_add_delivery(&self, delivery: Delivery) -> Result<(), DomainError> {
        let mut inventory = self.load_inventory(delivery.station_id).await?;
        let tank = inventory
            .record
            .tank_mut(delivery.tank_id)
            .ok_or_else(|| DomainError::not_found("Tank", delivery.tank_id))?;

        check_capacity(tank.current_quantity, tank.limit, delivery.quantity)?;

        let mut ops = vec![delivery.insert_op()?];
        if delivery.status == DeliveryStatus::Completed {
            tank.receive(delivery.quantity)?;
            ops.push(inventory.replace_op()?);
        }
        self.repo.commit(ops).await
    }

    /// Lists the station's deliveries with their tank's title and fuel type.
    #[tracing::instrument(skip(self, access), fields(station = %access.station()))]
    pub async fn list_deliveries(
        &self,
        access: &StationAccess,
    ) -> Result<Vec<DeliveryView>, DomainError> {
        let station = access.station();
        let deliveries = self
            .repo
            .find::<Delivery>(Delivery::query().field_eq("stationId", station.to_string()))
            .await?;
        if deliveries.is_empty() {
            return Err(DomainError::not_found("Supply records for station", station));
        }

        let inventory = self
            .repo
            .load::<TankInventory>(station)
            .await?
            .map(|v| v.record);

        Ok(deliveries
            .into_iter()
            .map(|Versioned { record, .. }| {
                let tank = inventory.as_ref().and_then(|inv| inv.tank(record.tank_id));
                DeliveryView {
                    id: record.id,
                    tank: record.tank_id,
                    tank_title: tank.map_or(UNKNOWN_TANK.to_string(), |t| t.title.clone()),
                    fuel_type: tank.map_or(UNKNOWN_FUEL.to_string(), |t| t.fuel_type.to_string()),
                    price_per_ltr: record.price_per_ltr,
                    quantity: record.quantity,
                    supplier: record.supplier,
                    delivery_date: record.delivery_date,
                    status: record.status,
                }
            })
            .collect())
    }

    /// Edits a delivery.
    ///
    /// Field edits are plain overwrites. Moving a pending delivery to
    /// Completed adds its (possibly edited) quantity to the tank in the same
    /// commit; requesting the status it already has changes nothing.
    #[tracing::instrument(skip(self, access, input), fields(station = %access.station()))]
    pub async fn update_delivery(
        &self,
        access: &StationAccess,
        input: DeliveryUpdate,
    ) -> Result<Versioned<Delivery>, DomainError> {
        let delivery_id = present("supplyId", input.supply_id)?;
        let changes = input.validate()?;
        let station = access.station();
        let changes = &changes;

        let (updated, transition) = retry_on_conflict("update_delivery", move || {
            self.try_update_delivery(station, delivery_id, changes)
        })
        .await
        .inspect_err(|err| {
            if err.category() == ErrorCategory::Unprocessable {
                metrics::counter!("tank_capacity_rejections_total").increment(1);
                tracing::info!(%delivery_id, error = %err, "delivery completion rejected");
            }
        })?;

        if transition == Transition::Complete {
            metrics::counter!("deliveries_completed_total").increment(1);
            tracing::info!(
                %delivery_id,
                tank_id = %updated.record.tank_id,
                quantity = %updated.record.quantity,
                "delivery completed"
            );
        }
        Ok(updated)
    }

    async fn try_update_delivery(
        &self,
        station: StationId,
        delivery_id: DeliveryId,
        changes: &DeliveryChanges,
    ) -> Result<(Versioned<Delivery>, Transition), DomainError> {
        let mut current = self.load_delivery(station, delivery_id).await?;
        let transition = match changes.status {
            Some(status) => current.record.status.transition_to(status)?,
            None => Transition::Unchanged,
        };

        let delivery = &mut current.record;
        if let Some(price) = changes.price_per_ltr {
            delivery.price_per_ltr = price;
        }
        if let Some(quantity) = changes.quantity {
            delivery.quantity = quantity;
        }
        if let Some(supplier) = &changes.supplier {
            delivery.supplier = supplier.clone();
        }
        if let Some(date) = changes.delivery_date {
            delivery.delivery_date = date;
        }
        if let Some(status) = changes.status {
            delivery.status = status;
        }

        let mut ops = vec![current.replace_op()?];
        if transition == Transition::Complete {
            ops.push(self.fill_tank(&current.record).await?);
        }
        self.repo.commit(ops).await?;
        Ok((current.committed(), transition))
    }

    /// Builds the tank write for a delivery that has just completed.
    async fn fill_tank(&self, delivery: &Delivery) -> Result<WriteOp, DomainError> {
        let mut inventory = self.load_inventory(delivery.station_id).await?;
        inventory
            .record
            .tank_mut(delivery.tank_id)
            .ok_or_else(|| DomainError::not_found("Tank", delivery.tank_id))?
            .receive(delivery.quantity)?;
        inventory.replace_op()
    }

    /// Deletes a delivery that has not been completed.
    #[tracing::instrument(skip(self, access), fields(station = %access.station()))]
    pub async fn delete_delivery(
        &self,
        access: &StationAccess,
        delivery_id: Option<DeliveryId>,
    ) -> Result<(), DomainError> {
        let delivery_id = present("supplyId", delivery_id)?;
        let station = access.station();

        retry_on_conflict("delete_delivery", move || {
            self.try_delete_delivery(station, delivery_id)
        })
        .await?;
        tracing::info!(%delivery_id, "delivery deleted");
        Ok(())
    }

    async fn try_delete_delivery(
        &self,
        station: StationId,
        delivery_id: DeliveryId,
    ) -> Result<(), DomainError> {
        let current = self.load_delivery(station, delivery_id).await?;
        if current.record.status == DeliveryStatus::Completed {
            return Err(DeliveryError::CompletedNotDeletable.into());
        }
        self.repo.commit(vec![current.delete_op()]).await
    }

    async fn load_delivery(
        &self,
        station: StationId,
        delivery_id: DeliveryId,
    ) -> Result<Versioned<Delivery>, DomainError> {
        self.repo
            .load::<Delivery>(delivery_id)
            .await?
            .filter(|d| d.record.station_id == station)
            .ok_or_else(|| DomainError::not_found("Supply record", delivery_id))
    }

    async fn load_inventory(
        &self,
        station: StationId,
    ) -> Result<Versioned<TankInventory>, DomainError> {
        self.repo
            .load::<TankInventory>(station)
            .await?
            .ok_or_else(|| DomainError::not_found("Tank record for station", station))
    }
}

fn record_rejection(tank_id: TankId, err: &DomainError) {
    if err.category() == ErrorCategory::Unprocessable {
        metrics::counter!("tank_capacity_rejections_total").increment(1);
        tracing::info!(%tank_id, error = %err, "delivery rejected by tank capacity");
    }
}
