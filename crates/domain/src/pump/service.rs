//! Pump service: pump CRUD, daily sales, price propagation and reporting.

use chrono::{DateTime, Utc};
use document_store::{DocumentQuery, DocumentStore};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::actor::StationAccess;
use crate::dates::{parse_date, parse_optional_date};
use crate::error::{DomainError, ValidationError};
use crate::fuel::FuelType;
use crate::ids::{PumpId, StationId, TankId};
use crate::record::{Record, Repository, Versioned, retry_on_conflict};
use crate::tank::TankInventory;
use crate::validation::{non_blank, present, required};
use crate::values::{Liters, PricePerLiter};

use super::{
    DailySale, DateRange, FuelPriceUpdate, PriceTable, PumpBank, PumpError, PumpStatus, SalesReport,
    SubPump, propagate_prices,
};

/// Request to add a pump to a tank.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPump {
    pub tank_id: Option<TankId>,
    pub price_per_ltr: Option<f64>,
    pub start_date: Option<String>,
    pub title: Option<String>,
}

impl NewPump {
    fn validate(&self) -> Result<(TankId, SubPump), ValidationError> {
        let tank_id = present("tankId", self.tank_id);
        let price = present("pricePerLtr", self.price_per_ltr)
            .and_then(|v| PricePerLiter::parse("pricePerLtr", v));
        let start_date = required("startDate", self.start_date.as_deref())
            .and_then(|v| parse_date("startDate", &v));

        match (tank_id, price, start_date) {
            (Ok(tank_id), Ok(price), Ok(start_date)) => {
                let title = non_blank(self.title.as_deref()).unwrap_or_default();
                Ok((tank_id, SubPump::new(title, price, start_date)))
            }
            (tank_id, price, start_date) => Err(ValidationError::from_errors(
                [tank_id.err(), price.err(), start_date.err()]
                    .into_iter()
                    .flatten()
                    .collect(),
            )),
        }
    }
}

/// One raw daily sale entry as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySaleInput {
    pub date: Option<String>,
    pub ltr_sale: Option<f64>,
    pub price_per_ltr: Option<f64>,
}

/// A daily sale whose price may still need the pump's default.
#[derive(Debug, Clone)]
struct PendingSale {
    date: DateTime<Utc>,
    ltr_sale: Liters,
    price_per_ltr: Option<PricePerLiter>,
}

impl PendingSale {
    fn resolve(&self, default_price: PricePerLiter) -> DailySale {
        DailySale {
            date: self.date,
            ltr_sale: self.ltr_sale,
            price_per_ltr: self.price_per_ltr.unwrap_or(default_price),
        }
    }
}

impl DailySaleInput {
    fn validate(&self) -> Result<PendingSale, ValidationError> {
        let date = required("date", self.date.as_deref()).and_then(|v| parse_date("date", &v))?;
        let ltr_sale = present("ltrSale", self.ltr_sale).and_then(|v| Liters::parse("ltrSale", v))?;
        let price_per_ltr = self
            .price_per_ltr
            .map(|v| PricePerLiter::parse("pricePerLtr", v))
            .transpose()?;
        Ok(PendingSale {
            date,
            ltr_sale,
            price_per_ltr,
        })
    }
}

/// Request to edit a pump. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpUpdate {
    pub pump_id: Option<PumpId>,
    pub price_per_ltr: Option<f64>,
    pub status: Option<String>,
    pub last_maintenance: Option<String>,
    pub start_date: Option<String>,
    pub daily_ltr_sales: Option<Vec<DailySaleInput>>,
}

#[derive(Debug, Clone)]
struct PumpChanges {
    price_per_ltr: Option<PricePerLiter>,
    status: Option<PumpStatus>,
    last_maintenance: Option<DateTime<Utc>>,
    start_date: Option<DateTime<Utc>>,
    daily_ltr_sales: Option<Vec<PendingSale>>,
}

impl PumpUpdate {
    fn validate(&self) -> Result<PumpChanges, DomainError> {
        let price_per_ltr = self
            .price_per_ltr
            .map(|v| PricePerLiter::parse("pricePerLtr", v))
            .transpose()?;
        let status = non_blank(self.status.as_deref())
            .map(|s| s.parse::<PumpStatus>())
            .transpose()?;
        let last_maintenance =
            parse_optional_date("lastMaintenance", self.last_maintenance.as_deref())?;
        let start_date = parse_optional_date("startDate", self.start_date.as_deref())?;

        let daily_ltr_sales = match &self.daily_ltr_sales {
            None => None,
            Some(entries) => Some(
                entries
                    .iter()
                    .enumerate()
                    .map(|(index, entry)| {
                        entry
                            .validate()
                            .map_err(|source| PumpError::InvalidSale { index, source })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };

        Ok(PumpChanges {
            price_per_ltr,
            status,
            last_maintenance,
            start_date,
            daily_ltr_sales,
        })
    }
}

/// Request to propagate prices by fuel type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceUpdate {
    pub prices: Option<Map<String, Value>>,
}

/// A pump flattened together with the tank it draws from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpView {
    pub tank_id: TankId,
    pub fuel_type: Option<FuelType>,
    pub pump_id: PumpId,
    pub title: String,
    pub status: PumpStatus,
    pub price_per_ltr: PricePerLiter,
    pub start_date: DateTime<Utc>,
    pub last_maintenance: Option<DateTime<Utc>>,
    pub daily_ltr_sales: Vec<DailySale>,
}

impl PumpView {
    fn new(tank_id: TankId, fuel_type: Option<FuelType>, pump: &SubPump) -> Self {
        Self {
            tank_id,
            fuel_type,
            pump_id: pump.id,
            title: pump.title.clone(),
            status: pump.status,
            price_per_ltr: pump.price_per_ltr,
            start_date: pump.start_date,
            last_maintenance: pump.last_maintenance,
            daily_ltr_sales: pump.daily_ltr_sales.clone(),
        }
    }
}

/// A pump that was just added, with the tank it was added to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedPump {
    pub tank_id: TankId,
    pub pump: SubPump,
}

/// Service for managing a station's pumps.
pub struct PumpService<S: DocumentStore> {
    repo: Repository<S>,
}

impl<S: DocumentStore> PumpService<S> {
    /// Creates a new pump service.
    pub fn new(store: S) -> Self {
        Self {
            repo: Repository::new(store),
        }
    }

    fn banks_of(station: StationId) -> DocumentQuery {
        PumpBank::query().field_eq("stationId", station.to_string())
    }

    async fn inventory(&self, station: StationId) -> Result<Option<TankInventory>, DomainError> {
        Ok(self
            .repo
            .load::<TankInventory>(station)
            .await?
            .map(|v| v.record))
    }

    /// Finds the bank holding `pump_id` among the station's banks.
    async fn bank_with_pump(
        &self,
        station: StationId,
        pump_id: PumpId,
    ) -> Result<Versioned<PumpBank>, DomainError> {
        self.repo
            .find::<PumpBank>(Self::banks_of(station))
            .await?
            .into_iter()
            .find(|bank| bank.record.pump(pump_id).is_some())
            .ok_or_else(|| DomainError::not_found("Pump", pump_id))
    }

    /// Appends a pump to one of the station's tanks.
    #[tracing::instrument(skip(self, access, input), fields(station = %access.station()))]
    pub async fn add_pump(
        &self,
        access: &StationAccess,
        input: NewPump,
    ) -> Result<AddedPump, DomainError> {
        let (tank_id, pump) = input.validate()?;
        let station = access.station();
        let pump = &pump;

        let added = retry_on_conflict("add_pump", move || {
            self.try_add_pump(station, tank_id, pump.clone())
        })
        .await?;
        tracing::info!(%tank_id, pump_id = %added.pump.id, title = %added.pump.title, "pump added");
        Ok(added)
    }

    async fn try_add_pump(
        &self,
        station: StationId,
        tank_id: TankId,
        pump: SubPump,
    ) -> Result<AddedPump, DomainError> {
        let tank_exists = self
            .inventory(station)
            .await?
            .is_some_and(|inv| inv.tank(tank_id).is_some());
        if !tank_exists {
            return Err(DomainError::not_found("Tank", tank_id));
        }

        let (op, added) = match self.repo.load::<PumpBank>(tank_id).await? {
            Some(mut bank) => {
                let added = bank.record.push(pump).clone();
                (bank.replace_op()?, added)
            }
            None => {
                let mut bank = PumpBank::new(tank_id, station);
                let added = bank.push(pump).clone();
                (bank.insert_op()?, added)
            }
        };
        self.repo.commit(vec![op]).await?;
        Ok(AddedPump {
            tank_id,
            pump: added,
        })
    }

    /// Lists every pump of the station with the fuel type of its tank.
    #[tracing::instrument(skip(self, access), fields(station = %access.station()))]
    pub async fn list_pumps(&self, access: &StationAccess) -> Result<Vec<PumpView>, DomainError> {
        let station = access.station();
        let inventory = self.inventory(station).await?;
        let banks = self.repo.find::<PumpBank>(Self::banks_of(station)).await?;

        let pumps: Vec<PumpView> = banks
            .iter()
            .flat_map(|bank| {
                let tank_id = bank.record.tank_id;
                let fuel_type = inventory
                    .as_ref()
                    .and_then(|inv| inv.tank(tank_id))
                    .map(|t| t.fuel_type);
                bank.record
                    .pumps
                    .iter()
                    .map(move |pump| PumpView::new(tank_id, fuel_type, pump))
            })
            .collect();

        if pumps.is_empty() {
            return Err(DomainError::not_found("Pumps for station", station));
        }
        Ok(pumps)
    }

    /// Edits a pump.
    ///
    /// A supplied `dailyLtrSales` list replaces the stored entries; entries
    /// without a price take the pump's price after this update.
    #[tracing::instrument(skip(self, access, input), fields(station = %access.station()))]
    pub async fn update_pump(
        &self,
        access: &StationAccess,
        input: PumpUpdate,
    ) -> Result<PumpView, DomainError> {
        let pump_id = present("pumpId", input.pump_id)?;
        let changes = input.validate()?;
        let station = access.station();
        let changes = &changes;

        retry_on_conflict("update_pump", move || {
            self.try_update_pump(station, pump_id, changes)
        })
        .await
    }

    async fn try_update_pump(
        &self,
        station: StationId,
        pump_id: PumpId,
        changes: &PumpChanges,
    ) -> Result<PumpView, DomainError> {
        let mut bank = self.bank_with_pump(station, pump_id).await?;
        let tank_id = bank.record.tank_id;
        let pump = bank
            .record
            .pump_mut(pump_id)
            .ok_or_else(|| DomainError::not_found("Pump", pump_id))?;

        if let Some(price) = changes.price_per_ltr {
            pump.price_per_ltr = price;
        }
        if let Some(status) = changes.status {
            pump.status = status;
        }
        if let Some(date) = changes.last_maintenance {
            pump.last_maintenance = Some(date);
        }
        if let Some(date) = changes.start_date {
            pump.start_date = date;
        }
        if let Some(sales) = &changes.daily_ltr_sales {
            let default_price = pump.price_per_ltr;
            pump.daily_ltr_sales = sales.iter().map(|s| s.resolve(default_price)).collect();
        }

        let updated = pump.clone();
        self.repo.commit(vec![bank.replace_op()?]).await?;

        let fuel_type = self
            .inventory(station)
            .await?
            .and_then(|inv| inv.tank(tank_id).map(|t| t.fuel_type));
        Ok(PumpView::new(tank_id, fuel_type, &updated))
    }

    /// Removes a pump. Remaining pumps keep their titles.
    #[tracing::instrument(skip(self, access), fields(station = %access.station()))]
    pub async fn delete_pump(
        &self,
        access: &StationAccess,
        pump_id: Option<PumpId>,
    ) -> Result<SubPump, DomainError> {
        let pump_id = present("pumpId", pump_id)?;
        let station = access.station();

        let removed =
            retry_on_conflict("delete_pump", move || self.try_delete_pump(station, pump_id))
                .await?;
        tracing::info!(%pump_id, title = %removed.title, "pump deleted");
        Ok(removed)
    }

    async fn try_delete_pump(
        &self,
        station: StationId,
        pump_id: PumpId,
    ) -> Result<SubPump, DomainError> {
        let mut bank = self.bank_with_pump(station, pump_id).await?;
        let removed = bank
            .record
            .remove(pump_id)
            .ok_or_else(|| DomainError::not_found("Pump", pump_id))?;
        self.repo.commit(vec![bank.replace_op()?]).await?;
        Ok(removed)
    }

    /// Sets the price of every pump on every tank of the given fuel types.
    ///
    /// The whole table is validated first, and every changed pump bank is
    /// written in one commit.
    #[tracing::instrument(skip(self, access, input), fields(station = %access.station()))]
    pub async fn update_prices(
        &self,
        access: &StationAccess,
        input: PriceUpdate,
    ) -> Result<Vec<FuelPriceUpdate>, DomainError> {
        let raw = present("prices", input.prices)?;
        let table = PriceTable::parse(&raw)?;
        let station = access.station();
        let table = &table;

        let updates = retry_on_conflict("update_prices", move || {
            self.try_update_prices(station, table)
        })
        .await?;

        for update in &updates {
            metrics::counter!("pump_prices_updated_total", "fuel_type" => update.fuel_type.as_str())
                .increment(update.updated_pumps as u64);
            tracing::info!(
                fuel_type = %update.fuel_type,
                price = %update.price_per_ltr,
                tanks = update.matched_tanks,
                pumps = update.updated_pumps,
                "fuel price propagated"
            );
        }
        Ok(updates)
    }

    async fn try_update_prices(
        &self,
        station: StationId,
        table: &PriceTable,
    ) -> Result<Vec<FuelPriceUpdate>, DomainError> {
        let inventory = self
            .inventory(station)
            .await?
            .unwrap_or_else(|| TankInventory::new(station));
        let mut banks = self.repo.find::<PumpBank>(Self::banks_of(station)).await?;

        let mut records: Vec<PumpBank> = banks.iter().map(|b| b.record.clone()).collect();
        let (updates, touched) = propagate_prices(table, &inventory, &mut records);

        let mut ops = Vec::with_capacity(touched.len());
        for (bank, record) in banks.iter_mut().zip(records) {
            if touched.contains(&record.tank_id) {
                bank.record = record;
                ops.push(bank.replace_op()?);
            }
        }
        if !ops.is_empty() {
            self.repo.commit(ops).await?;
        }
        Ok(updates)
    }

    /// Aggregates the station's daily sales, optionally within a date range.
    #[tracing::instrument(skip(self, access), fields(station = %access.station()))]
    pub async fn sales_report(
        &self,
        access: &StationAccess,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<SalesReport, DomainError> {
        let range = DateRange::parse(from, to)?;
        let station = access.station();
        let inventory = self.inventory(station).await?;
        let banks: Vec<PumpBank> = self
            .repo
            .find::<PumpBank>(Self::banks_of(station))
            .await?
            .into_iter()
            .map(|v| v.record)
            .collect();

        Ok(SalesReport::compute(inventory.as_ref(), &banks, range))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use document_store::InMemoryDocumentStore;
    use serde_json::json;

    use super::*;
    use crate::ids::StaffId;
    use crate::notifier::InMemoryNotifier;
    use crate::tank::{NewTank, TankService};

    struct Fixture {
        pumps: PumpService<InMemoryDocumentStore>,
        tanks: TankService<InMemoryDocumentStore>,
        access: StationAccess,
    }

    fn setup() -> Fixture {
        let store = InMemoryDocumentStore::new();
        Fixture {
            pumps: PumpService::new(store.clone()),
            tanks: TankService::new(store, Arc::new(InMemoryNotifier::new())),
            access: StationAccess::manager(StaffId::new(), StationId::new()),
        }
    }

    async fn add_tank(fx: &Fixture, title: &str, fuel: &str) -> TankId {
        let inventory = fx
            .tanks
            .add_tank(
                &fx.access,
                NewTank {
                    title: Some(title.into()),
                    fuel_type: Some(fuel.into()),
                    limit: Some(10000.0),
                    threshold: Some(100.0),
                },
            )
            .await
            .unwrap();
        inventory.tanks.last().unwrap().id
    }

    fn new_pump(tank_id: TankId, price: f64) -> NewPump {
        NewPump {
            tank_id: Some(tank_id),
            price_per_ltr: Some(price),
            start_date: Some("2024-01-01".into()),
            title: None,
        }
    }

    #[tokio::test]
    async fn add_pump_auto_titles_and_creates_bank() {
        let fx = setup();
        let tank = add_tank(&fx, "Tank A", "Petrol").await;

        let first = fx.pumps.add_pump(&fx.access, new_pump(tank, 700.0)).await.unwrap();
        let second = fx.pumps.add_pump(&fx.access, new_pump(tank, 700.0)).await.unwrap();
        assert_eq!(first.pump.title, "Pump 1");
        assert_eq!(second.pump.title, "Pump 2");
        assert_eq!(second.pump.status, PumpStatus::Idle);

        let listed = fx.pumps.list_pumps(&fx.access).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].fuel_type, Some(FuelType::Petrol));
    }

    #[tokio::test]
    async fn add_pump_to_unknown_tank_is_not_found() {
        let fx = setup();
        add_tank(&fx, "Tank A", "Petrol").await;

        let err = fx
            .pumps
            .add_pump(&fx.access, new_pump(TankId::new(), 700.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let err = fx
            .pumps
            .add_pump(&fx.access, NewPump::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(ValidationError::Multiple(_))));
    }

    #[tokio::test]
    async fn list_pumps_without_any_is_not_found() {
        let fx = setup();
        let err = fx.pumps.list_pumps(&fx.access).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn update_pump_replaces_daily_sales() {
        let fx = setup();
        let tank = add_tank(&fx, "Tank A", "Petrol").await;
        let pump_id = fx
            .pumps
            .add_pump(&fx.access, new_pump(tank, 700.0))
            .await
            .unwrap()
            .pump
            .id;

        let view = fx
            .pumps
            .update_pump(
                &fx.access,
                PumpUpdate {
                    pump_id: Some(pump_id),
                    price_per_ltr: Some(750.0),
                    status: Some("active".into()),
                    daily_ltr_sales: Some(vec![
                        DailySaleInput {
                            date: Some("2024-05-01".into()),
                            ltr_sale: Some(120.0),
                            price_per_ltr: Some(700.0),
                        },
                        DailySaleInput {
                            date: Some("2024-05-02T08:00:00Z".into()),
                            ltr_sale: Some(80.0),
                            price_per_ltr: None,
                        },
                    ]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(view.status, PumpStatus::Active);
        assert_eq!(view.daily_ltr_sales.len(), 2);
        assert_eq!(view.daily_ltr_sales[0].price_per_ltr.value(), 700.0);
        assert_eq!(view.daily_ltr_sales[1].price_per_ltr.value(), 750.0);
    }

    #[tokio::test]
    async fn invalid_sale_entry_rejects_whole_update() {
        let fx = setup();
        let tank = add_tank(&fx, "Tank A", "Petrol").await;
        let pump_id = fx
            .pumps
            .add_pump(&fx.access, new_pump(tank, 700.0))
            .await
            .unwrap()
            .pump
            .id;

        let err = fx
            .pumps
            .update_pump(
                &fx.access,
                PumpUpdate {
                    pump_id: Some(pump_id),
                    price_per_ltr: Some(900.0),
                    daily_ltr_sales: Some(vec![
                        DailySaleInput {
                            date: Some("2024-05-01".into()),
                            ltr_sale: Some(10.0),
                            price_per_ltr: None,
                        },
                        DailySaleInput {
                            date: Some("yesterday".into()),
                            ltr_sale: Some(10.0),
                            price_per_ltr: None,
                        },
                    ]),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Pump(PumpError::InvalidSale { index: 1, .. })
        ));

        let listed = fx.pumps.list_pumps(&fx.access).await.unwrap();
        assert_eq!(listed[0].price_per_ltr.value(), 700.0);
        assert!(listed[0].daily_ltr_sales.is_empty());
    }

    #[tokio::test]
    async fn delete_pump_keeps_other_titles() {
        let fx = setup();
        let tank = add_tank(&fx, "Tank A", "Petrol").await;
        let first = fx.pumps.add_pump(&fx.access, new_pump(tank, 1.0)).await.unwrap();
        fx.pumps.add_pump(&fx.access, new_pump(tank, 1.0)).await.unwrap();

        fx.pumps
            .delete_pump(&fx.access, Some(first.pump.id))
            .await
            .unwrap();
        let listed = fx.pumps.list_pumps(&fx.access).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Pump 2");

        let err = fx
            .pumps
            .delete_pump(&fx.access, Some(first.pump.id))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn update_prices_touches_only_matching_fuel() {
        let fx = setup();
        let petrol = add_tank(&fx, "Tank A", "Petrol").await;
        let diesel = add_tank(&fx, "Tank B", "Diesel").await;
        fx.pumps.add_pump(&fx.access, new_pump(petrol, 700.0)).await.unwrap();
        fx.pumps.add_pump(&fx.access, new_pump(petrol, 710.0)).await.unwrap();
        fx.pumps.add_pump(&fx.access, new_pump(diesel, 900.0)).await.unwrap();

        let updates = fx
            .pumps
            .update_prices(
                &fx.access,
                PriceUpdate {
                    prices: json!({"petrol": 850}).as_object().cloned(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].updated_pumps, 2);

        let listed = fx.pumps.list_pumps(&fx.access).await.unwrap();
        for pump in listed {
            let expected = if pump.tank_id == petrol { 850.0 } else { 900.0 };
            assert_eq!(pump.price_per_ltr.value(), expected);
        }
    }

    #[tokio::test]
    async fn update_prices_rejects_bad_tables() {
        let fx = setup();
        let err = fx
            .pumps
            .update_prices(&fx.access, PriceUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = fx
            .pumps
            .update_prices(
                &fx.access,
                PriceUpdate {
                    prices: json!({"Jet A1": 850}).as_object().cloned(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationError::UnknownFuelType(_))
        ));
    }

    #[tokio::test]
    async fn sales_report_sums_entries() {
        let fx = setup();
        let tank = add_tank(&fx, "Tank A", "Diesel").await;
        let pump_id = fx
            .pumps
            .add_pump(&fx.access, new_pump(tank, 1000.0))
            .await
            .unwrap()
            .pump
            .id;
        fx.pumps
            .update_pump(
                &fx.access,
                PumpUpdate {
                    pump_id: Some(pump_id),
                    daily_ltr_sales: Some(vec![
                        DailySaleInput {
                            date: Some("2024-05-01".into()),
                            ltr_sale: Some(10.0),
                            price_per_ltr: None,
                        },
                        DailySaleInput {
                            date: Some("2024-06-01".into()),
                            ltr_sale: Some(5.0),
                            price_per_ltr: Some(1200.0),
                        },
                    ]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let report = fx.pumps.sales_report(&fx.access, None, None).await.unwrap();
        assert_eq!(report.total_liters, 15.0);
        assert_eq!(report.total_revenue, 16000.0);
        assert_eq!(report.fuel_types[0].fuel_type, FuelType::Diesel);

        let report = fx
            .pumps
            .sales_report(&fx.access, Some("2024-05-01"), Some("2024-05-31"))
            .await
            .unwrap();
        assert_eq!(report.total_liters, 10.0);

        let err = fx
            .pumps
            .sales_report(&fx.access, Some("bad"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
