//! Integration tests for tank/pump/delivery reconciliation.
//!
//! These tests drive the services together against one in-memory store and
//! check the invariants that span records: tank capacity under concurrent
//! deliveries, single application of a completion, and fuel-type price
//! propagation.

use std::sync::Arc;

use document_store::InMemoryDocumentStore;
use domain::{
    DeliveryService, DeliveryStatus, DeliveryUpdate, DomainError, ErrorCategory, InMemoryNotifier,
    NewDelivery, NewPump, NewTank, PriceUpdate, PumpService, StaffId, StationAccess, StationId,
    TankId, TankService, TankUpdate,
};
use serde_json::json;

struct Station {
    tanks: TankService<InMemoryDocumentStore>,
    pumps: PumpService<InMemoryDocumentStore>,
    deliveries: Arc<DeliveryService<InMemoryDocumentStore>>,
    access: StationAccess,
}

fn station() -> Station {
    let store = InMemoryDocumentStore::new();
    Station {
        tanks: TankService::new(store.clone(), Arc::new(InMemoryNotifier::new())),
        pumps: PumpService::new(store.clone()),
        deliveries: Arc::new(DeliveryService::new(store)),
        access: StationAccess::manager(StaffId::new(), StationId::new()),
    }
}

async fn add_tank(station: &Station, title: &str, fuel: &str, limit: f64, current: f64) -> TankId {
    let inventory = station
        .tanks
        .add_tank(
            &station.access,
            NewTank {
                title: Some(title.into()),
                fuel_type: Some(fuel.into()),
                limit: Some(limit),
                threshold: Some(0.0),
            },
        )
        .await
        .unwrap();
    let tank_id = inventory.tanks.last().unwrap().id;
    if current > 0.0 {
        station
            .tanks
            .update_tank(
                &station.access,
                TankUpdate {
                    tank_id: Some(tank_id),
                    current_quantity: Some(current),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }
    tank_id
}

async fn quantity(station: &Station, tank_id: TankId) -> f64 {
    station
        .tanks
        .list_tanks(&station.access)
        .await
        .unwrap()
        .tanks
        .into_iter()
        .find(|t| t.id == tank_id)
        .unwrap()
        .current_quantity
        .value()
}

fn delivery(tank_id: TankId, quantity: f64, status: Option<&str>) -> NewDelivery {
    NewDelivery {
        tank: Some(tank_id),
        price_per_ltr: Some(800.0),
        quantity: Some(quantity),
        supplier: Some("Depot".into()),
        delivery_date: Some("2024-05-01T09:00:00Z".into()),
        status: status.map(str::to_string),
    }
}

mod capacity {
    use super::*;

    #[tokio::test]
    async fn worked_example() {
        let station = station();
        let tank = add_tank(&station, "Tank A", "Petrol", 10000.0, 9000.0).await;

        station
            .deliveries
            .add_delivery(&station.access, delivery(tank, 500.0, Some("Completed")))
            .await
            .unwrap();
        assert_eq!(quantity(&station, tank).await, 9500.0);

        let err = station
            .deliveries
            .add_delivery(&station.access, delivery(tank, 1500.0, Some("Completed")))
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Unprocessable);
        assert_eq!(quantity(&station, tank).await, 9500.0);
    }

    #[tokio::test]
    async fn concurrent_completions_never_overfill() {
        let station = station();
        let tank = add_tank(&station, "Tank A", "Diesel", 10000.0, 9000.0).await;

        let mut pending = Vec::new();
        for _ in 0..8 {
            let created = station
                .deliveries
                .add_delivery(&station.access, delivery(tank, 300.0, None))
                .await
                .unwrap();
            pending.push(created.record.id);
        }

        let handles: Vec<_> = pending
            .into_iter()
            .map(|id| {
                let deliveries = station.deliveries.clone();
                let access = station.access;
                tokio::spawn(async move {
                    deliveries
                        .update_delivery(
                            &access,
                            DeliveryUpdate {
                                supply_id: Some(id),
                                status: Some("Completed".into()),
                                ..Default::default()
                            },
                        )
                        .await
                })
            })
            .collect();

        let mut completed = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => completed += 1,
                Err(err) => assert!(
                    matches!(
                        err.category(),
                        ErrorCategory::Unprocessable | ErrorCategory::Conflict
                    ),
                    "unexpected error: {err}"
                ),
            }
        }

        assert!(completed <= 3);
        let current = quantity(&station, tank).await;
        assert_eq!(current, 9000.0 + 300.0 * completed as f64);
        assert!(current <= 10000.0);
    }

    #[tokio::test]
    async fn racing_duplicate_completion_applies_once() {
        let station = station();
        let tank = add_tank(&station, "Tank A", "Petrol", 10000.0, 0.0).await;
        let id = station
            .deliveries
            .add_delivery(&station.access, delivery(tank, 1000.0, None))
            .await
            .unwrap()
            .record
            .id;

        let complete = || DeliveryUpdate {
            supply_id: Some(id),
            status: Some("completed".into()),
            ..Default::default()
        };
        let (a, b) = tokio::join!(
            station.deliveries.update_delivery(&station.access, complete()),
            station.deliveries.update_delivery(&station.access, complete()),
        );

        // The loser either retries into a no-op or reports the conflict
        for result in [a, b] {
            if let Err(err) = result {
                assert!(matches!(err, DomainError::Store(_)), "unexpected error: {err}");
            }
        }
        assert_eq!(quantity(&station, tank).await, 1000.0);
    }

    #[tokio::test]
    async fn quantity_stays_within_bounds_across_operations() {
        let station = station();
        let tank = add_tank(&station, "Tank A", "Kerosene", 2000.0, 0.0).await;

        let steps: [(f64, bool); 5] = [
            (1500.0, true),
            (600.0, false),
            (-1600.0, false),
            (-1500.0, true),
            (2000.0, true),
        ];
        for (delta, accepted) in steps {
            let result = station
                .tanks
                .update_tank(
                    &station.access,
                    TankUpdate {
                        tank_id: Some(tank),
                        current_quantity: Some(delta),
                        ..Default::default()
                    },
                )
                .await;
            assert_eq!(result.is_ok(), accepted, "delta {delta}");

            let current = quantity(&station, tank).await;
            assert!((0.0..=2000.0).contains(&current));
        }
        assert_eq!(quantity(&station, tank).await, 2000.0);
    }
}

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn pending_then_completed_then_locked() {
        let station = station();
        let tank = add_tank(&station, "Tank A", "AGO", 5000.0, 0.0).await;
        let created = station
            .deliveries
            .add_delivery(&station.access, delivery(tank, 2000.0, None))
            .await
            .unwrap();
        assert_eq!(created.record.status, DeliveryStatus::Pending);
        assert_eq!(quantity(&station, tank).await, 0.0);

        let id = created.record.id;
        station
            .deliveries
            .update_delivery(
                &station.access,
                DeliveryUpdate {
                    supply_id: Some(id),
                    status: Some("Completed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(quantity(&station, tank).await, 2000.0);

        let err = station
            .deliveries
            .update_delivery(
                &station.access,
                DeliveryUpdate {
                    supply_id: Some(id),
                    status: Some("Cancelled".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Conflict);

        let err = station
            .deliveries
            .delete_delivery(&station.access, Some(id))
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Conflict);
        assert_eq!(quantity(&station, tank).await, 2000.0);
    }
}

mod pricing {
    use super::*;

    #[tokio::test]
    async fn propagation_follows_fuel_type() {
        let station = station();
        let petrol_a = add_tank(&station, "A", "Petrol", 1000.0, 0.0).await;
        let diesel = add_tank(&station, "B", "Diesel", 1000.0, 0.0).await;
        let petrol_c = add_tank(&station, "C", "petrol", 1000.0, 0.0).await;

        for (tank, price) in [(petrol_a, 700.0), (petrol_a, 705.0), (diesel, 900.0), (petrol_c, 710.0)] {
            station
                .pumps
                .add_pump(
                    &station.access,
                    NewPump {
                        tank_id: Some(tank),
                        price_per_ltr: Some(price),
                        start_date: Some("2024-01-01".into()),
                        title: None,
                    },
                )
                .await
                .unwrap();
        }

        let updates = station
            .pumps
            .update_prices(
                &station.access,
                PriceUpdate {
                    prices: json!({"PETROL": 850}).as_object().cloned(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updates[0].matched_tanks, 2);
        assert_eq!(updates[0].matched_pump_records, 2);
        assert_eq!(updates[0].updated_pumps, 3);

        for pump in station.pumps.list_pumps(&station.access).await.unwrap() {
            if pump.tank_id == diesel {
                assert_eq!(pump.price_per_ltr.value(), 900.0);
            } else {
                assert_eq!(pump.price_per_ltr.value(), 850.0);
            }
        }
    }

    #[tokio::test]
    async fn other_stations_are_untouched() {
        let ours = station();
        let tank = add_tank(&ours, "A", "Petrol", 1000.0, 0.0).await;
        ours.pumps
            .add_pump(
                &ours.access,
                NewPump {
                    tank_id: Some(tank),
                    price_per_ltr: Some(700.0),
                    start_date: Some("2024-01-01".into()),
                    title: None,
                },
            )
            .await
            .unwrap();

        let stranger = StationAccess::manager(StaffId::new(), StationId::new());
        let updates = ours
            .pumps
            .update_prices(
                &stranger,
                PriceUpdate {
                    prices: json!({"Petrol": 1}).as_object().cloned(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updates[0].updated_pumps, 0);

        let pumps = ours.pumps.list_pumps(&ours.access).await.unwrap();
        assert_eq!(pumps[0].price_per_ltr.value(), 700.0);
    }
}
