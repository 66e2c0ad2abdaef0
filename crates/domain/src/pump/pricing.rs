//! Price propagation by fuel type.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;
use crate::fuel::FuelType;
use crate::ids::TankId;
use crate::tank::TankInventory;
use crate::values::PricePerLiter;

use super::PumpBank;

/// A validated mapping from fuel type to new price.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceTable(BTreeMap<FuelType, PricePerLiter>);

impl PriceTable {
    /// Validates a raw `{fuelType: price}` mapping as a whole.
    ///
    /// Every key must name a distinct fuel type and every value must be a
    /// non-negative number; all problems are reported together.
    pub fn parse(raw: &serde_json::Map<String, Value>) -> Result<Self, ValidationError> {
        if raw.is_empty() {
            return Err(ValidationError::Other(
                "prices must map at least one fuel type to a price".into(),
            ));
        }

        let mut table = BTreeMap::new();
        let mut errors = Vec::new();
        for (key, value) in raw {
            let fuel = key.parse::<FuelType>();
            let price = match value.as_f64() {
                Some(v) => PricePerLiter::parse(key, v),
                None => Err(ValidationError::invalid_value(key.clone(), value.to_string())),
            };
            match (fuel, price) {
                (Ok(fuel), Ok(_)) if table.contains_key(&fuel) => {
                    errors.push(ValidationError::Other(format!(
                        "fuel type {fuel} is priced more than once"
                    )));
                }
                (Ok(fuel), Ok(price)) => {
                    table.insert(fuel, price);
                }
                (fuel, price) => errors.extend(fuel.err().into_iter().chain(price.err())),
            }
        }

        ValidationError::collect(errors)?;
        Ok(Self(table))
    }

    pub fn iter(&self) -> impl Iterator<Item = (FuelType, PricePerLiter)> + '_ {
        self.0.iter().map(|(fuel, price)| (*fuel, *price))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Outcome of propagating one fuel type's price.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelPriceUpdate {
    pub fuel_type: FuelType,
    pub price_per_ltr: PricePerLiter,
    pub matched_tanks: usize,
    pub matched_pump_records: usize,
    pub updated_pumps: usize,
}

/// Applies `table` to the pump banks of `inventory`'s tanks.
///
/// Every pump of every tank whose fuel type is in the table gets the new
/// price. Returns the per-fuel-type counts and the ids of the tanks whose
/// banks were changed.
pub fn propagate_prices(
    table: &PriceTable,
    inventory: &TankInventory,
    banks: &mut [PumpBank],
) -> (Vec<FuelPriceUpdate>, HashSet<TankId>) {
    let mut touched = HashSet::new();
    let mut updates = Vec::with_capacity(table.len());

    for (fuel_type, price) in table.iter() {
        let tank_ids: HashSet<TankId> = inventory.tanks_of(fuel_type).map(|t| t.id).collect();

        let mut matched_pump_records = 0;
        let mut updated_pumps = 0;
        for bank in banks.iter_mut().filter(|b| tank_ids.contains(&b.tank_id)) {
            matched_pump_records += 1;
            updated_pumps += bank.set_price(price);
            touched.insert(bank.tank_id);
        }

        updates.push(FuelPriceUpdate {
            fuel_type,
            price_per_ltr: price,
            matched_tanks: tank_ids.len(),
            matched_pump_records,
            updated_pumps,
        });
    }

    (updates, touched)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::ids::StationId;
    use crate::pump::SubPump;
    use crate::tank::SubTank;
    use crate::values::Liters;

    fn map(value: Value) -> serde_json::Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn price(v: f64) -> PricePerLiter {
        PricePerLiter::parse("p", v).unwrap()
    }

    #[test]
    fn parse_accepts_case_insensitive_keys() {
        let table = PriceTable::parse(&map(json!({"petrol": 850, "DIESEL": 1200.5}))).unwrap();
        let entries: Vec<_> = table.iter().collect();
        assert_eq!(
            entries,
            vec![(FuelType::Petrol, price(850.0)), (FuelType::Diesel, price(1200.5))]
        );
    }

    #[test]
    fn parse_rejects_the_whole_table_on_any_problem() {
        assert!(PriceTable::parse(&map(json!({}))).is_err());

        let err = PriceTable::parse(&map(json!({
            "Petrol": 850,
            "Jet": 10,
            "Diesel": -1,
            "Gas": "cheap"
        })))
        .unwrap_err();
        match err {
            ValidationError::Multiple(errors) => assert_eq!(errors.len(), 3),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_keys_naming_the_same_fuel_type() {
        let err = PriceTable::parse(&map(json!({"petrol": 800, "Petrol": 900}))).unwrap_err();
        assert!(matches!(err, ValidationError::Other(ref msg) if msg.contains("more than once")));
    }

    #[test]
    fn propagation_only_touches_matching_fuel() {
        let station = StationId::new();
        let mut inventory = TankInventory::new(station);
        let limit = Liters::parse("l", 1000.0).unwrap();
        let a = SubTank::new("A", FuelType::Petrol, limit, Liters::zero());
        let b = SubTank::new("B", FuelType::Diesel, limit, Liters::zero());
        let c = SubTank::new("C", FuelType::Petrol, limit, Liters::zero());
        let (a_id, b_id) = (a.id, b.id);
        inventory.add(a).unwrap();
        inventory.add(b).unwrap();
        inventory.add(c).unwrap();

        let mut bank_a = PumpBank::new(a_id, station);
        bank_a.push(SubPump::new("", price(700.0), Utc::now()));
        bank_a.push(SubPump::new("", price(710.0), Utc::now()));
        let mut bank_b = PumpBank::new(b_id, station);
        bank_b.push(SubPump::new("", price(900.0), Utc::now()));
        let mut banks = vec![bank_a, bank_b];

        let table = PriceTable::parse(&map(json!({"Petrol": 850}))).unwrap();
        let (updates, touched) = propagate_prices(&table, &inventory, &mut banks);

        assert_eq!(
            updates,
            vec![FuelPriceUpdate {
                fuel_type: FuelType::Petrol,
                price_per_ltr: price(850.0),
                matched_tanks: 2,
                matched_pump_records: 1,
                updated_pumps: 2,
            }]
        );
        assert_eq!(touched.len(), 1);
        assert!(banks[0].pumps.iter().all(|p| p.price_per_ltr == price(850.0)));
        assert_eq!(banks[1].pumps[0].price_per_ltr, price(900.0));
    }
}
