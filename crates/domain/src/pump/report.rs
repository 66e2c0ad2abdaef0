//! Sales aggregation over daily pump entries.
//!
//! Reports are always recomputed from the raw daily entries; nothing here
//! is persisted.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dates::{parse_date, parse_end_date};
use crate::error::ValidationError;
use crate::fuel::FuelType;
use crate::ids::{PumpId, TankId};
use crate::tank::TankInventory;

use super::PumpBank;

/// Inclusive date range. Either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Parses optional `from`/`to` query values. A plain-date `to` covers that whole day.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, ValidationError> {
        let from = from
            .filter(|v| !v.trim().is_empty())
            .map(|v| parse_date("from", v))
            .transpose()?;
        let to = to
            .filter(|v| !v.trim().is_empty())
            .map(|v| parse_end_date("to", v))
            .transpose()?;

        if let (Some(from), Some(to)) = (from, to)
            && from > to
        {
            return Err(ValidationError::Other("from must not be after to".into()));
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// Sales of one pump.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpSales {
    pub pump_id: PumpId,
    pub tank_id: TankId,
    pub title: String,
    pub fuel_type: Option<FuelType>,
    pub liters: f64,
    pub revenue: f64,
}

/// Sales of one fuel type across all pumps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelSales {
    pub fuel_type: FuelType,
    pub liters: f64,
    pub revenue: f64,
}

/// Station-wide sales totals with per-pump and per-fuel-type breakdowns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub range: DateRange,
    pub total_liters: f64,
    pub total_revenue: f64,
    pub pumps: Vec<PumpSales>,
    pub fuel_types: Vec<FuelSales>,
}

impl SalesReport {
    /// Sums every daily entry inside `range` over the given banks.
    pub fn compute(inventory: Option<&TankInventory>, banks: &[PumpBank], range: DateRange) -> Self {
        let mut pumps = Vec::new();
        let mut by_fuel: BTreeMap<FuelType, (f64, f64)> = BTreeMap::new();

        for bank in banks {
            let fuel_type = inventory
                .and_then(|inv| inv.tank(bank.tank_id))
                .map(|t| t.fuel_type);

            for pump in &bank.pumps {
                let (liters, revenue) = pump
                    .daily_ltr_sales
                    .iter()
                    .filter(|sale| range.contains(sale.date))
                    .fold((0.0, 0.0), |(l, r), sale| {
                        (l + sale.ltr_sale.value(), r + sale.revenue())
                    });

                if let Some(fuel) = fuel_type {
                    let entry = by_fuel.entry(fuel).or_default();
                    entry.0 += liters;
                    entry.1 += revenue;
                }

                pumps.push(PumpSales {
                    pump_id: pump.id,
                    tank_id: bank.tank_id,
                    title: pump.title.clone(),
                    fuel_type,
                    liters,
                    revenue,
                });
            }
        }

        Self {
            range,
            total_liters: pumps.iter().map(|p| p.liters).sum(),
            total_revenue: pumps.iter().map(|p| p.revenue).sum(),
            fuel_types: by_fuel
                .into_iter()
                .map(|(fuel_type, (liters, revenue))| FuelSales {
                    fuel_type,
                    liters,
                    revenue,
                })
                .collect(),
            pumps,
        }
    }
}
