//! Pumps: per-tank pump banks, price propagation and sales reporting.

mod model;
mod pricing;
mod report;
mod service;

pub use model::{DailySale, PumpBank, PumpStatus, SubPump, next_pump_title};
pub use pricing::{FuelPriceUpdate, PriceTable, propagate_prices};
pub use report::{DateRange, FuelSales, PumpSales, SalesReport};
pub use service::{
    AddedPump, DailySaleInput, NewPump, PriceUpdate, PumpService, PumpUpdate, PumpView,
};

use thiserror::Error;

use crate::error::ValidationError;

/// Errors that can occur in pump operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PumpError {
    /// A daily sale entry was rejected; nothing was stored.
    #[error("Invalid daily sale entry #{index}: {source}")]
    InvalidSale {
        index: usize,
        source: ValidationError,
    },
}
