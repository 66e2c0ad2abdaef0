//! Tank inventory: per-station sub-tanks and their capacity invariant.

mod capacity;
mod model;
mod service;

pub use capacity::check_capacity;
pub use model::{SubTank, TankInventory};
pub use service::{NewTank, TankListing, TankService, TankUpdate};

use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that can occur in tank operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TankError {
    /// A tank with this title already exists in the station.
    #[error("Tank \"{title}\" already exists for this station")]
    DuplicateTitle { title: String },

    /// Adding the amount would overflow the tank.
    #[error(
        "Cannot add {attempted} ltr(s). This will exceed the tank limit of {limit} ltr(s) (current {current})"
    )]
    CapacityExceeded {
        attempted: f64,
        current: f64,
        limit: f64,
    },

    /// Removing the amount would leave a negative quantity.
    #[error("Cannot remove {requested} ltr(s). The tank only holds {current} ltr(s)")]
    BelowEmpty { requested: f64, current: f64 },

    /// The new limit is lower than what the tank already holds.
    #[error("Limit {limit} ltr(s) is below the current quantity of {current} ltr(s)")]
    LimitBelowCurrent { limit: f64, current: f64 },
}

impl TankError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TankError::DuplicateTitle { .. } => ErrorCategory::Conflict,
            TankError::CapacityExceeded { .. }
            | TankError::BelowEmpty { .. }
            | TankError::LimitBelowCurrent { .. } => ErrorCategory::Unprocessable,
        }
    }
}
