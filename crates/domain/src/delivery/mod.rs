//! Fuel deliveries and their effect on tank quantities.

mod model;
mod service;
mod state;

pub use model::Delivery;
pub use service::{DeliveryService, DeliveryUpdate, DeliveryView, NewDelivery};
pub use state::{DeliveryStatus, Transition};

use thiserror::Error;

/// Errors that can occur in delivery operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The delivery is already in a terminal state.
    #[error("Cannot change a {from} delivery to {to}")]
    InvalidTransition {
        from: DeliveryStatus,
        to: DeliveryStatus,
    },

    /// Completed deliveries are part of the tank's history.
    #[error("Cannot delete a completed supply record")]
    CompletedNotDeletable,
}
