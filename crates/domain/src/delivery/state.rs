use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

use super::DeliveryError;

/// Lifecycle state of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeliveryStatus {
    /// Ordered but not yet in the tank.
    #[default]
    Pending,
    /// Fuel is in the tank. Terminal.
    Completed,
    /// Will never arrive. Terminal.
    Cancelled,
}

/// What a requested status change amounts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The delivery already has the requested status.
    Unchanged,
    /// Pending to Completed: the tank receives the quantity.
    Complete,
    /// Pending to Cancelled.
    Cancel,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "Pending",
            DeliveryStatus::Completed => "Completed",
            DeliveryStatus::Cancelled => "Cancelled",
        }
    }

    /// Returns true if no further transitions are allowed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryStatus::Completed | DeliveryStatus::Cancelled)
    }

    /// Checks a requested status change.
    pub fn transition_to(self, next: DeliveryStatus) -> Result<Transition, DeliveryError> {
        match (self, next) {
            (from, to) if from == to => Ok(Transition::Unchanged),
            (DeliveryStatus::Pending, DeliveryStatus::Completed) => Ok(Transition::Complete),
            (DeliveryStatus::Pending, DeliveryStatus::Cancelled) => Ok(Transition::Cancel),
            (from, to) => Err(DeliveryError::InvalidTransition { from, to }),
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(DeliveryStatus::Pending),
            "completed" => Ok(DeliveryStatus::Completed),
            "cancelled" | "canceled" => Ok(DeliveryStatus::Cancelled),
            _ => Err(ValidationError::invalid_value("status", s)),
        }
    }
}
