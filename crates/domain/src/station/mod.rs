//! Filling stations: registration, profile and removal.

mod model;
mod registration;
mod service;

pub use model::Station;
pub use registration::RegistrationForm;
pub use service::{Registration, StationDetails, StationService, StationUpdate};

use thiserror::Error;

/// Errors that can occur in station operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StationError {
    #[error("A filling station with license number {license_number} already exists")]
    DuplicateLicense { license_number: String },
}
