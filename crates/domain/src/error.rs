//! Domain error types.

use document_store::DocumentStoreError;
use thiserror::Error;

use crate::delivery::DeliveryError;
use crate::notifier::NotifierError;
use crate::pump::PumpError;
use crate::staff::StaffError;
use crate::station::StationError;
use crate::tank::TankError;

/// Coarse classification of a failure, used by the HTTP layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Credentials are missing or wrong.
    Unauthenticated,
    /// The actor may not perform the operation.
    Forbidden,
    /// The input was rejected before anything was persisted.
    Validation,
    /// The addressed record does not exist (or is not visible to the actor).
    NotFound,
    /// The operation would break a quantity invariant of a tank.
    Unprocessable,
    /// Duplicate key, terminal-state violation or lost optimistic race.
    Conflict,
    /// Unexpected persistence or infrastructure failure.
    Internal,
}

/// Input that was rejected before any persistence took place.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be a non-negative number, got {value}")]
    InvalidNumber { field: String, value: String },

    #[error("{field} must be a valid date, got {value:?}")]
    InvalidDate { field: String, value: String },

    #[error("{field} must be a valid email address")]
    InvalidEmail { field: String },

    #[error(
        "Password must be at least 8 characters long and include uppercase, lowercase, number, and special character"
    )]
    WeakPassword,

    #[error("Unknown fuel type: {0}")]
    UnknownFuelType(String),

    #[error("Invalid {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("{0}")]
    Other(String),

    #[error("{}", join_messages(.0))]
    Multiple(Vec<ValidationError>),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        Self::Required {
            field: field.into(),
        }
    }

    pub fn invalid_number(field: impl Into<String>, value: f64) -> Self {
        Self::InvalidNumber {
            field: field.into(),
            value: value.to_string(),
        }
    }

    pub fn invalid_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Folds a non-empty list of problems into one error.
    pub fn from_errors(mut errors: Vec<ValidationError>) -> Self {
        if errors.len() == 1 {
            errors.remove(0)
        } else {
            Self::Multiple(errors)
        }
    }

    /// Collapses a list of problems into one error, or `Ok` when empty.
    pub fn collect(errors: Vec<ValidationError>) -> Result<(), ValidationError> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self::from_errors(errors))
        }
    }
}

/// The actor's capability does not cover the requested operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("You are not authorized to perform this action")]
    NoStation,

    #[error("Only managers can perform this action")]
    NotManager,

    #[error("You do not have access to this filling station")]
    OtherStation,
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the document store.
    #[error("Document store error: {0}")]
    Store(#[from] DocumentStoreError),

    #[error(transparent)]
    Tank(#[from] TankError),

    #[error(transparent)]
    Pump(#[from] PumpError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Station(#[from] StationError),

    #[error(transparent)]
    Staff(#[from] StaffError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Notification error: {0}")]
    Notification(#[from] NotifierError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Password or token hashing failed.
    #[error("Hashing error: {0}")]
    Hashing(String),
}

impl DomainError {
    /// Creates a not-found error for an entity.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns true if the failure was a lost optimistic-concurrency race.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            DomainError::Store(
                DocumentStoreError::ConcurrencyConflict { .. }
                    | DocumentStoreError::AlreadyExists { .. }
            )
        )
    }

    /// Classifies the error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            DomainError::Store(err) => match err {
                DocumentStoreError::ConcurrencyConflict { .. }
                | DocumentStoreError::AlreadyExists { .. } => ErrorCategory::Conflict,
                DocumentStoreError::NotFound { .. } => ErrorCategory::NotFound,
                _ => ErrorCategory::Internal,
            },
            DomainError::Tank(err) => err.category(),
            DomainError::Pump(_) => ErrorCategory::Validation,
            DomainError::Delivery(_) => ErrorCategory::Conflict,
            DomainError::Station(_) => ErrorCategory::Conflict,
            DomainError::Staff(err) => err.category(),
            DomainError::Access(_) => ErrorCategory::Forbidden,
            DomainError::Validation(_) => ErrorCategory::Validation,
            DomainError::NotFound { .. } => ErrorCategory::NotFound,
            DomainError::Notification(_)
            | DomainError::Serialization(_)
            | DomainError::Hashing(_) => ErrorCategory::Internal,
        }
    }
}
