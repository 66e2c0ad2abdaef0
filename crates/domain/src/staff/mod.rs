//! Staff accounts, credentials and password resets.

mod model;
mod password;
mod reset;
mod service;

pub use model::{NewStaff, NotificationPreferences, Staff, StaffDetails, StaffProfile, StaffUpdate};
pub use password::{DEFAULT_COST, PasswordHasher};
pub use reset::{DEFAULT_RESET_TTL_MINUTES, PasswordReset};
pub use service::{
    ForgotPassword, LoginOutcome, LoginRequest, ResetPasswordRequest, StaffService,
    FORGOT_PASSWORD_MESSAGE,
};

use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that can occur in staff and credential operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StaffError {
    /// Unknown email or wrong password; the two are not told apart.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("A staff with this email already exists")]
    DuplicateEmail { email: String },

    #[error("You cannot delete your own account")]
    SelfDelete,

    /// No unused, unexpired reset token matched.
    #[error("Invalid or expired reset token")]
    InvalidResetToken,
}

impl StaffError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StaffError::InvalidCredentials => ErrorCategory::Unauthenticated,
            StaffError::DuplicateEmail { .. } => ErrorCategory::Conflict,
            StaffError::SelfDelete | StaffError::InvalidResetToken => ErrorCategory::Validation,
        }
    }
}
