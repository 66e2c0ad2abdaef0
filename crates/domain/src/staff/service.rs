//! Staff service: login, staff management and password resets.

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::Uuid;
use document_store::DocumentStore;
use serde::Deserialize;

use crate::actor::StationAccess;
use crate::error::{DomainError, ValidationError};
use crate::ids::{StaffId, StationId};
use crate::notifier::{Notification, Notifier};
use crate::record::{Record, Repository, Versioned, retry_on_conflict};
use crate::station::Station;
use crate::validation::{check_password, email, required};

use super::model::StaffChanges;
use super::{
    DEFAULT_RESET_TTL_MINUTES, NewStaff, PasswordHasher, PasswordReset, Staff, StaffError,
    StaffProfile, StaffUpdate,
};

/// The answer to every forgot-password request, whether or not the email exists.
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, a password reset token has been sent";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A successful login: the account and its station.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub staff: StaffProfile,
    pub station: Option<Versioned<Station>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForgotPassword {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: Option<String>,
    pub token: Option<String>,
    pub new_password: Option<String>,
}

/// Service for staff accounts and credentials.
pub struct StaffService<S: DocumentStore> {
    repo: Repository<S>,
    hasher: PasswordHasher,
    notifier: Arc<dyn Notifier>,
    reset_ttl: Duration,
}

impl<S: DocumentStore> StaffService<S> {
    /// Creates a new staff service.
    pub fn new(store: S, hasher: PasswordHasher, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repo: Repository::new(store),
            hasher,
            notifier,
            reset_ttl: Duration::minutes(DEFAULT_RESET_TTL_MINUTES),
        }
    }

    /// Sets how long reset tokens stay valid.
    pub fn with_reset_ttl(mut self, ttl: Duration) -> Self {
        self.reset_ttl = ttl;
        self
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Versioned<Staff>>, DomainError> {
        self.repo
            .find_one::<Staff>(Staff::query().field_eq("email", email.trim().to_lowercase()))
            .await
    }

    /// Loads a staff member of the caller's station. Others read as missing.
    async fn load_member(
        &self,
        station: StationId,
        staff_id: StaffId,
    ) -> Result<Versioned<Staff>, DomainError> {
        self.repo
            .load::<Staff>(staff_id)
            .await?
            .filter(|s| s.record.details.station == Some(station))
            .ok_or_else(|| DomainError::not_found("Staff", staff_id))
    }

    async fn load_station(&self, station: StationId) -> Result<Versioned<Station>, DomainError> {
        self.repo
            .load::<Station>(station)
            .await?
            .ok_or_else(|| DomainError::not_found("Station", station))
    }

    /// Checks an email and password.
    ///
    /// An unknown email and a wrong password fail the same way.
    #[tracing::instrument(skip(self, input))]
    pub async fn authenticate(&self, input: LoginRequest) -> Result<LoginOutcome, DomainError> {
        let email = required("email", input.email.as_deref())?;
        let password = required("password", input.password.as_deref())?;

        let found = self.find_by_email(&email).await?;
        let verified = match &found {
            Some(staff) => {
                self.hasher
                    .verify(&password, &staff.record.password_hash)
                    .await?
            }
            None => false,
        };
        let staff = match found {
            Some(staff) if verified => staff,
            _ => {
                metrics::counter!("login_failures_total").increment(1);
                tracing::warn!("login failed");
                return Err(StaffError::InvalidCredentials.into());
            }
        };

        let station = match staff.record.details.station {
            Some(id) => self.repo.load::<Station>(id).await?,
            None => None,
        };
        metrics::counter!("logins_total", "role" => staff.record.details.role.as_str())
            .increment(1);
        tracing::info!(staff_id = %staff.record.id, role = %staff.record.details.role, "login succeeded");

        Ok(LoginOutcome {
            staff: staff.into(),
            station,
        })
    }

    /// Creates a staff account in the caller's station.
    #[tracing::instrument(skip(self, access, input), fields(station = %access.station()))]
    pub async fn create_staff(
        &self,
        access: &StationAccess,
        input: NewStaff,
    ) -> Result<StaffProfile, DomainError> {
        let (details, password) = input.validate(access.station())?;
        if self.find_by_email(&details.email).await?.is_some() {
            return Err(StaffError::DuplicateEmail {
                email: details.email,
            }
            .into());
        }

        let staff = Staff {
            id: StaffId::new(),
            details,
            password_hash: self.hasher.hash(&password).await?,
        };
        let station = access.station();
        let staff = &staff;

        retry_on_conflict("create_staff", move || self.try_enlist(station, staff)).await?;
        tracing::info!(staff_id = %staff.id, role = %staff.details.role, "staff created");
        Ok(Versioned::inserted(staff.clone()).into())
    }

    async fn try_enlist(&self, station: StationId, staff: &Staff) -> Result<(), DomainError> {
        let mut current = self.load_station(station).await?;
        current.record.enlist(staff.id);
        self.repo
            .commit(vec![staff.insert_op()?, current.replace_op()?])
            .await
    }

    /// Lists the caller's station staff.
    #[tracing::instrument(skip(self, access), fields(station = %access.station()))]
    pub async fn list_staff(&self, access: &StationAccess) -> Result<Vec<StaffProfile>, DomainError> {
        Ok(self
            .repo
            .find::<Staff>(Staff::query().field_eq("station", access.station().to_string()))
            .await?
            .into_iter()
            .map(StaffProfile::from)
            .collect())
    }

    /// Edits a staff member of the caller's station. A new password is re-hashed.
    #[tracing::instrument(skip(self, access, input), fields(station = %access.station()))]
    pub async fn update_staff(
        &self,
        access: &StationAccess,
        staff_id: StaffId,
        input: StaffUpdate,
    ) -> Result<StaffProfile, DomainError> {
        let mut changes = input.validate()?;
        let station = access.station();
        self.load_member(station, staff_id).await?;

        if let Some(email) = &changes.email
            && let Some(other) = self.find_by_email(email).await?
            && other.record.id != staff_id
        {
            return Err(StaffError::DuplicateEmail {
                email: email.clone(),
            }
            .into());
        }
        let password_hash = match changes.password.take() {
            Some(password) => Some(self.hasher.hash(&password).await?),
            None => None,
        };

        let (input, changes, password_hash) = (&input, &changes, &password_hash);
        let updated = retry_on_conflict("update_staff", move || {
            self.try_update_staff(station, staff_id, input, changes, password_hash.clone())
        })
        .await?;
        tracing::info!(%staff_id, "staff updated");
        Ok(updated.into())
    }

    async fn try_update_staff(
        &self,
        station: StationId,
        staff_id: StaffId,
        input: &StaffUpdate,
        changes: &StaffChanges,
        password_hash: Option<String>,
    ) -> Result<Versioned<Staff>, DomainError> {
        let mut current = self.load_member(station, staff_id).await?;
        input.apply(changes, &mut current.record.details);
        if let Some(hash) = password_hash {
            current.record.password_hash = hash;
        }
        self.repo.commit(vec![current.replace_op()?]).await?;
        Ok(current.committed())
    }

    /// Deletes a staff member of the caller's station and their reset tokens.
    #[tracing::instrument(skip(self, access), fields(station = %access.station()))]
    pub async fn delete_staff(
        &self,
        access: &StationAccess,
        staff_id: StaffId,
    ) -> Result<(), DomainError> {
        if staff_id == access.staff_id() {
            return Err(StaffError::SelfDelete.into());
        }
        let station = access.station();

        retry_on_conflict("delete_staff", move || self.try_delete_staff(station, staff_id))
            .await?;
        tracing::info!(%staff_id, "staff deleted");
        Ok(())
    }

    async fn try_delete_staff(&self, station: StationId, staff_id: StaffId) -> Result<(), DomainError> {
        let staff = self.load_member(station, staff_id).await?;
        let mut ops = vec![staff.delete_op()];

        if let Some(mut current) = self.repo.load::<Station>(station).await? {
            current.record.discharge(staff_id);
            ops.push(current.replace_op()?);
        }
        let resets = self
            .repo
            .find::<PasswordReset>(PasswordReset::query().field_eq("staffId", staff_id.to_string()))
            .await?;
        ops.extend(resets.iter().map(Versioned::delete_op));

        self.repo.commit(ops).await
    }

    /// Starts a password reset.
    ///
    /// Returns normally whether or not the email belongs to an account; when
    /// it does, a one-time token is stored hashed and sent in plaintext.
    #[tracing::instrument(skip(self, input))]
    pub async fn forgot_password(&self, input: ForgotPassword) -> Result<(), DomainError> {
        let email = email("email", input.email.as_deref())?;
        let Some(staff) = self.find_by_email(&email).await? else {
            tracing::info!("password reset requested for unknown email");
            return Ok(());
        };

        let token = Uuid::new_v4().simple().to_string();
        let expires_at = Utc::now() + self.reset_ttl;
        let reset = PasswordReset::new(staff.record.id, self.hasher.hash(&token).await?, expires_at);
        self.repo.commit(vec![reset.insert_op()?]).await?;

        self.notifier
            .send(Notification::PasswordReset {
                email: staff.record.details.email.clone(),
                token,
                expires_at,
            })
            .await?;
        tracing::info!(staff_id = %staff.record.id, "password reset token issued");
        Ok(())
    }

    /// Completes a password reset with a token from [`Self::forgot_password`].
    ///
    /// The newest unused, unexpired matching token is consumed in the same
    /// commit that replaces the password.
    #[tracing::instrument(skip(self, input))]
    pub async fn reset_password(&self, input: ResetPasswordRequest) -> Result<(), DomainError> {
        let email = email("email", input.email.as_deref());
        let token = required("token", input.token.as_deref());
        let password = required("newPassword", input.new_password.as_deref())
            .and_then(|p| check_password(&p).map(|()| p));
        let (email, token, password) = match (email, token, password) {
            (Ok(e), Ok(t), Ok(p)) => (e, t, p),
            (e, t, p) => {
                return Err(ValidationError::from_errors(
                    [e.err(), t.err(), p.err()].into_iter().flatten().collect(),
                )
                .into());
            }
        };

        let staff = self
            .find_by_email(&email)
            .await?
            .ok_or(StaffError::InvalidResetToken)?;
        let reset = self.matching_reset(staff.record.id, &token).await?;
        let password_hash = self.hasher.hash(&password).await?;

        let mut staff = staff;
        let mut reset = reset;
        staff.record.password_hash = password_hash;
        reset.record.used = true;
        self.repo
            .commit(vec![staff.replace_op()?, reset.replace_op()?])
            .await?;
        tracing::info!(staff_id = %staff.record.id, "password reset");
        Ok(())
    }

    async fn matching_reset(
        &self,
        staff_id: StaffId,
        token: &str,
    ) -> Result<Versioned<PasswordReset>, DomainError> {
        let now = Utc::now();
        let mut candidates: Vec<_> = self
            .repo
            .find::<PasswordReset>(PasswordReset::query().field_eq("staffId", staff_id.to_string()))
            .await?
            .into_iter()
            .filter(|r| r.record.is_usable(now))
            .collect();
        candidates.sort_by(|a, b| b.record.expires_at.cmp(&a.record.expires_at));

        for candidate in candidates {
            if self.hasher.verify(token, &candidate.record.token_hash).await? {
                return Ok(candidate);
            }
        }
        Err(StaffError::InvalidResetToken.into())
    }
}
