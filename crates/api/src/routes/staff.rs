//! Login, password reset and staff management endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use document_store::DocumentStore;
use domain::staff::FORGOT_PASSWORD_MESSAGE;
use domain::{
    ForgotPassword, LoginRequest, NewStaff, ResetPasswordRequest, StaffId, StaffProfile,
    StaffUpdate, Station, Versioned,
};
use serde::Serialize;

use super::{ApiResult, Created, created, ok, parse_id};
use crate::auth::AuthUser;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: StaffProfile,
    pub station: Option<Versioned<Station>>,
}

/// POST /api/auth/login
#[tracing::instrument(skip(state, input))]
pub async fn login<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ApiJson(input): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let outcome = state.staff.authenticate(input).await?;
    let token = state.tokens.issue(&outcome.staff)?;
    ok(
        "Login successful",
        LoginResponse {
            token,
            user: outcome.staff,
            station: outcome.station,
        },
    )
}

/// POST /api/auth/forgot-password
#[tracing::instrument(skip(state, input))]
pub async fn forgot_password<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ApiJson(input): ApiJson<ForgotPassword>,
) -> ApiResult<()> {
    state.staff.forgot_password(input).await?;
    ok(FORGOT_PASSWORD_MESSAGE, ())
}

/// POST /api/auth/reset-password
#[tracing::instrument(skip(state, input))]
pub async fn reset_password<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ApiJson(input): ApiJson<ResetPasswordRequest>,
) -> ApiResult<()> {
    state.staff.reset_password(input).await?;
    ok("Password has been reset successfully", ())
}

/// POST /api/auth
#[tracing::instrument(skip(state, actor, input))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    ApiJson(input): ApiJson<NewStaff>,
) -> Created<StaffProfile> {
    let access = actor.manager_access()?;
    let staff = state.staff.create_staff(&access, input).await?;
    created("Staff created successfully", staff)
}

/// GET /api/auth
#[tracing::instrument(skip(state, actor))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
) -> ApiResult<Vec<StaffProfile>> {
    let access = actor.manager_access()?;
    ok("Staff retrieved successfully", state.staff.list_staff(&access).await?)
}

/// POST /api/auth/update-staff/{id}
#[tracing::instrument(skip(state, actor, input))]
pub async fn update<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<StaffUpdate>,
) -> ApiResult<StaffProfile> {
    let id: StaffId = parse_id(&id)?;
    let access = actor.manager_access()?;
    ok(
        "Staff updated successfully",
        state.staff.update_staff(&access, id, input).await?,
    )
}

/// POST /api/auth/delete-staff/{id}
#[tracing::instrument(skip(state, actor))]
pub async fn delete<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id: StaffId = parse_id(&id)?;
    let access = actor.manager_access()?;
    state.staff.delete_staff(&access, id).await?;
    ok("Staff deleted successfully", ())
}
