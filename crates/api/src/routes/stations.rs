//! Station registration and management endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use document_store::DocumentStore;
use domain::{
    Registration, RegistrationForm, Station, StationDetails, StationId, StationUpdate, Versioned,
};

use super::{ApiResult, Created, created, ok, parse_id};
use crate::auth::AuthUser;
use crate::extract::ApiJson;
use crate::state::AppState;

/// POST /api/register. Public.
#[tracing::instrument(skip(state, form))]
pub async fn register<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ApiJson(form): ApiJson<RegistrationForm>,
) -> Created<Registration> {
    let registration = state.stations.register(form).await?;
    created("Filling station registered successfully", registration)
}

/// GET /api/register/{id}. Any staff member of the station.
#[tracing::instrument(skip(state, actor))]
pub async fn get<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StationDetails> {
    let id: StationId = parse_id(&id)?;
    let access = actor.station_access()?;
    ok(
        "Filling station retrieved successfully",
        state.stations.get_station(&access, id).await?,
    )
}

/// PUT /api/register/{id}
#[tracing::instrument(skip(state, actor, input))]
pub async fn update<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<StationUpdate>,
) -> ApiResult<Versioned<Station>> {
    let id: StationId = parse_id(&id)?;
    let access = actor.manager_access()?;
    ok(
        "Filling station updated successfully",
        state.stations.update_station(&access, id, input).await?,
    )
}

/// DELETE /api/register/{id}
#[tracing::instrument(skip(state, actor))]
pub async fn delete<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id: StationId = parse_id(&id)?;
    let access = actor.manager_access()?;
    state.stations.delete_station(&access, id).await?;
    ok("Filling station deleted successfully", ())
}
