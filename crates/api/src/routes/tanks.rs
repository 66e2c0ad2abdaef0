//! Tank endpoints. Every route requires a station manager.

use std::sync::Arc;

use axum::extract::State;
use document_store::DocumentStore;
use domain::{NewTank, SubTank, TankId, TankInventory, TankListing, TankUpdate};
use serde::Deserialize;

use super::{ApiResult, Created, created, ok};
use crate::auth::AuthUser;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TankRef {
    pub tank_id: Option<TankId>,
}

/// POST /api/tanks/add-tank
#[tracing::instrument(skip(state, actor, input))]
pub async fn add<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    ApiJson(input): ApiJson<NewTank>,
) -> Created<TankInventory> {
    let access = actor.manager_access()?;
    let inventory = state.tanks.add_tank(&access, input).await?;
    created("Tank added successfully", inventory)
}

/// GET /api/tanks
#[tracing::instrument(skip(state, actor))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
) -> ApiResult<TankListing> {
    let access = actor.manager_access()?;
    ok("Tanks retrieved successfully", state.tanks.list_tanks(&access).await?)
}

/// POST /api/tanks/update-tank
#[tracing::instrument(skip(state, actor, input))]
pub async fn update<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    ApiJson(input): ApiJson<TankUpdate>,
) -> ApiResult<SubTank> {
    let access = actor.manager_access()?;
    ok("Tank updated successfully", state.tanks.update_tank(&access, input).await?)
}

/// POST /api/tanks/delete-tank
#[tracing::instrument(skip(state, actor, input))]
pub async fn delete<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    ApiJson(input): ApiJson<TankRef>,
) -> ApiResult<SubTank> {
    let access = actor.manager_access()?;
    ok(
        "Tank deleted successfully",
        state.tanks.delete_tank(&access, input.tank_id).await?,
    )
}
