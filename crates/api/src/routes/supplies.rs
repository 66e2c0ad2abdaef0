//! Delivery (supply) endpoints. Every route requires a station manager.

use std::sync::Arc;

use axum::extract::State;
use document_store::DocumentStore;
use domain::{Delivery, DeliveryId, DeliveryUpdate, DeliveryView, NewDelivery, Versioned};
use serde::Deserialize;

use super::{ApiResult, Created, created, ok};
use crate::auth::AuthUser;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyRef {
    pub supply_id: Option<DeliveryId>,
}

/// POST /api/supplies/add-supply
#[tracing::instrument(skip(state, actor, input))]
pub async fn add<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    ApiJson(input): ApiJson<NewDelivery>,
) -> Created<Versioned<Delivery>> {
    let access = actor.manager_access()?;
    let delivery = state.deliveries.add_delivery(&access, input).await?;
    created("Supply added successfully", delivery)
}

/// GET /api/supplies
#[tracing::instrument(skip(state, actor))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
) -> ApiResult<Vec<DeliveryView>> {
    let access = actor.manager_access()?;
    ok(
        "Supplies retrieved successfully",
        state.deliveries.list_deliveries(&access).await?,
    )
}

/// POST /api/supplies/update-supply
#[tracing::instrument(skip(state, actor, input))]
pub async fn update<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    ApiJson(input): ApiJson<DeliveryUpdate>,
) -> ApiResult<Versioned<Delivery>> {
    let access = actor.manager_access()?;
    ok(
        "Supply updated successfully",
        state.deliveries.update_delivery(&access, input).await?,
    )
}

/// POST /api/supplies/delete-supply
#[tracing::instrument(skip(state, actor, input))]
pub async fn delete<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    ApiJson(input): ApiJson<SupplyRef>,
) -> ApiResult<()> {
    let access = actor.manager_access()?;
    state
        .deliveries
        .delete_delivery(&access, input.supply_id)
        .await?;
    ok("Supply deleted successfully", ())
}
