//! Pump, pricing and sales-report endpoints. Every route requires a station manager.

use std::sync::Arc;

use axum::extract::{Query, State};
use document_store::DocumentStore;
use domain::{
    AddedPump, FuelPriceUpdate, NewPump, PriceUpdate, PumpId, PumpUpdate, PumpView, SalesReport,
    SubPump,
};
use serde::Deserialize;

use super::{ApiResult, Created, created, ok};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpRef {
    pub pump_id: Option<PumpId>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// POST /api/pumps/add-pump
#[tracing::instrument(skip(state, actor, input))]
pub async fn add<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    ApiJson(input): ApiJson<NewPump>,
) -> Created<AddedPump> {
    let access = actor.manager_access()?;
    let added = state.pumps.add_pump(&access, input).await?;
    created("Pump added successfully", added)
}

/// GET /api/pumps
#[tracing::instrument(skip(state, actor))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
) -> ApiResult<Vec<PumpView>> {
    let access = actor.manager_access()?;
    ok("Pumps retrieved successfully", state.pumps.list_pumps(&access).await?)
}

/// POST /api/pumps/update-pump
#[tracing::instrument(skip(state, actor, input))]
pub async fn update<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    ApiJson(input): ApiJson<PumpUpdate>,
) -> ApiResult<PumpView> {
    let access = actor.manager_access()?;
    ok("Pump updated successfully", state.pumps.update_pump(&access, input).await?)
}

/// POST /api/pumps/delete-pump
#[tracing::instrument(skip(state, actor, input))]
pub async fn delete<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    ApiJson(input): ApiJson<PumpRef>,
) -> ApiResult<SubPump> {
    let access = actor.manager_access()?;
    ok(
        "Pump deleted successfully",
        state.pumps.delete_pump(&access, input.pump_id).await?,
    )
}

/// POST /api/pumps/update-prices
#[tracing::instrument(skip(state, actor, input))]
pub async fn update_prices<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    ApiJson(input): ApiJson<PriceUpdate>,
) -> ApiResult<Vec<FuelPriceUpdate>> {
    let access = actor.manager_access()?;
    ok(
        "Prices updated successfully",
        state.pumps.update_prices(&access, input).await?,
    )
}

/// GET /api/pumps/sales-report?from=&to=
#[tracing::instrument(skip(state, actor))]
pub async fn sales_report<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(actor): AuthUser,
    params: Result<Query<ReportParams>, axum::extract::rejection::QueryRejection>,
) -> ApiResult<SalesReport> {
    let access = actor.manager_access()?;
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let report = state
        .pumps
        .sales_report(&access, params.from.as_deref(), params.to.as_deref())
        .await?;
    ok("Sales report generated successfully", report)
}
