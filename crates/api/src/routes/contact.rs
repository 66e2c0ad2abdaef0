//! Public contact form endpoint.

use std::sync::Arc;

use axum::extract::State;
use document_store::DocumentStore;
use domain::ContactMessage;

use super::{ApiResult, ok};
use crate::extract::ApiJson;
use crate::state::AppState;

/// POST /api/contact
#[tracing::instrument(skip(state, input))]
pub async fn submit<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ApiJson(input): ApiJson<ContactMessage>,
) -> ApiResult<()> {
    state.contact.submit(input).await?;
    ok("Message sent successfully", ())
}
