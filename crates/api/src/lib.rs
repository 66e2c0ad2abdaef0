//! HTTP API server for the filling-station back office.
//!
//! Provides REST endpoints for station registration, staff and credentials,
//! tanks, pumps and deliveries, with structured logging (tracing) and
//! Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use document_store::DocumentStore;
use domain::{LogNotifier, Notifier};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: DocumentStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let api = Router::new()
        .route("/health", get(routes::health::check))
        .route("/contact", post(routes::contact::submit::<S>))
        .route("/register", post(routes::stations::register::<S>))
        .route(
            "/register/{id}",
            get(routes::stations::get::<S>)
                .put(routes::stations::update::<S>)
                .delete(routes::stations::delete::<S>),
        )
        .route(
            "/auth",
            post(routes::staff::create::<S>).get(routes::staff::list::<S>),
        )
        .route("/auth/login", post(routes::staff::login::<S>))
        .route(
            "/auth/forgot-password",
            post(routes::staff::forgot_password::<S>),
        )
        .route("/auth/reset-password", post(routes::staff::reset_password::<S>))
        .route("/auth/update-staff/{id}", post(routes::staff::update::<S>))
        .route("/auth/delete-staff/{id}", post(routes::staff::delete::<S>))
        .route("/tanks", get(routes::tanks::list::<S>))
        .route("/tanks/add-tank", post(routes::tanks::add::<S>))
        .route("/tanks/update-tank", post(routes::tanks::update::<S>))
        .route("/tanks/delete-tank", post(routes::tanks::delete::<S>))
        .route("/pumps", get(routes::pumps::list::<S>))
        .route("/pumps/add-pump", post(routes::pumps::add::<S>))
        .route("/pumps/update-pump", post(routes::pumps::update::<S>))
        .route("/pumps/delete-pump", post(routes::pumps::delete::<S>))
        .route("/pumps/update-prices", post(routes::pumps::update_prices::<S>))
        .route("/pumps/sales-report", get(routes::pumps::sales_report::<S>))
        .route("/supplies", get(routes::supplies::list::<S>))
        .route("/supplies/add-supply", post(routes::supplies::add::<S>))
        .route("/supplies/update-supply", post(routes::supplies::update::<S>))
        .route("/supplies/delete-supply", post(routes::supplies::delete::<S>))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state with the given notifier.
pub fn create_state<S: DocumentStore + Clone + 'static>(
    store: S,
    notifier: Arc<dyn Notifier>,
    config: &Config,
) -> Arc<AppState<S>> {
    Arc::new(AppState::new(store, notifier, config))
}

/// Creates the default application state, with notifications written to the log.
pub fn create_default_state<S: DocumentStore + Clone + 'static>(
    store: S,
    config: &Config,
) -> Arc<AppState<S>> {
    create_state(store, Arc::new(LogNotifier), config)
}
