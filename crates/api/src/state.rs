//! Shared application state.

use std::sync::Arc;

use axum::extract::FromRef;
use document_store::DocumentStore;
use domain::{
    ContactService, DeliveryService, Notifier, PasswordHasher, PumpService, StaffService,
    StationService, TankService,
};

use crate::auth::TokenKeys;
use crate::config::Config;

/// Services and keys shared by every handler.
pub struct AppState<S: DocumentStore> {
    pub tanks: TankService<S>,
    pub pumps: PumpService<S>,
    pub deliveries: DeliveryService<S>,
    pub staff: StaffService<S>,
    pub stations: StationService<S>,
    pub contact: ContactService,
    pub tokens: TokenKeys,
}

impl<S: DocumentStore + Clone + 'static> AppState<S> {
    /// Wires every service to one store and one notifier.
    pub fn new(store: S, notifier: Arc<dyn Notifier>, config: &Config) -> Self {
        let hasher = PasswordHasher::new(config.bcrypt_cost);
        Self {
            tanks: TankService::new(store.clone(), notifier.clone()),
            pumps: PumpService::new(store.clone()),
            deliveries: DeliveryService::new(store.clone()),
            staff: StaffService::new(store.clone(), hasher, notifier.clone())
                .with_reset_ttl(chrono::Duration::minutes(config.reset_token_ttl_minutes)),
            stations: StationService::new(store, hasher),
            contact: ContactService::new(notifier),
            tokens: TokenKeys::new(
                &config.jwt_secret,
                chrono::Duration::hours(config.jwt_ttl_hours),
            ),
        }
    }
}

impl<S: DocumentStore> FromRef<Arc<AppState<S>>> for TokenKeys {
    fn from_ref(state: &Arc<AppState<S>>) -> Self {
        state.tokens.clone()
    }
}
