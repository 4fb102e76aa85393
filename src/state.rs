//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::environment::EnvironmentConfig;
use crate::services::{AuditLedger, EntityStore, HubHandle, PresenceTracker};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EntityStore>,
    pub ledger: AuditLedger,
    pub presence: Arc<Mutex<PresenceTracker>>,
    pub hub: HubHandle,
    pub config: EnvironmentConfig,
}

impl AppState {
    pub fn new(
        store: Arc<EntityStore>,
        ledger: AuditLedger,
        presence: Arc<Mutex<PresenceTracker>>,
        hub: HubHandle,
        config: EnvironmentConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            presence,
            hub,
            config,
        }
    }
}
