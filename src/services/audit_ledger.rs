//! Registro de auditoría
//!
//! Dueño único de las entradas: asigna id y timestamp al momento del
//! append y delega la retención al repositorio. Las entradas se guardan
//! más viejas primero pero siempre se consultan más nuevas primero.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::models::{AuditEntry, NewAuditEntry};
use crate::repositories::FleetRepository;
use crate::utils::errors::AppResult;

#[derive(Clone)]
pub struct AuditLedger {
    repository: Arc<dyn FleetRepository>,
}

impl AuditLedger {
    pub fn new(repository: Arc<dyn FleetRepository>) -> Self {
        Self { repository }
    }

    /// Registrar una entrada; el id y el timestamp se asignan acá
    pub async fn append(&self, entry: NewAuditEntry) -> AppResult<()> {
        let entry = AuditEntry {
            id: Uuid::new_v4(),
            vehicle_id: entry.vehicle_id,
            vehicle_name: entry.vehicle_name,
            action: entry.action,
            field: entry.field,
            old_value: entry.old_value,
            new_value: entry.new_value,
            timestamp: Utc::now(),
            user_id: entry.user_id,
            user_name: entry.user_name,
        };

        self.repository.insert_audit_entry(&entry).await
    }

    /// Ventana reciente del historial, más nuevo primero
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<AuditEntry>> {
        self.repository.get_recent_audit(limit).await
    }
}
