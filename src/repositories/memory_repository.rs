//! Repositorio de flota en memoria
//!
//! Implementación acotada del mismo contrato: el historial retiene como
//! máximo `MAX_AUDIT_ENTRIES` entradas y descarta las más viejas en
//! silencio. Respalda los tests y despliegues sin base de datos.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{AuditEntry, Vehicle};
use crate::repositories::FleetRepository;
use crate::utils::errors::AppResult;

/// Cota de retención del historial en memoria
pub const MAX_AUDIT_ENTRIES: usize = 1000;

#[derive(Default)]
pub struct MemoryFleetRepository {
    vehicles: RwLock<HashMap<Uuid, Vehicle>>,
    // Más nuevo primero; se trunca por la cola
    audit: RwLock<Vec<AuditEntry>>,
}

impl MemoryFleetRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FleetRepository for MemoryFleetRepository {
    async fn get_all_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        let vehicles = self.vehicles.read().await;
        let mut all: Vec<Vehicle> = vehicles.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn get_vehicle_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        Ok(self.vehicles.read().await.get(&id).cloned())
    }

    async fn insert_vehicle(&self, vehicle: &Vehicle) -> AppResult<()> {
        self.vehicles.write().await.insert(vehicle.id, vehicle.clone());
        Ok(())
    }

    async fn update_vehicle(&self, vehicle: &Vehicle) -> AppResult<()> {
        self.vehicles.write().await.insert(vehicle.id, vehicle.clone());
        Ok(())
    }

    async fn vehicle_count(&self) -> AppResult<i64> {
        Ok(self.vehicles.read().await.len() as i64)
    }

    async fn insert_audit_entry(&self, entry: &AuditEntry) -> AppResult<()> {
        let mut audit = self.audit.write().await;
        audit.insert(0, entry.clone());
        audit.truncate(MAX_AUDIT_ENTRIES);
        Ok(())
    }

    async fn get_recent_audit(&self, limit: i64) -> AppResult<Vec<AuditEntry>> {
        let audit = self.audit.read().await;
        let limit = limit.max(0) as usize;
        Ok(audit.iter().take(limit).cloned().collect())
    }
}
