//! Estado autoritativo de la flota
//!
//! Aplica altas y actualizaciones parciales sobre el repositorio y
//! registra cada cambio de campo en el ledger de auditoría. La secuencia
//! leer-fusionar-escribir-auditar de cada vehículo se serializa con un
//! candado por id: escrituras concurrentes al mismo vehículo no se
//! intercalan (gana la última en persistir).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::dto::{CreateVehicleData, VehicleChanges};
use crate::models::{AuditAction, NewAuditEntry, Vehicle};
use crate::repositories::FleetRepository;
use crate::services::AuditLedger;
use crate::utils::errors::{AppError, AppResult};

pub struct EntityStore {
    repository: Arc<dyn FleetRepository>,
    ledger: AuditLedger,
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

/// Clasificación gruesa de campo a acción: status y notes tienen acción
/// propia, todo lo demás cae en LOCATION_CHANGE. Regla heredada, no se
/// "corrige" por campo.
fn action_for_field(field: &str) -> AuditAction {
    match field {
        "status" => AuditAction::StatusChange,
        "notes" => AuditAction::NotesUpdate,
        _ => AuditAction::LocationChange,
    }
}

impl EntityStore {
    pub fn new(repository: Arc<dyn FleetRepository>, ledger: AuditLedger) -> Self {
        Self {
            repository,
            ledger,
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn lock_for(&self, id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        self.repository.get_vehicle_by_id(id).await
    }

    /// Todos los vehículos en orden canónico (por nombre)
    pub async fn list(&self) -> AppResult<Vec<Vehicle>> {
        self.repository.get_all_vehicles().await
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.repository.vehicle_count().await
    }

    /// Alta de un vehículo: id y timestamp frescos, una entrada CREATED
    pub async fn create(
        &self,
        data: CreateVehicleData,
        user_id: &str,
        user_name: &str,
    ) -> AppResult<Vehicle> {
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            name: data.name,
            plate: data.plate,
            vehicle_type: data.vehicle_type,
            status: data.status,
            location: data.location,
            notes: data.notes,
            last_updated: Utc::now(),
            updated_by: data.updated_by.unwrap_or_else(|| user_name.to_string()),
        };

        self.repository.insert_vehicle(&vehicle).await?;

        self.ledger
            .append(NewAuditEntry {
                vehicle_id: vehicle.id,
                vehicle_name: vehicle.name.clone(),
                action: AuditAction::Created,
                field: "status".to_string(),
                old_value: String::new(),
                new_value: vehicle.status.to_string(),
                user_id: user_id.to_string(),
                user_name: user_name.to_string(),
            })
            .await?;

        Ok(vehicle)
    }

    /// Actualización parcial. Siempre estampa last_updated/updated_by,
    /// incluso sin cambios efectivos; cada campo provisto cuyo valor
    /// textual cambió genera exactamente una entrada de auditoría.
    pub async fn update(
        &self,
        id: Uuid,
        changes: VehicleChanges,
        user_id: &str,
        user_name: &str,
    ) -> AppResult<Vehicle> {
        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        let current = self
            .repository
            .get_vehicle_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Vehicle with id '{}' not found", id)))?;

        let mut updated = current.clone();
        if let Some(name) = &changes.name {
            updated.name = name.clone();
        }
        if let Some(plate) = &changes.plate {
            updated.plate = Some(plate.clone());
        }
        if let Some(vehicle_type) = changes.vehicle_type {
            updated.vehicle_type = vehicle_type;
        }
        if let Some(status) = changes.status {
            updated.status = status;
        }
        if let Some(location) = &changes.location {
            updated.location = location.clone();
        }
        if let Some(notes) = &changes.notes {
            updated.notes = Some(notes.clone());
        }
        updated.last_updated = Utc::now();
        updated.updated_by = user_name.to_string();

        self.repository.update_vehicle(&updated).await?;

        // Una entrada por campo provisto cuyo valor textual difiere
        let mut changed: Vec<(&str, String, String)> = Vec::new();
        if changes.name.is_some() && current.name != updated.name {
            changed.push(("name", current.name.clone(), updated.name.clone()));
        }
        if changes.plate.is_some() && current.plate != updated.plate {
            changed.push((
                "plate",
                current.plate.clone().unwrap_or_default(),
                updated.plate.clone().unwrap_or_default(),
            ));
        }
        if changes.vehicle_type.is_some() && current.vehicle_type != updated.vehicle_type {
            changed.push((
                "type",
                current.vehicle_type.to_string(),
                updated.vehicle_type.to_string(),
            ));
        }
        if changes.status.is_some() && current.status != updated.status {
            changed.push((
                "status",
                current.status.to_string(),
                updated.status.to_string(),
            ));
        }
        if changes.location.is_some() && current.location != updated.location {
            changed.push(("location", current.location.clone(), updated.location.clone()));
        }
        if changes.notes.is_some() && current.notes != updated.notes {
            changed.push((
                "notes",
                current.notes.clone().unwrap_or_default(),
                updated.notes.clone().unwrap_or_default(),
            ));
        }

        for (field, old_value, new_value) in changed {
            self.ledger
                .append(NewAuditEntry {
                    vehicle_id: id,
                    vehicle_name: current.name.clone(),
                    action: action_for_field(field),
                    field: field.to_string(),
                    old_value,
                    new_value,
                    user_id: user_id.to_string(),
                    user_name: user_name.to_string(),
                })
                .await?;
        }

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{VehicleStatus, VehicleType};
    use crate::repositories::MemoryFleetRepository;

    fn store() -> EntityStore {
        let repository: Arc<dyn FleetRepository> = Arc::new(MemoryFleetRepository::new());
        let ledger = AuditLedger::new(repository.clone());
        EntityStore::new(repository, ledger)
    }

    fn create_data(name: &str, status: VehicleStatus, location: &str) -> CreateVehicleData {
        CreateVehicleData {
            name: name.to_string(),
            plate: None,
            vehicle_type: VehicleType::Empilhadeira,
            status,
            location: location.to_string(),
            notes: None,
            updated_by: None,
        }
    }

    #[tokio::test]
    async fn test_create_appends_created_entry() {
        let store = store();
        let vehicle = store
            .create(create_data("MVX020", VehicleStatus::Disponivel, "PMO"), "u1", "Carla")
            .await
            .unwrap();

        assert_eq!(vehicle.updated_by, "Carla");

        let audit = store.ledger.recent(10).await.unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].action, AuditAction::Created);
        assert_eq!(audit[0].field, "status");
        assert_eq!(audit[0].old_value, "");
        assert_eq!(audit[0].new_value, "DISPONIVEL");
        assert_eq!(audit[0].vehicle_name, "MVX020");
        assert_eq!(audit[0].user_id, "u1");
    }

    #[tokio::test]
    async fn test_empty_update_stamps_without_audit() {
        let store = store();
        let vehicle = store
            .create(create_data("MVX003", VehicleStatus::Disponivel, "PMO"), "u1", "Carla")
            .await
            .unwrap();
        let before = vehicle.last_updated;

        let updated = store
            .update(vehicle.id, VehicleChanges::default(), "u2", "Bruno")
            .await
            .unwrap();

        assert_eq!(updated.updated_by, "Bruno");
        assert!(updated.last_updated >= before);

        // Solo la entrada CREATED del alta
        let audit = store.ledger.recent(10).await.unwrap();
        assert_eq!(audit.len(), 1);
    }

    #[tokio::test]
    async fn test_status_change_produces_one_entry() {
        let store = store();
        let vehicle = store
            .create(create_data("MVX003", VehicleStatus::Disponivel, "PMO"), "u1", "Carla")
            .await
            .unwrap();

        let changes = VehicleChanges {
            status: Some(VehicleStatus::Manutencao),
            ..Default::default()
        };
        store.update(vehicle.id, changes, "u1", "Carla").await.unwrap();

        let audit = store.ledger.recent(10).await.unwrap();
        assert_eq!(audit.len(), 2);
        assert_eq!(audit[0].action, AuditAction::StatusChange);
        assert_eq!(audit[0].old_value, "DISPONIVEL");
        assert_eq!(audit[0].new_value, "MANUTENCAO");
    }

    #[tokio::test]
    async fn test_unchanged_field_produces_no_entry() {
        let store = store();
        let vehicle = store
            .create(create_data("MVX003", VehicleStatus::Disponivel, "PMO"), "u1", "Carla")
            .await
            .unwrap();

        let changes = VehicleChanges {
            status: Some(VehicleStatus::Disponivel),
            ..Default::default()
        };
        store.update(vehicle.id, changes, "u1", "Carla").await.unwrap();

        let audit = store.ledger.recent(10).await.unwrap();
        assert_eq!(audit.len(), 1);
    }

    #[tokio::test]
    async fn test_multi_field_update_appends_one_entry_per_change() {
        let store = store();
        let vehicle = store
            .create(create_data("MVX003", VehicleStatus::Disponivel, "PMO"), "u1", "Carla")
            .await
            .unwrap();

        let changes = VehicleChanges {
            status: Some(VehicleStatus::EmUso),
            location: Some("Expedição".to_string()),
            notes: Some("EM ROTA".to_string()),
            ..Default::default()
        };
        store.update(vehicle.id, changes, "u1", "Carla").await.unwrap();

        let audit = store.ledger.recent(10).await.unwrap();
        // CREATED + tres campos cambiados
        assert_eq!(audit.len(), 4);

        let actions: Vec<AuditAction> = audit.iter().map(|e| e.action).collect();
        assert!(actions.contains(&AuditAction::StatusChange));
        assert!(actions.contains(&AuditAction::LocationChange));
        assert!(actions.contains(&AuditAction::NotesUpdate));

        let notes_entry = audit.iter().find(|e| e.field == "notes").unwrap();
        assert_eq!(notes_entry.old_value, "");
        assert_eq!(notes_entry.new_value, "EM ROTA");
    }

    #[tokio::test]
    async fn test_name_change_classifies_as_location_change() {
        // Regla gruesa heredada: todo lo que no es status/notes es LOCATION_CHANGE
        let store = store();
        let vehicle = store
            .create(create_data("MVX003", VehicleStatus::Disponivel, "PMO"), "u1", "Carla")
            .await
            .unwrap();

        let changes = VehicleChanges {
            name: Some("MVX099".to_string()),
            ..Default::default()
        };
        store.update(vehicle.id, changes, "u1", "Carla").await.unwrap();

        let audit = store.ledger.recent(10).await.unwrap();
        assert_eq!(audit[0].action, AuditAction::LocationChange);
        assert_eq!(audit[0].field, "name");
        // El nombre capturado es el previo al cambio
        assert_eq!(audit[0].vehicle_name, "MVX003");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found_without_audit() {
        let store = store();
        let result = store
            .update(Uuid::new_v4(), VehicleChanges::default(), "u1", "Carla")
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(store.ledger.recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_updates_same_vehicle_do_not_interleave() {
        let store = Arc::new(store());
        let vehicle = store
            .create(create_data("MVX003", VehicleStatus::Disponivel, "PMO"), "u1", "Carla")
            .await
            .unwrap();

        let mut handles = Vec::new();
        for status in [VehicleStatus::EmUso, VehicleStatus::Manutencao, VehicleStatus::Disponivel] {
            let store = store.clone();
            let id = vehicle.id;
            handles.push(tokio::spawn(async move {
                let changes = VehicleChanges {
                    status: Some(status),
                    ..Default::default()
                };
                store.update(id, changes, "u1", "Carla").await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // Cada entrada encadena con la anterior: el old de una escritura
        // es el new de la previa, sin intercalados
        let mut audit = store.ledger.recent(10).await.unwrap();
        audit.retain(|e| e.action == AuditAction::StatusChange);
        audit.reverse();
        let mut previous = "DISPONIVEL".to_string();
        for entry in audit {
            assert_eq!(entry.old_value, previous);
            previous = entry.new_value;
        }
    }
}
