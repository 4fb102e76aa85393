//! Mensajes del protocolo en tiempo real
//!
//! Eventos JSON con la forma `{"event": ..., "data": ...}` en ambas
//! direcciones. Los nombres de evento y de campo son los que consume el
//! cliente (camelCase).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AuditEntry, Operator, Vehicle, VehicleGroup, VehicleStatus, VehicleType};

/// Actualización parcial de un vehículo: un Option por atributo mutable.
/// La auditoría se calcula campo a campo sobre los presentes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleChanges {
    pub name: Option<String>,
    pub plate: Option<String>,
    #[serde(rename = "type")]
    pub vehicle_type: Option<VehicleType>,
    pub status: Option<VehicleStatus>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl VehicleChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.plate.is_none()
            && self.vehicle_type.is_none()
            && self.status.is_none()
            && self.location.is_none()
            && self.notes.is_none()
    }
}

/// Datos para crear un vehículo nuevo (el store asigna id y timestamp)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicleData {
    pub name: String,
    pub plate: Option<String>,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    pub status: VehicleStatus,
    pub location: String,
    pub notes: Option<String>,
    /// Si falta, se usa el nombre del operador que crea
    pub updated_by: Option<String>,
}

fn default_audit_limit() -> i64 {
    50
}

/// Intenciones entrantes de un operador conectado
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "user:join")]
    Join { name: String },

    #[serde(rename = "vehicle:update", rename_all = "camelCase")]
    VehicleUpdate {
        vehicle_id: Uuid,
        updates: VehicleChanges,
        user_id: String,
        user_name: String,
    },

    #[serde(rename = "vehicle:create", rename_all = "camelCase")]
    VehicleCreate {
        vehicle_data: CreateVehicleData,
        user_id: String,
        user_name: String,
    },

    #[serde(rename = "audit:request")]
    AuditRequest {
        #[serde(default = "default_audit_limit")]
        limit: i64,
    },
}

/// Eventos salientes hacia los observadores
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Snapshot completo, solo para la conexión que acaba de unirse
    #[serde(rename = "fleet:initial", rename_all = "camelCase")]
    FleetInitial {
        vehicles: Vec<Vehicle>,
        groups: Vec<VehicleGroup>,
        audit_history: Vec<AuditEntry>,
    },

    /// Broadcast: vehículo y grupos derivados del mismo estado post-mutación
    #[serde(rename = "vehicle:updated")]
    VehicleUpdated {
        vehicle: Vehicle,
        groups: Vec<VehicleGroup>,
    },

    #[serde(rename = "vehicle:created")]
    VehicleCreated {
        vehicle: Vehicle,
        groups: Vec<VehicleGroup>,
    },

    /// Broadcast: ventana reciente del historial tras una mutación
    #[serde(rename = "audit:update")]
    AuditUpdate(Vec<AuditEntry>),

    /// Respuesta de historial, solo para quien lo pidió
    #[serde(rename = "audit:history")]
    AuditHistory(Vec<AuditEntry>),

    #[serde(rename = "users:update")]
    UsersUpdate(Vec<Operator>),

    /// Fallo de una intención, solo para quien la originó
    #[serde(rename = "error")]
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_join_event() {
        let raw = json!({ "event": "user:join", "data": { "name": "Carla" } });
        let event: ClientEvent = serde_json::from_value(raw).unwrap();
        match event {
            ClientEvent::Join { name } => assert_eq!(name, "Carla"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_parse_vehicle_update_with_partial_fields() {
        let id = Uuid::new_v4();
        let raw = json!({
            "event": "vehicle:update",
            "data": {
                "vehicleId": id,
                "updates": { "status": "MANUTENCAO" },
                "userId": "u1",
                "userName": "Carla"
            }
        });

        let event: ClientEvent = serde_json::from_value(raw).unwrap();
        match event {
            ClientEvent::VehicleUpdate { vehicle_id, updates, user_name, .. } => {
                assert_eq!(vehicle_id, id);
                assert_eq!(updates.status, Some(VehicleStatus::Manutencao));
                assert!(updates.name.is_none());
                assert!(updates.location.is_none());
                assert_eq!(user_name, "Carla");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_audit_request_defaults_limit() {
        let raw = json!({ "event": "audit:request", "data": {} });
        let event: ClientEvent = serde_json::from_value(raw).unwrap();
        match event {
            ClientEvent::AuditRequest { limit } => assert_eq!(limit, 50),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_server_event_names() {
        let event = ServerEvent::Error { message: "boom".to_string() };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "error");
        assert_eq!(json["data"]["message"], "boom");

        let event = ServerEvent::UsersUpdate(vec![]);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "users:update");
    }
}
