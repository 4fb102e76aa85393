//! Modelo del historial de auditoría
//!
//! Cada cambio de campo produce exactamente una entrada inmutable.
//! El nombre del vehículo se captura en el momento del cambio, no se
//! resuelve en vivo, para que el historial sobreviva renombres.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Acción registrada en el historial. DELETED forma parte del vocabulario
/// aunque el borrado no está expuesto como operación.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuditAction {
    #[serde(rename = "STATUS_CHANGE")]
    StatusChange,
    #[serde(rename = "NOTES_UPDATE")]
    NotesUpdate,
    #[serde(rename = "LOCATION_CHANGE")]
    LocationChange,
    #[serde(rename = "CREATED")]
    Created,
    #[serde(rename = "DELETED")]
    Deleted,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::StatusChange => "STATUS_CHANGE",
            AuditAction::NotesUpdate => "NOTES_UPDATE",
            AuditAction::LocationChange => "LOCATION_CHANGE",
            AuditAction::Created => "CREATED",
            AuditAction::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STATUS_CHANGE" => Ok(AuditAction::StatusChange),
            "NOTES_UPDATE" => Ok(AuditAction::NotesUpdate),
            "LOCATION_CHANGE" => Ok(AuditAction::LocationChange),
            "CREATED" => Ok(AuditAction::Created),
            "DELETED" => Ok(AuditAction::Deleted),
            other => Err(format!("unknown audit action: {}", other)),
        }
    }
}

/// Entrada inmutable del historial. Los valores se guardan como texto;
/// cadena vacía significa "sin valor previo".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub vehicle_name: String,
    pub action: AuditAction,
    pub field: String,
    pub old_value: String,
    pub new_value: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub user_name: String,
}

/// Entrada pendiente de registro: el ledger asigna id y timestamp
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub vehicle_id: Uuid,
    pub vehicle_name: String,
    pub action: AuditAction,
    pub field: String,
    pub old_value: String,
    pub new_value: String,
    pub user_id: String,
    pub user_name: String,
}
