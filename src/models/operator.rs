//! Operador conectado
//!
//! Registro efímero ligado a una conexión viva; no se persiste nunca.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    pub id: Uuid,
    pub name: String,
    pub connection_id: Uuid,
    pub last_active: DateTime<Utc>,
}
