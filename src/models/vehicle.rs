//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle, sus enums cerrados de tipo/estado
//! y el agrupamiento derivado VehicleGroup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Tipo de equipo - vocabulario cerrado
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VehicleType {
    #[serde(rename = "EMPILHADEIRA")]
    Empilhadeira,
    #[serde(rename = "TRATOR")]
    Trator,
    #[serde(rename = "CARROCA")]
    Carroca,
    #[serde(rename = "KRANE_CAR")]
    KraneCar,
    #[serde(rename = "CAMINHAO")]
    Caminhao,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Empilhadeira => "EMPILHADEIRA",
            VehicleType::Trator => "TRATOR",
            VehicleType::Carroca => "CARROCA",
            VehicleType::KraneCar => "KRANE_CAR",
            VehicleType::Caminhao => "CAMINHAO",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMPILHADEIRA" => Ok(VehicleType::Empilhadeira),
            "TRATOR" => Ok(VehicleType::Trator),
            "CARROCA" => Ok(VehicleType::Carroca),
            "KRANE_CAR" => Ok(VehicleType::KraneCar),
            "CAMINHAO" => Ok(VehicleType::Caminhao),
            other => Err(format!("unknown vehicle type: {}", other)),
        }
    }
}

/// Estado del vehículo. MANUTENCAO e INDISPONIVEL se mantienen como estados
/// distintos; solo DISPONIVEL cuenta como disponible en los agrupamientos.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VehicleStatus {
    #[serde(rename = "DISPONIVEL")]
    Disponivel,
    #[serde(rename = "EM_USO")]
    EmUso,
    #[serde(rename = "MANUTENCAO")]
    Manutencao,
    #[serde(rename = "INDISPONIVEL")]
    Indisponivel,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Disponivel => "DISPONIVEL",
            VehicleStatus::EmUso => "EM_USO",
            VehicleStatus::Manutencao => "MANUTENCAO",
            VehicleStatus::Indisponivel => "INDISPONIVEL",
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DISPONIVEL" => Ok(VehicleStatus::Disponivel),
            "EM_USO" => Ok(VehicleStatus::EmUso),
            "MANUTENCAO" => Ok(VehicleStatus::Manutencao),
            "INDISPONIVEL" => Ok(VehicleStatus::Indisponivel),
            other => Err(format!("unknown vehicle status: {}", other)),
        }
    }
}

/// Vehicle principal - el registro autoritativo de un equipo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    pub status: VehicleStatus,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub last_updated: DateTime<Utc>,
    pub updated_by: String,
}

/// Agrupamiento derivado por (tipo, ubicación). Nunca se persiste:
/// se recalcula completo en cada consulta.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleGroup {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    pub vehicles: Vec<Vehicle>,
    pub available_count: usize,
    pub total_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_round_trip() {
        for raw in ["EMPILHADEIRA", "TRATOR", "CARROCA", "KRANE_CAR", "CAMINHAO"] {
            let parsed: VehicleType = raw.parse().unwrap();
            assert_eq!(parsed.as_str(), raw);
        }
        assert!("FORKLIFT".parse::<VehicleType>().is_err());
    }

    #[test]
    fn test_status_round_trip() {
        for raw in ["DISPONIVEL", "EM_USO", "MANUTENCAO", "INDISPONIVEL"] {
            let parsed: VehicleStatus = raw.parse().unwrap();
            assert_eq!(parsed.as_str(), raw);
        }
    }

    #[test]
    fn test_vehicle_serializes_camel_case() {
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            name: "MVX003".to_string(),
            plate: None,
            vehicle_type: VehicleType::Empilhadeira,
            status: VehicleStatus::Disponivel,
            location: "PMO".to_string(),
            notes: None,
            last_updated: Utc::now(),
            updated_by: "system".to_string(),
        };

        let json = serde_json::to_value(&vehicle).unwrap();
        assert_eq!(json["type"], "EMPILHADEIRA");
        assert_eq!(json["status"], "DISPONIVEL");
        assert!(json.get("lastUpdated").is_some());
        assert!(json.get("updatedBy").is_some());
        assert!(json.get("plate").is_none());
    }
}
