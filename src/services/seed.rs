//! Carga inicial de la flota
//!
//! Si el store está vacío al arrancar se siembra la flota por defecto,
//! atribuida al operador `system`. Con datos existentes no se toca nada.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::models::{Vehicle, VehicleStatus, VehicleType};
use crate::repositories::FleetRepository;
use crate::utils::errors::AppResult;

struct SeedVehicle {
    name: &'static str,
    vehicle_type: VehicleType,
    status: VehicleStatus,
    location: &'static str,
    notes: Option<&'static str>,
}

const fn seed(
    name: &'static str,
    vehicle_type: VehicleType,
    status: VehicleStatus,
    location: &'static str,
    notes: Option<&'static str>,
) -> SeedVehicle {
    SeedVehicle { name, vehicle_type, status, location, notes }
}

const DEFAULT_FLEET: &[SeedVehicle] = &[
    // PMO
    seed("MVX003", VehicleType::Empilhadeira, VehicleStatus::Disponivel, "PMO", None),
    seed("MVX006", VehicleType::Empilhadeira, VehicleStatus::Disponivel, "PMO", None),
    // Piquete
    seed("EPM004", VehicleType::Empilhadeira, VehicleStatus::Disponivel, "Piquete", None),
    seed("EPM020", VehicleType::Empilhadeira, VehicleStatus::Disponivel, "Piquete", None),
    seed("EPM021", VehicleType::Empilhadeira, VehicleStatus::Manutencao, "Piquete", Some("EIXO QUEBRADO/SEM PREVISÃO")),
    seed("EMP027", VehicleType::Empilhadeira, VehicleStatus::Indisponivel, "Piquete", None),
    seed("EMP028", VehicleType::Empilhadeira, VehicleStatus::Disponivel, "Piquete", None),
    // Expedição
    seed("EMP029", VehicleType::Empilhadeira, VehicleStatus::Indisponivel, "Expedição", None),
    seed("MNP003", VehicleType::Empilhadeira, VehicleStatus::Disponivel, "Expedição", Some("PREVENTIVA/CORRETIVA PROGRAMADA")),
    seed("MNP002", VehicleType::Empilhadeira, VehicleStatus::Disponivel, "Expedição", None),
    seed("MVX001", VehicleType::Empilhadeira, VehicleStatus::Disponivel, "Expedição", None),
    seed("MVX002", VehicleType::Empilhadeira, VehicleStatus::Disponivel, "Expedição", None),
    seed("MVX004", VehicleType::Empilhadeira, VehicleStatus::Disponivel, "Expedição", None),
    seed("MVX005", VehicleType::Empilhadeira, VehicleStatus::Disponivel, "Expedição", None),
    seed("MVX007", VehicleType::Empilhadeira, VehicleStatus::Indisponivel, "Expedição", Some("EM FINALIZAÇÃO")),
    seed("MVX008", VehicleType::Empilhadeira, VehicleStatus::Disponivel, "Expedição", None),
    seed("MVX009", VehicleType::Empilhadeira, VehicleStatus::Disponivel, "Expedição", None),
    seed("MVX011", VehicleType::Empilhadeira, VehicleStatus::Disponivel, "Expedição", None),
    seed("MVX012", VehicleType::Empilhadeira, VehicleStatus::Disponivel, "Expedição", None),
    seed("EMP030", VehicleType::Empilhadeira, VehicleStatus::Indisponivel, "Expedição", Some("SEM PREVISÃO")),
    seed("MVX010", VehicleType::Empilhadeira, VehicleStatus::Disponivel, "Expedição", None),
    // Tratores
    seed("TRT001", VehicleType::Trator, VehicleStatus::Disponivel, "Geral", None),
    seed("TRT002", VehicleType::Trator, VehicleStatus::Indisponivel, "Geral", Some("TRANCA DO CAPU, (AVALIANDO ADAPTAÇÃO)")),
    seed("TRT003", VehicleType::Trator, VehicleStatus::Disponivel, "Geral", None),
    seed("TRT004", VehicleType::Trator, VehicleStatus::Disponivel, "Geral", None),
    seed("TRT005", VehicleType::Trator, VehicleStatus::Disponivel, "Geral", None),
    // Krane-Car
    seed("GDT001", VehicleType::KraneCar, VehicleStatus::Disponivel, "Geral", None),
    seed("GDT002", VehicleType::KraneCar, VehicleStatus::Disponivel, "Geral", None),
    seed("GDT003", VehicleType::KraneCar, VehicleStatus::Disponivel, "Geral", None),
    // Caminhões
    seed("GDT006", VehicleType::Caminhao, VehicleStatus::Disponivel, "Geral", None),
    seed("GDT007", VehicleType::Caminhao, VehicleStatus::Disponivel, "Geral", None),
    seed("GDT009", VehicleType::Caminhao, VehicleStatus::Disponivel, "Geral", None),
];

/// Sembrar la flota por defecto solo si el store está vacío. La siembra
/// inserta directo en el repositorio: no es una acción de operador y no
/// genera entradas de auditoría.
pub async fn seed_if_empty(repository: &Arc<dyn FleetRepository>) -> AppResult<()> {
    let count = repository.vehicle_count().await?;
    if count > 0 {
        info!("📊 La base ya contiene {} vehículos", count);
        return Ok(());
    }

    info!("🌱 Base vacía, sembrando flota por defecto...");
    for entry in DEFAULT_FLEET {
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            name: entry.name.to_string(),
            plate: None,
            vehicle_type: entry.vehicle_type,
            status: entry.status,
            location: entry.location.to_string(),
            notes: entry.notes.map(str::to_string),
            last_updated: Utc::now(),
            updated_by: "system".to_string(),
        };
        if let Err(e) = repository.insert_vehicle(&vehicle).await {
            error!("Error sembrando vehículo {}: {}", entry.name, e);
            return Err(e);
        }
    }

    info!("✅ Sembrados {} vehículos por defecto", DEFAULT_FLEET.len());
    Ok(())
}
