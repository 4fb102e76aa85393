//! Agrupamiento derivado de la flota
//!
//! Función pura sobre un snapshot del EntityStore: agrupa por la clave
//! compuesta (tipo, ubicación) y cuenta disponibles y totales. Se
//! recalcula completo en cada consulta, nunca se parchea incrementalmente.

use std::collections::HashMap;

use crate::models::{Vehicle, VehicleGroup, VehicleStatus, VehicleType};

/// Agrupar vehículos por (tipo, ubicación). El orden de los grupos es el
/// orden de primera aparición de cada clave recorriendo la lista canónica.
pub fn group_vehicles(vehicles: &[Vehicle]) -> Vec<VehicleGroup> {
    let mut groups: Vec<VehicleGroup> = Vec::new();
    let mut index: HashMap<(VehicleType, String), usize> = HashMap::new();

    for vehicle in vehicles {
        let key = (vehicle.vehicle_type, vehicle.location.clone());

        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(VehicleGroup {
                id: format!("{}_{}", vehicle.vehicle_type, vehicle.location),
                name: vehicle.location.clone(),
                vehicle_type: vehicle.vehicle_type,
                vehicles: Vec::new(),
                available_count: 0,
                total_count: 0,
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.vehicles.push(vehicle.clone());
        group.total_count += 1;
        if vehicle.status == VehicleStatus::Disponivel {
            group.available_count += 1;
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn vehicle(name: &str, vt: VehicleType, status: VehicleStatus, location: &str) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            name: name.to_string(),
            plate: None,
            vehicle_type: vt,
            status,
            location: location.to_string(),
            notes: None,
            last_updated: Utc::now(),
            updated_by: "system".to_string(),
        }
    }

    #[test]
    fn test_counts_per_group() {
        let vehicles = vec![
            vehicle("MVX003", VehicleType::Empilhadeira, VehicleStatus::Disponivel, "PMO"),
            vehicle("MVX006", VehicleType::Empilhadeira, VehicleStatus::Manutencao, "PMO"),
            vehicle("TRT001", VehicleType::Trator, VehicleStatus::Disponivel, "Geral"),
            vehicle("EPM004", VehicleType::Empilhadeira, VehicleStatus::Disponivel, "Piquete"),
        ];

        let groups = group_vehicles(&vehicles);
        assert_eq!(groups.len(), 3);

        let pmo = &groups[0];
        assert_eq!(pmo.id, "EMPILHADEIRA_PMO");
        assert_eq!(pmo.name, "PMO");
        assert_eq!(pmo.total_count, 2);
        assert_eq!(pmo.available_count, 1);
    }

    #[test]
    fn test_total_counts_sum_to_vehicle_count() {
        let vehicles = vec![
            vehicle("A", VehicleType::Empilhadeira, VehicleStatus::Disponivel, "PMO"),
            vehicle("B", VehicleType::Caminhao, VehicleStatus::EmUso, "Geral"),
            vehicle("C", VehicleType::Caminhao, VehicleStatus::Indisponivel, "Geral"),
            vehicle("D", VehicleType::Trator, VehicleStatus::Disponivel, "Geral"),
            vehicle("E", VehicleType::KraneCar, VehicleStatus::Disponivel, "Geral"),
        ];

        let groups = group_vehicles(&vehicles);
        let total: usize = groups.iter().map(|g| g.total_count).sum();
        assert_eq!(total, vehicles.len());

        for group in &groups {
            let available = group
                .vehicles
                .iter()
                .filter(|v| v.status == VehicleStatus::Disponivel)
                .count();
            assert_eq!(group.available_count, available);
            assert_eq!(group.total_count, group.vehicles.len());
        }
    }

    #[test]
    fn test_group_order_is_first_seen() {
        let vehicles = vec![
            vehicle("A", VehicleType::Trator, VehicleStatus::Disponivel, "Geral"),
            vehicle("B", VehicleType::Empilhadeira, VehicleStatus::Disponivel, "PMO"),
            vehicle("C", VehicleType::Trator, VehicleStatus::Disponivel, "Geral"),
        ];

        let groups = group_vehicles(&vehicles);
        assert_eq!(groups[0].id, "TRATOR_Geral");
        assert_eq!(groups[1].id, "EMPILHADEIRA_PMO");
    }

    #[test]
    fn test_same_type_different_location_splits() {
        let vehicles = vec![
            vehicle("A", VehicleType::Empilhadeira, VehicleStatus::Disponivel, "PMO"),
            vehicle("B", VehicleType::Empilhadeira, VehicleStatus::Disponivel, "Piquete"),
        ];

        let groups = group_vehicles(&vehicles);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_vehicles(&[]).is_empty());
    }

    #[test]
    fn test_only_disponivel_counts_as_available() {
        let vehicles = vec![
            vehicle("A", VehicleType::Trator, VehicleStatus::Manutencao, "Geral"),
            vehicle("B", VehicleType::Trator, VehicleStatus::Indisponivel, "Geral"),
            vehicle("C", VehicleType::Trator, VehicleStatus::EmUso, "Geral"),
        ];

        let groups = group_vehicles(&vehicles);
        assert_eq!(groups[0].available_count, 0);
        assert_eq!(groups[0].total_count, 3);
    }
}
