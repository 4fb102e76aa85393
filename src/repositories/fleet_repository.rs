//! Repositorio de flota
//!
//! Contrato de persistencia que consume el núcleo (EntityStore/AuditLedger)
//! y su implementación sobre PostgreSQL. El orden importa: los vehículos se
//! listan por nombre y el historial por timestamp descendente.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{AuditEntry, Vehicle};
use crate::utils::errors::{AppError, AppResult};

#[async_trait]
pub trait FleetRepository: Send + Sync {
    /// Todos los vehículos, ordenados por nombre
    async fn get_all_vehicles(&self) -> AppResult<Vec<Vehicle>>;

    async fn get_vehicle_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>>;

    async fn insert_vehicle(&self, vehicle: &Vehicle) -> AppResult<()>;

    /// Escritura completa del registro ya fusionado (last-writer-wins)
    async fn update_vehicle(&self, vehicle: &Vehicle) -> AppResult<()>;

    async fn vehicle_count(&self) -> AppResult<i64>;

    async fn insert_audit_entry(&self, entry: &AuditEntry) -> AppResult<()>;

    /// Historial reciente, más nuevo primero, a lo sumo `limit` entradas
    async fn get_recent_audit(&self, limit: i64) -> AppResult<Vec<AuditEntry>>;
}

// Structs intermedios para sqlx: tipo/estado/acción viajan como TEXT
#[derive(Debug, sqlx::FromRow)]
struct VehicleRow {
    id: Uuid,
    name: String,
    plate: Option<String>,
    vehicle_type: String,
    status: String,
    location: String,
    notes: Option<String>,
    last_updated: DateTime<Utc>,
    updated_by: String,
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = AppError;

    fn try_from(row: VehicleRow) -> Result<Self, Self::Error> {
        Ok(Vehicle {
            id: row.id,
            name: row.name,
            plate: row.plate,
            vehicle_type: row.vehicle_type.parse().map_err(AppError::Internal)?,
            status: row.status.parse().map_err(AppError::Internal)?,
            location: row.location,
            notes: row.notes,
            last_updated: row.last_updated,
            updated_by: row.updated_by,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    vehicle_id: Uuid,
    vehicle_name: String,
    action: String,
    field: String,
    old_value: String,
    new_value: String,
    timestamp: DateTime<Utc>,
    user_id: String,
    user_name: String,
}

impl TryFrom<AuditRow> for AuditEntry {
    type Error = AppError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        Ok(AuditEntry {
            id: row.id,
            vehicle_id: row.vehicle_id,
            vehicle_name: row.vehicle_name,
            action: row.action.parse().map_err(AppError::Internal)?,
            field: row.field,
            old_value: row.old_value,
            new_value: row.new_value,
            timestamp: row.timestamp,
            user_id: row.user_id,
            user_name: row.user_name,
        })
    }
}

pub struct PgFleetRepository {
    pool: PgPool,
}

impl PgFleetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Crear tablas e índices si no existen
    pub async fn ensure_schema(&self) -> AppResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS vehicles (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                plate TEXT,
                vehicle_type TEXT NOT NULL,
                status TEXT NOT NULL,
                location TEXT NOT NULL,
                notes TEXT,
                last_updated TIMESTAMPTZ NOT NULL,
                updated_by TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Error creating vehicles table: {}", e)))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS audit_entries (
                id UUID PRIMARY KEY,
                vehicle_id UUID NOT NULL,
                vehicle_name TEXT NOT NULL,
                action TEXT NOT NULL,
                field TEXT NOT NULL,
                old_value TEXT NOT NULL DEFAULT '',
                new_value TEXT NOT NULL DEFAULT '',
                timestamp TIMESTAMPTZ NOT NULL,
                user_id TEXT NOT NULL,
                user_name TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Error creating audit_entries table: {}", e)))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_vehicles_type_location ON vehicles (vehicle_type, location)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Error creating index: {}", e)))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_entries (timestamp DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Error creating index: {}", e)))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_audit_vehicle ON audit_entries (vehicle_id)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Error creating index: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl FleetRepository for PgFleetRepository {
    async fn get_all_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        let rows = sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Error listing vehicles: {}", e)))?;

        rows.into_iter().map(Vehicle::try_from).collect()
    }

    async fn get_vehicle_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let row = sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Error finding vehicle: {}", e)))?;

        row.map(Vehicle::try_from).transpose()
    }

    async fn insert_vehicle(&self, vehicle: &Vehicle) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO vehicles (id, name, plate, vehicle_type, status, location, notes, last_updated, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(vehicle.id)
        .bind(&vehicle.name)
        .bind(&vehicle.plate)
        .bind(vehicle.vehicle_type.as_str())
        .bind(vehicle.status.as_str())
        .bind(&vehicle.location)
        .bind(&vehicle.notes)
        .bind(vehicle.last_updated)
        .bind(&vehicle.updated_by)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Error creating vehicle: {}", e)))?;

        Ok(())
    }

    async fn update_vehicle(&self, vehicle: &Vehicle) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE vehicles
            SET name = $2, plate = $3, vehicle_type = $4, status = $5,
                location = $6, notes = $7, last_updated = $8, updated_by = $9
            WHERE id = $1
            "#,
        )
        .bind(vehicle.id)
        .bind(&vehicle.name)
        .bind(&vehicle.plate)
        .bind(vehicle.vehicle_type.as_str())
        .bind(vehicle.status.as_str())
        .bind(&vehicle.location)
        .bind(&vehicle.notes)
        .bind(vehicle.last_updated)
        .bind(&vehicle.updated_by)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Error updating vehicle: {}", e)))?;

        Ok(())
    }

    async fn vehicle_count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM vehicles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Error counting vehicles: {}", e)))?;

        Ok(result.0)
    }

    async fn insert_audit_entry(&self, entry: &AuditEntry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_entries (id, vehicle_id, vehicle_name, action, field, old_value, new_value, timestamp, user_id, user_name)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(entry.id)
        .bind(entry.vehicle_id)
        .bind(&entry.vehicle_name)
        .bind(entry.action.as_str())
        .bind(&entry.field)
        .bind(&entry.old_value)
        .bind(&entry.new_value)
        .bind(entry.timestamp)
        .bind(&entry.user_id)
        .bind(&entry.user_name)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Error inserting audit entry: {}", e)))?;

        Ok(())
    }

    async fn get_recent_audit(&self, limit: i64) -> AppResult<Vec<AuditEntry>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            "SELECT * FROM audit_entries ORDER BY timestamp DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Error loading audit history: {}", e)))?;

        rows.into_iter().map(AuditEntry::try_from).collect()
    }
}
