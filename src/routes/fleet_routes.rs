//! Frontera de consulta REST
//!
//! Lecturas puras sobre los componentes del núcleo; ninguna de estas
//! rutas muta estado ni emite broadcasts.

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::models::{AuditEntry, Operator, Vehicle, VehicleGroup};
use crate::services::aggregator;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_fleet_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/vehicles", get(list_vehicles))
        .route("/groups", get(list_groups))
        .route("/audit", get(recent_audit))
        .route("/users", get(active_users))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn list_vehicles(State(state): State<AppState>) -> Result<Json<Vec<Vehicle>>, AppError> {
    let vehicles = state.store.list().await?;
    Ok(Json(vehicles))
}

async fn list_groups(State(state): State<AppState>) -> Result<Json<Vec<VehicleGroup>>, AppError> {
    let vehicles = state.store.list().await?;
    Ok(Json(aggregator::group_vehicles(&vehicles)))
}

#[derive(Debug, Deserialize)]
struct AuditQuery {
    limit: Option<i64>,
}

async fn recent_audit(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    let limit = query.limit.unwrap_or(50);
    let entries = state.ledger.recent(limit).await?;
    Ok(Json(entries))
}

async fn active_users(State(state): State<AppState>) -> Json<Vec<Operator>> {
    let operators = state.presence.lock().await.list();
    Json(operators)
}
