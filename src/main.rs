use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use dotenvy::dotenv;
use tokio::signal;
use tokio::sync::Mutex;
use tracing::{error, info};

use fleet_sync::config::environment::EnvironmentConfig;
use fleet_sync::database;
use fleet_sync::database::connection::mask_database_url;
use fleet_sync::middleware::cors::cors_middleware;
use fleet_sync::repositories::{FleetRepository, PgFleetRepository};
use fleet_sync::routes;
use fleet_sync::services::{seed, AuditLedger, EntityStore, PresenceTracker, SyncHub};
use fleet_sync::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("🚛 Fleet Sync - Control de flota en tiempo real");
    info!("===============================================");

    let config = EnvironmentConfig::from_env();
    info!("🗄️  Base de datos: {}", mask_database_url(&config.database_url));

    // Inicializar base de datos
    let pool = match database::create_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let pg_repository = PgFleetRepository::new(pool);
    if let Err(e) = pg_repository.ensure_schema().await {
        error!("❌ Error preparando el esquema: {}", e);
        return Err(anyhow::anyhow!("Error de esquema: {}", e));
    }

    let repository: Arc<dyn FleetRepository> = Arc::new(pg_repository);

    // Sembrar flota por defecto si la base está vacía
    if let Err(e) = seed::seed_if_empty(&repository).await {
        error!("❌ Error sembrando datos iniciales: {}", e);
    }

    // Núcleo: store + ledger + presencia + coordinador
    let ledger = AuditLedger::new(repository.clone());
    let store = Arc::new(EntityStore::new(repository, ledger.clone()));
    let presence = Arc::new(Mutex::new(PresenceTracker::new()));
    let hub = SyncHub::spawn(store.clone(), ledger.clone(), presence.clone());

    let app_state = AppState::new(store, ledger, presence, hub, config.clone());

    let app = Router::new()
        .nest("/api", routes::fleet_routes::create_fleet_router())
        .merge(routes::ws_routes::create_ws_router())
        .layer(cors_middleware())
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /api/health - Health check");
    info!("   GET  /api/vehicles - Listar vehículos");
    info!("   GET  /api/groups - Agrupamientos por tipo/ubicación");
    info!("   GET  /api/audit?limit=N - Historial reciente");
    info!("   GET  /api/users - Operadores conectados");
    info!("📡 Tiempo real:");
    info!("   GET  /ws - Websocket de sincronización");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
