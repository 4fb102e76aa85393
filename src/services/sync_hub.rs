//! Núcleo de coordinación en tiempo real
//!
//! Una sola tarea coordinadora consume la cola de comandos y es dueña del
//! registro de conexiones: todas las intenciones quedan serializadas en
//! una línea de tiempo única, y cada broadcast se computa de una lectura
//! posterior a la persistencia de su mutación, nunca especulativamente.
//!
//! Cualquier fallo interno se convierte en un evento `error` solo para la
//! conexión que originó la intención; jamás interrumpe al resto.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{error, info};
use uuid::Uuid;

use crate::dto::{CreateVehicleData, ServerEvent, VehicleChanges};
use crate::services::aggregator;
use crate::services::{AuditLedger, EntityStore, PresenceTracker};
use crate::utils::errors::AppResult;

/// Ventana de historial que acompaña snapshots y broadcasts de mutación
pub const AUDIT_WINDOW: i64 = 20;

/// Intenciones que procesa el coordinador
#[derive(Debug)]
pub enum HubCommand {
    Register {
        connection_id: Uuid,
        sender: mpsc::UnboundedSender<ServerEvent>,
    },
    Join {
        connection_id: Uuid,
        name: String,
    },
    UpdateVehicle {
        connection_id: Uuid,
        vehicle_id: Uuid,
        changes: VehicleChanges,
        user_id: String,
        user_name: String,
    },
    CreateVehicle {
        connection_id: Uuid,
        data: CreateVehicleData,
        user_id: String,
        user_name: String,
    },
    AuditRequest {
        connection_id: Uuid,
        limit: i64,
    },
    Disconnect {
        connection_id: Uuid,
    },
}

/// Handle clonable para encolar comandos al coordinador
#[derive(Clone)]
pub struct HubHandle {
    tx: mpsc::UnboundedSender<HubCommand>,
}

impl HubHandle {
    pub fn send(&self, command: HubCommand) {
        // Si el coordinador murió no hay a quién reportar
        let _ = self.tx.send(command);
    }
}

pub struct SyncHub {
    store: Arc<EntityStore>,
    ledger: AuditLedger,
    presence: Arc<Mutex<PresenceTracker>>,
    connections: HashMap<Uuid, mpsc::UnboundedSender<ServerEvent>>,
    commands: mpsc::UnboundedReceiver<HubCommand>,
}

impl SyncHub {
    /// Lanzar la tarea coordinadora y devolver su handle
    pub fn spawn(
        store: Arc<EntityStore>,
        ledger: AuditLedger,
        presence: Arc<Mutex<PresenceTracker>>,
    ) -> HubHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let hub = SyncHub {
            store,
            ledger,
            presence,
            connections: HashMap::new(),
            commands: rx,
        };
        tokio::spawn(hub.run());
        HubHandle { tx }
    }

    async fn run(mut self) {
        // Un registro de conexiones vivas no tiene sentido entre reinicios
        self.presence.lock().await.clear();

        while let Some(command) = self.commands.recv().await {
            self.handle(command).await;
        }
    }

    async fn handle(&mut self, command: HubCommand) {
        match command {
            HubCommand::Register { connection_id, sender } => {
                self.connections.insert(connection_id, sender);
            }

            HubCommand::Join { connection_id, name } => {
                let operator = self.presence.lock().await.join(&name, connection_id);
                info!("👤 Operador {} conectado con id {}", name, operator.id);

                match self.initial_snapshot().await {
                    Ok(snapshot) => self.send_to(connection_id, snapshot),
                    Err(e) => {
                        error!("Error loading initial data: {}", e);
                        self.send_to(
                            connection_id,
                            ServerEvent::Error {
                                message: "Failed to load initial data".to_string(),
                            },
                        );
                    }
                }

                let operators = self.presence.lock().await.list();
                self.broadcast(ServerEvent::UsersUpdate(operators));
            }

            HubCommand::UpdateVehicle {
                connection_id,
                vehicle_id,
                changes,
                user_id,
                user_name,
            } => {
                match self.apply_update(vehicle_id, changes, &user_id, &user_name).await {
                    Ok((vehicle_event, audit_event)) => {
                        // Vehículo y grupos viajan juntos; el historial va
                        // como mensaje aparte, en ese orden
                        self.broadcast(vehicle_event);
                        self.broadcast(audit_event);
                    }
                    Err(e) => {
                        error!("Error updating vehicle {}: {}", vehicle_id, e);
                        self.send_to(
                            connection_id,
                            ServerEvent::Error {
                                message: format!("Failed to update vehicle: {}", e),
                            },
                        );
                    }
                }
            }

            HubCommand::CreateVehicle {
                connection_id,
                data,
                user_id,
                user_name,
            } => {
                match self.apply_create(data, &user_id, &user_name).await {
                    Ok((vehicle_event, audit_event)) => {
                        self.broadcast(vehicle_event);
                        self.broadcast(audit_event);
                    }
                    Err(e) => {
                        error!("Error creating vehicle: {}", e);
                        self.send_to(
                            connection_id,
                            ServerEvent::Error {
                                message: "Failed to create vehicle".to_string(),
                            },
                        );
                    }
                }
            }

            HubCommand::AuditRequest { connection_id, limit } => {
                match self.ledger.recent(limit).await {
                    Ok(entries) => self.send_to(connection_id, ServerEvent::AuditHistory(entries)),
                    Err(e) => {
                        error!("Error getting audit history: {}", e);
                        self.send_to(
                            connection_id,
                            ServerEvent::Error {
                                message: "Failed to load audit history".to_string(),
                            },
                        );
                    }
                }
            }

            HubCommand::Disconnect { connection_id } => {
                self.connections.remove(&connection_id);

                let removed = self.presence.lock().await.leave(connection_id);
                if let Some(operator) = removed {
                    info!("👤 Operador {} desconectado", operator.name);
                    let operators = self.presence.lock().await.list();
                    self.broadcast(ServerEvent::UsersUpdate(operators));
                }
            }
        }
    }

    /// Snapshot completo para una conexión recién unida
    async fn initial_snapshot(&self) -> AppResult<ServerEvent> {
        let vehicles = self.store.list().await?;
        let groups = aggregator::group_vehicles(&vehicles);
        let audit_history = self.ledger.recent(AUDIT_WINDOW).await?;

        Ok(ServerEvent::FleetInitial {
            vehicles,
            groups,
            audit_history,
        })
    }

    /// Mutación + lecturas post-persistencia de las que derivan ambos
    /// broadcasts; si algo falla acá no se emite nada
    async fn apply_update(
        &self,
        vehicle_id: Uuid,
        changes: VehicleChanges,
        user_id: &str,
        user_name: &str,
    ) -> AppResult<(ServerEvent, ServerEvent)> {
        let vehicle = self.store.update(vehicle_id, changes, user_id, user_name).await?;

        let vehicles = self.store.list().await?;
        let groups = aggregator::group_vehicles(&vehicles);
        let audit = self.ledger.recent(AUDIT_WINDOW).await?;

        info!("🚜 Vehículo {} actualizado por {}", vehicle.name, user_name);

        Ok((
            ServerEvent::VehicleUpdated { vehicle, groups },
            ServerEvent::AuditUpdate(audit),
        ))
    }

    async fn apply_create(
        &self,
        data: CreateVehicleData,
        user_id: &str,
        user_name: &str,
    ) -> AppResult<(ServerEvent, ServerEvent)> {
        let vehicle = self.store.create(data, user_id, user_name).await?;

        let vehicles = self.store.list().await?;
        let groups = aggregator::group_vehicles(&vehicles);
        let audit = self.ledger.recent(AUDIT_WINDOW).await?;

        info!("🚜 Vehículo {} creado por {}", vehicle.name, user_name);

        Ok((
            ServerEvent::VehicleCreated { vehicle, groups },
            ServerEvent::AuditUpdate(audit),
        ))
    }

    /// Entrega a una conexión puntual, sin garantía de recepción
    fn send_to(&mut self, connection_id: Uuid, event: ServerEvent) {
        if let Some(sender) = self.connections.get(&connection_id) {
            if sender.send(event).is_err() {
                self.connections.remove(&connection_id);
            }
        }
    }

    /// Entrega best-effort a todos los observadores; los canales cerrados
    /// se descartan del registro
    fn broadcast(&mut self, event: ServerEvent) {
        self.connections
            .retain(|_, sender| sender.send(event.clone()).is_ok());
    }
}
