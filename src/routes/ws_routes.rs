//! Frontera de transporte en tiempo real
//!
//! Cada conexión websocket obtiene un id fresco, se registra en el hub y
//! corre un puente: frames JSON entrantes se traducen a comandos del
//! coordinador, eventos salientes llegan por un canal propio. El frame
//! malformado responde con un evento `error` solo a esa conexión.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::{ClientEvent, ServerEvent};
use crate::services::{HubCommand, HubHandle};
use crate::state::AppState;

pub fn create_ws_router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_handler))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state.hub.clone()))
}

fn to_command(connection_id: Uuid, event: ClientEvent) -> HubCommand {
    match event {
        ClientEvent::Join { name } => HubCommand::Join { connection_id, name },
        ClientEvent::VehicleUpdate {
            vehicle_id,
            updates,
            user_id,
            user_name,
        } => HubCommand::UpdateVehicle {
            connection_id,
            vehicle_id,
            changes: updates,
            user_id,
            user_name,
        },
        ClientEvent::VehicleCreate {
            vehicle_data,
            user_id,
            user_name,
        } => HubCommand::CreateVehicle {
            connection_id,
            data: vehicle_data,
            user_id,
            user_name,
        },
        ClientEvent::AuditRequest { limit } => HubCommand::AuditRequest { connection_id, limit },
    }
}

async fn handle_connection(mut socket: WebSocket, hub: HubHandle) {
    let connection_id = Uuid::new_v4();
    let (sender, mut outbound) = mpsc::unbounded_channel::<ServerEvent>();

    hub.send(HubCommand::Register { connection_id, sender });
    info!("🔌 Conexión {} establecida", connection_id);

    loop {
        tokio::select! {
            event = outbound.recv() => {
                let Some(event) = event else { break };
                match serde_json::to_string(&event) {
                    Ok(text) => {
                        if socket.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Error serializando evento: {}", e),
                }
            }

            frame = socket.recv() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientEvent>(&text) {
                            Ok(event) => hub.send(to_command(connection_id, event)),
                            Err(e) => {
                                warn!("Frame malformado de {}: {}", connection_id, e);
                                let error = ServerEvent::Error {
                                    message: format!("Malformed message: {}", e),
                                };
                                if let Ok(text) = serde_json::to_string(&error) {
                                    let _ = socket.send(Message::Text(text)).await;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // pings y binarios se ignoran
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    hub.send(HubCommand::Disconnect { connection_id });
    info!("🔌 Conexión {} cerrada", connection_id);
}
