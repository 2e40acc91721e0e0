use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::shared::AppState;

use super::socket::{Connection, MessageHandler};

/// WebSocket endpoint: GET /ws
///
/// Every accepted socket gets a fresh connection id; room association
/// happens later through `createRoom` / `join-room` events.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(socket: axum::extract::ws::WebSocket, state: AppState) {
    let connection_id = Uuid::new_v4().to_string();

    info!(
        connection_id = %connection_id,
        "WebSocket connection established"
    );

    // Create the outbound channel (app -> client) and register it so the
    // connection becomes reachable for broadcasts
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();
    state
        .connection_manager
        .add_connection(connection_id.clone(), outbound_sender)
        .await;

    let message_handler: Arc<dyn MessageHandler> = state.gateway.clone();

    let connection = Connection::new(
        connection_id.clone(),
        Box::new(socket),
        outbound_receiver,
        message_handler,
    );

    // Run the connection until disconnect
    match connection.run().await {
        Ok(()) => {
            info!(
                connection_id = %connection_id,
                "WebSocket connection closed cleanly"
            );
        }
        Err(e) => {
            warn!(
                connection_id = %connection_id,
                error = ?e,
                "WebSocket connection error"
            );
        }
    }

    // Cleanup: deregister, then leave every joined room and notify the
    // remaining members
    state
        .connection_manager
        .remove_connection(&connection_id)
        .await;
    state.gateway.handle_disconnect(&connection_id).await;

    info!(
        connection_id = %connection_id,
        "WebSocket disconnect cleanup complete"
    );
}
