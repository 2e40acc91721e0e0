use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::room::models::RoomMember;
use crate::room::registry::{AppendOutcome, JoinOutcome, RegistryHandle};
use crate::shared::AppError;

use super::connection_manager::ConnectionManager;
use super::messages::{
    ClientEvent, JoinRoomPayload, RoomSnapshot, SendMessagePayload, ServerEvent,
};
use super::socket::MessageHandler;

/// Per-connection event handling: parses inbound events, validates them,
/// applies them to the room registry and broadcasts the results to the
/// affected room. Errors go to the originating connection only.
pub struct ChatGateway {
    registry: RegistryHandle,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl ChatGateway {
    pub fn new(registry: RegistryHandle, connection_manager: Arc<dyn ConnectionManager>) -> Self {
        Self {
            registry,
            connection_manager,
        }
    }

    async fn send_event(&self, connection_id: &str, event: &ServerEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            self.connection_manager
                .send_to_connection(connection_id, &json)
                .await;
        }
    }

    async fn broadcast_event(&self, recipients: &[String], event: &ServerEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            self.connection_manager
                .send_to_connections(recipients, &json)
                .await;
        }
    }

    async fn send_error(&self, connection_id: &str, error: &AppError) {
        debug!(
            connection_id = %connection_id,
            error = %error,
            "Reporting error to connection"
        );
        self.send_event(connection_id, &ServerEvent::error(error.to_string()))
            .await;
    }

    async fn handle_create_room(&self, connection_id: &str) {
        match self.registry.create_room().await {
            Ok(code) => {
                info!(
                    connection_id = %connection_id,
                    room_code = %code,
                    "Room created for connection"
                );
                self.send_event(connection_id, &ServerEvent::room_created(code))
                    .await;
            }
            Err(e) => {
                warn!(connection_id = %connection_id, error = %e, "Room creation failed");
                self.send_error(connection_id, &e).await;
            }
        }
    }

    async fn handle_join_room(&self, connection_id: &str, raw_payload: &str) {
        let payload: JoinRoomPayload = match serde_json::from_str(raw_payload) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(
                    connection_id = %connection_id,
                    error = %e,
                    "Malformed join-room payload"
                );
                self.send_error(
                    connection_id,
                    &AppError::InvalidPayload("malformed join-room payload".to_string()),
                )
                .await;
                return;
            }
        };

        if payload.room_id.is_empty() {
            self.send_error(
                connection_id,
                &AppError::InvalidPayload("roomId is required".to_string()),
            )
            .await;
            return;
        }

        let member = RoomMember {
            connection_id: connection_id.to_string(),
            display_name: payload.name.clone(),
        };

        match self.registry.join_room(&payload.room_id, member).await {
            Ok(JoinOutcome::Joined(room)) => {
                info!(
                    connection_id = %connection_id,
                    room_code = %room.code,
                    name = %payload.name,
                    member_count = room.member_count(),
                    "Connection joined room"
                );

                let snapshot = RoomSnapshot {
                    room_id: room.code.clone(),
                    users: room.display_names(),
                    user_size: room.member_count(),
                    messages: room.messages.clone(),
                };
                self.send_event(connection_id, &ServerEvent::joined_room(snapshot))
                    .await;

                // Everyone in the room, the joiner included, sees the new count
                self.broadcast_event(&room.member_ids(), &ServerEvent::user_joined(room.member_count()))
                    .await;
            }
            Ok(JoinOutcome::RoomNotFound) => {
                self.send_error(connection_id, &AppError::RoomNotFound(payload.room_id))
                    .await;
            }
            Err(e) => {
                warn!(connection_id = %connection_id, error = %e, "Join failed");
                self.send_error(connection_id, &e).await;
            }
        }
    }

    async fn handle_send_message(&self, connection_id: &str, value: serde_json::Value) {
        // The payload is normally an object, but a JSON string carrying the
        // same object is accepted for clients that double-encode
        let parsed: Result<SendMessagePayload, _> = match value {
            serde_json::Value::String(raw) => serde_json::from_str(&raw),
            other => serde_json::from_value(other),
        };

        let payload = match parsed {
            Ok(payload) => payload,
            Err(e) => {
                warn!(
                    connection_id = %connection_id,
                    error = %e,
                    "Malformed sendMessage payload"
                );
                self.send_error(
                    connection_id,
                    &AppError::InvalidPayload("invalid message format".to_string()),
                )
                .await;
                return;
            }
        };

        if payload.room_id.is_empty()
            || payload.content.is_empty()
            || payload.sender_id.is_empty()
            || payload.sender.is_empty()
        {
            self.send_error(
                connection_id,
                &AppError::InvalidPayload("missing required message fields".to_string()),
            )
            .await;
            return;
        }

        let outcome = self
            .registry
            .append_message(
                &payload.room_id,
                payload.content,
                payload.sender_id,
                payload.sender,
            )
            .await;

        match outcome {
            Ok(AppendOutcome::Stored {
                message,
                recipients,
            }) => {
                debug!(
                    connection_id = %connection_id,
                    room_code = %payload.room_id,
                    message_id = %message.id,
                    recipients = recipients.len(),
                    "Broadcasting message to room"
                );
                self.broadcast_event(&recipients, &ServerEvent::message(message))
                    .await;
            }
            Ok(AppendOutcome::RoomNotFound) => {
                self.send_error(connection_id, &AppError::RoomNotFound(payload.room_id))
                    .await;
            }
            Err(e) => {
                warn!(connection_id = %connection_id, error = %e, "Message append failed");
                self.send_error(connection_id, &e).await;
            }
        }
    }

    /// Removes the connection from every room it joined and notifies the
    /// remaining members. Safe to call for connections that never joined.
    pub async fn handle_disconnect(&self, connection_id: &str) {
        match self.registry.disconnect(connection_id).await {
            Ok(departures) => {
                for departure in departures {
                    info!(
                        connection_id = %connection_id,
                        room_code = %departure.code,
                        member_count = departure.member_count,
                        "Notifying room of departure"
                    );
                    self.broadcast_event(
                        &departure.recipients,
                        &ServerEvent::user_left(departure.member_count),
                    )
                    .await;
                }
            }
            Err(e) => {
                warn!(
                    connection_id = %connection_id,
                    error = %e,
                    "Disconnect cleanup failed"
                );
            }
        }
    }
}

#[async_trait]
impl MessageHandler for ChatGateway {
    async fn handle_message(&self, connection_id: &str, message: String) {
        debug!(
            connection_id = %connection_id,
            message = %message,
            "Received message"
        );

        match serde_json::from_str::<ClientEvent>(&message) {
            Ok(ClientEvent::CreateRoom) => self.handle_create_room(connection_id).await,
            Ok(ClientEvent::JoinRoom(payload)) => {
                self.handle_join_room(connection_id, &payload).await
            }
            Ok(ClientEvent::SendMessage(value)) => {
                self.handle_send_message(connection_id, value).await
            }
            Err(e) => {
                warn!(
                    connection_id = %connection_id,
                    error = %e,
                    "Failed to parse client event"
                );
                self.send_error(
                    connection_id,
                    &AppError::InvalidPayload("invalid message format".to_string()),
                )
                .await;
            }
        }
    }
}
