use serde::{Deserialize, Serialize};

use crate::room::models::MessageModel;

/// Client-to-server events, tagged by wire name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Create a room; no payload
    #[serde(rename = "createRoom")]
    CreateRoom,

    /// Join a room; the payload is a JSON string `{roomId, name}`
    #[serde(rename = "join-room")]
    JoinRoom(String),

    /// Send a message; the payload is an object `{roomId, content, senderId, sender}`
    /// (a JSON string carrying the same object is also accepted)
    #[serde(rename = "sendMessage")]
    SendMessage(serde_json::Value),
}

/// Server-to-client events, tagged by wire name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "roomCreated")]
    RoomCreated(String),

    #[serde(rename = "joinedRoom")]
    JoinedRoom(RoomSnapshot),

    #[serde(rename = "user-joined")]
    UserJoined(usize),

    #[serde(rename = "user-left")]
    UserLeft(usize),

    #[serde(rename = "message")]
    Message(MessageModel),

    #[serde(rename = "error")]
    Error(ErrorPayload),
}

/// Inner payload of a `join-room` event
///
/// Absent fields deserialize to empty strings so that "missing" and
/// "empty" fail the same validation.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinRoomPayload {
    #[serde(rename = "roomId", default)]
    pub room_id: String,
    #[serde(default)]
    pub name: String,
}

/// Inner payload of a `sendMessage` event
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    #[serde(default)]
    pub room_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub sender_id: String,
    #[serde(default)]
    pub sender: String,
}

/// Point-in-time view of a room returned to a newly joined connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_id: String,
    pub users: Vec<String>,
    pub user_size: usize,
    pub messages: Vec<MessageModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorPayload {
    pub message: String,
}

/// Helper constructors for server events
impl ServerEvent {
    pub fn room_created(code: String) -> Self {
        ServerEvent::RoomCreated(code)
    }

    pub fn joined_room(snapshot: RoomSnapshot) -> Self {
        ServerEvent::JoinedRoom(snapshot)
    }

    pub fn user_joined(member_count: usize) -> Self {
        ServerEvent::UserJoined(member_count)
    }

    pub fn user_left(member_count: usize) -> Self {
        ServerEvent::UserLeft(member_count)
    }

    pub fn message(message: MessageModel) -> Self {
        ServerEvent::Message(message)
    }

    pub fn error(message: String) -> Self {
        ServerEvent::Error(ErrorPayload { message })
    }
}
