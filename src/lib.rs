// Library crate for the chat relay server
// This file exposes the public API for integration tests

pub mod app;
pub mod room;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use room::models::{MessageModel, RoomMember, RoomModel};
pub use room::registry::{
    AppendOutcome, JoinOutcome, LeaveOutcome, RegistryHandle, RoomDeparture, RoomRegistry,
};
pub use shared::{AppError, AppState};
pub use websockets::{
    ChatGateway, ClientEvent, ConnectionManager, InMemoryConnectionManager, MessageHandler,
    RoomSnapshot, ServerEvent,
};
