// Public API
pub use connection_manager::{ConnectionManager, InMemoryConnectionManager};
pub use gateway::ChatGateway;
pub use handler::websocket_handler;
pub use messages::{ClientEvent, ErrorPayload, RoomSnapshot, ServerEvent};
pub use socket::MessageHandler;

// Internal modules
mod connection_manager;
mod gateway;
mod handler;
mod messages;
mod socket;
