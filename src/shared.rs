use std::sync::Arc;
use thiserror::Error;

use crate::websockets::{ChatGateway, ConnectionManager};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub connection_manager: Arc<dyn ConnectionManager>,
    pub gateway: Arc<ChatGateway>,
}

impl AppState {
    pub fn new(connection_manager: Arc<dyn ConnectionManager>, gateway: Arc<ChatGateway>) -> Self {
        Self {
            connection_manager,
            gateway,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Room {0} not found")]
    RoomNotFound(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Room registry unavailable")]
    RegistryUnavailable,
}
