use serde_json::json;
use std::sync::Arc;

use chatrelay::{
    ChatGateway, ConnectionManager, MessageHandler, RegistryHandle, RoomRegistry, ServerEvent,
};

use super::mocks::MockConnectionManager;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// A gateway wired to a fresh registry and a mock connection manager,
/// with action helpers that speak the wire protocol
pub struct TestSetup {
    pub registry: RegistryHandle,
    pub connections: Arc<MockConnectionManager>,
    pub gateway: ChatGateway,
}

impl TestSetup {
    pub fn new() -> Self {
        let registry = RoomRegistry::spawn();
        let connections = Arc::new(MockConnectionManager::new());
        let manager: Arc<dyn ConnectionManager> = connections.clone();
        let gateway = ChatGateway::new(registry.clone(), manager);

        Self {
            registry,
            connections,
            gateway,
        }
    }

    /// Send a raw `createRoom` event and return the code from the reply
    pub async fn create_room(&self, connection_id: &str) -> String {
        self.gateway
            .handle_message(connection_id, json!({"event": "createRoom"}).to_string())
            .await;

        let events = self.connections.events_for(connection_id).await;
        match events.last() {
            Some(ServerEvent::RoomCreated(code)) => code.clone(),
            other => panic!("Expected roomCreated reply, got {:?}", other),
        }
    }

    /// Send a `join-room` event (payload is the double-encoded JSON string
    /// the protocol expects)
    pub async fn join_room(&self, connection_id: &str, code: &str, name: &str) {
        let inner = json!({"roomId": code, "name": name}).to_string();
        self.gateway
            .handle_message(
                connection_id,
                json!({"event": "join-room", "data": inner}).to_string(),
            )
            .await;
    }

    /// Send a `sendMessage` event; the sender id is the connection id
    pub async fn send_message(&self, connection_id: &str, code: &str, content: &str, sender: &str) {
        self.gateway
            .handle_message(
                connection_id,
                json!({
                    "event": "sendMessage",
                    "data": {
                        "roomId": code,
                        "content": content,
                        "senderId": connection_id,
                        "sender": sender,
                    }
                })
                .to_string(),
            )
            .await;
    }

    pub async fn disconnect(&self, connection_id: &str) {
        self.gateway.handle_disconnect(connection_id).await;
    }

    pub async fn clear_messages(&self) {
        self.connections.clear_messages().await;
    }

    pub async fn events_for(&self, connection_id: &str) -> Vec<ServerEvent> {
        self.connections.events_for(connection_id).await
    }
}

impl Default for TestSetup {
    fn default() -> Self {
        Self::new()
    }
}
