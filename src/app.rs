use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::shared::AppState;
use crate::websockets::websocket_handler;

/// Builds the application router: the status endpoint and the WebSocket
/// event channel
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(server_status))
        .route("/ws", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Static status payload for the unauthenticated root endpoint
async fn server_status() -> Json<Value> {
    Json(json!({
        "message": "Chat relay server is running",
        "status": "ok",
    }))
}
