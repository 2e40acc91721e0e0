use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chatrelay::room::{start_cleanup_task, CleanupConfig, RoomRegistry};
use chatrelay::shared::AppState;
use chatrelay::websockets::{ChatGateway, ConnectionManager, InMemoryConnectionManager};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chatrelay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting chat relay server");

    // The registry task is the single owner of all room state
    let registry = RoomRegistry::spawn();
    let connection_manager: Arc<dyn ConnectionManager> =
        Arc::new(InMemoryConnectionManager::new());
    let gateway = Arc::new(ChatGateway::new(
        registry.clone(),
        connection_manager.clone(),
    ));
    let app_state = AppState::new(connection_manager, gateway);

    // Background sweep for rooms nobody has touched in a while
    tokio::spawn(start_cleanup_task(registry, CleanupConfig::default()));

    let app = chatrelay::app::router(app_state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .unwrap();
    info!(port = port, "Server running");
    axum::serve(listener, app).await.unwrap();
}
