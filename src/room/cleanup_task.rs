use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, error, info, instrument};

use super::registry::RegistryHandle;

/// Configuration for the cleanup task
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often to run the sweep
    pub sweep_interval: Duration,
    /// How long a room must be idle before deletion
    pub inactivity_threshold: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(30 * 60), // 30 minutes
            inactivity_threshold: Duration::from_secs(24 * 60 * 60), // 24 hours
        }
    }
}

/// Starts the background task that periodically sweeps inactive rooms
#[instrument(skip(registry))]
pub async fn start_cleanup_task(registry: RegistryHandle, config: CleanupConfig) {
    info!(
        sweep_interval_secs = config.sweep_interval.as_secs(),
        inactivity_threshold_secs = config.inactivity_threshold.as_secs(),
        "Starting room cleanup background task"
    );

    let mut sweep_interval = interval(config.sweep_interval);

    loop {
        sweep_interval.tick().await;

        match registry.sweep_inactive(config.inactivity_threshold).await {
            Ok(0) => debug!("No inactive rooms to clean up"),
            Ok(deleted_count) => {
                info!(deleted_count = deleted_count, "Room cleanup completed");
            }
            Err(e) => {
                error!(error = %e, "Room cleanup sweep failed");
                // The registry is gone, nothing left to sweep
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::models::RoomMember;
    use crate::room::registry::RoomRegistry;

    #[tokio::test]
    async fn test_sweep_deletes_only_idle_rooms() {
        let registry = RoomRegistry::spawn();

        let idle = registry.create_room().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let fresh = registry.create_room().await.unwrap();
        registry
            .join_room(
                &fresh,
                RoomMember {
                    connection_id: "conn-1".to_string(),
                    display_name: "Alice".to_string(),
                },
            )
            .await
            .unwrap();

        let deleted = registry
            .sweep_inactive(Duration::from_millis(15))
            .await
            .unwrap();

        assert_eq!(deleted, 1);
        assert!(registry.get_room(&idle).await.unwrap().is_none());
        assert!(registry.get_room(&fresh).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sweep_with_no_rooms() {
        let registry = RoomRegistry::spawn();

        let deleted = registry
            .sweep_inactive(Duration::from_millis(1))
            .await
            .unwrap();

        assert_eq!(deleted, 0);
    }

    #[tokio::test]
    async fn test_default_config() {
        let config = CleanupConfig::default();
        assert_eq!(config.sweep_interval, Duration::from_secs(30 * 60));
        assert_eq!(
            config.inactivity_threshold,
            Duration::from_secs(24 * 60 * 60)
        );
    }
}
