use tokio::signal;
use tracing::{info, warn};

use crate::entity::EntityRegistry;

/// 等待 Ctrl+C
///
/// 每次 put 都已落盘，关闭时无需刷写。
pub async fn listen_for_shutdown(registry: &EntityRegistry) {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }

    info!(
        "Shutting down with {} active entities ({} backend)",
        registry.len(),
        registry.backend_name()
    );
}
