//! Server setup

use std::sync::Arc;

use marcus_core::Settings;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{AppState, ElasticsearchBackend, Error, create_router};

/// Run the gateway until Ctrl-C is received.
///
/// # Errors
///
/// Returns an error if the backend cannot be configured, the address cannot
/// be bound, or the server fails.
pub async fn run_server(settings: Settings) -> Result<(), Error> {
    let backend = ElasticsearchBackend::new(&settings.elasticsearch)?;
    let bind_address = settings.server.bind_address.clone();
    info!("Forwarding searches to {}", settings.elasticsearch.url);

    let app = create_router(AppState::new(Arc::new(backend), settings))?;

    let listener = TcpListener::bind(&bind_address).await?;
    info!("Marcus search gateway listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
