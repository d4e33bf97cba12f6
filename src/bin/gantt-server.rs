//! gantt-bridge service binary.
//!
//! Standalone HTTP service bridging the host project store and the Gantt
//! widget.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gantt_bridge::{build_router, AppState, Config, FrappeStore, HostStore, SettingsProvider};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("gantt_bridge=info".parse()?))
        .init();

    info!("Starting gantt-bridge service...");

    // Load configuration
    let config = Config::default();

    if config.api_key.is_none() || config.api_secret.is_none() {
        info!("No FRAPPE_API_KEY/FRAPPE_API_SECRET configured - host requests will be unauthenticated");
    }

    // Host store client
    let store: Arc<dyn HostStore> = Arc::new(
        FrappeStore::new(&config).context("Failed to create host store client")?,
    );
    info!(host = %config.frappe_url, "Connected host store client");

    // Settings cache
    let settings = Arc::new(SettingsProvider::with_ttl(
        store.clone(),
        Duration::from_secs(config.settings_cache_ttl_secs),
    ));

    // Build application state
    let state = AppState {
        config: config.clone(),
        store,
        settings,
    };

    // Build router
    let app = build_router(state);

    // Bind and serve
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(port = config.port, "gantt-bridge listening");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
