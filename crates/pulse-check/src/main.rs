use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use pulse_check::{api, JsonFileStore, ServiceRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| ".".to_string());
    let state_file = Path::new(&data_dir).join("services.json");
    tracing::info!("Using state file at {}", state_file.display());

    // A corrupt state file is fatal here: refusing to start beats silently
    // discarding the registry.
    let store = JsonFileStore::new(&state_file);
    let registry = Arc::new(
        ServiceRegistry::new(Box::new(store))
            .with_context(|| format!("failed to load state from {}", state_file.display()))?,
    );

    spawn_interval_ping(registry.clone());

    let app = api::router(registry);

    let addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("Pulse Check listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Optional built-in poller. When PING_INTERVAL_SECS is set to a positive
/// number, probe all services on that interval instead of relying on a
/// client to drive /ping.
fn spawn_interval_ping(registry: Arc<pulse_check::ServiceRegistry>) {
    let value = match std::env::var("PING_INTERVAL_SECS") {
        Ok(value) => value,
        Err(_) => return,
    };

    let secs = match value.parse::<u64>() {
        Ok(secs) if secs > 0 => secs,
        Ok(_) => return,
        Err(_) => {
            tracing::warn!("Ignoring invalid PING_INTERVAL_SECS: {}", value);
            return;
        }
    };

    tracing::info!("Pinging all services every {} seconds", secs);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(secs));
        // The first tick fires immediately; skip it so startup stays quick.
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) = registry.ping_all().await {
                tracing::error!("Scheduled ping run failed to persist: {}", e);
            }
        }
    });
}
