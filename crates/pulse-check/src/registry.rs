use std::collections::HashMap;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{RegistryError, Result};
use crate::prober::HealthProber;
use crate::service::{RegisterRequest, ServiceRecord, ServiceStatus};
use crate::store::StateStore;

/// The registry of monitored services.
///
/// Owns the name -> record map, the durable store, and the health prober.
/// Every mutating operation runs as a single locked read-modify-write-persist
/// sequence, so the durable copy never lags the in-memory map by more than
/// one operation.
pub struct ServiceRegistry {
    state: Mutex<HashMap<String, ServiceRecord>>,
    store: Box<dyn StateStore>,
    prober: HealthProber,
}

impl ServiceRegistry {
    /// Create a registry backed by the given store, loading any previously
    /// persisted services. A corrupt state file fails here, before the
    /// process starts serving.
    pub fn new(store: Box<dyn StateStore>) -> Result<Self> {
        let state = store.load()?;
        info!("Loaded {} registered services", state.len());

        Ok(Self {
            state: Mutex::new(state),
            store,
            prober: HealthProber::new(),
        })
    }

    /// Register a service, or re-register an existing one.
    ///
    /// Re-registration overwrites the description and URL and resets the
    /// status to unknown; the next ping re-derives it.
    pub async fn register(&self, request: RegisterRequest) -> Result<()> {
        request.validate()?;

        let name = request.name.clone();
        let mut services = self.state.lock().await;
        let replaced = services.insert(name.clone(), request.into_record());
        self.store.save(&services)?;

        if replaced.is_some() {
            info!("Re-registered service {}, status reset to unknown", name);
        } else {
            info!("Registered service {}", name);
        }
        Ok(())
    }

    /// Snapshot of the current registry. Never fails; empty when nothing is
    /// registered.
    pub async fn list(&self) -> HashMap<String, ServiceRecord> {
        self.state.lock().await.clone()
    }

    /// Remove a registered service. Removing an absent name is an error so
    /// callers can distinguish it from a successful delete.
    pub async fn remove(&self, name: &str) -> Result<()> {
        let mut services = self.state.lock().await;
        if services.remove(name).is_none() {
            return Err(RegistryError::ServiceNotFound(name.to_string()));
        }
        self.store.save(&services)?;

        info!("Removed service {}", name);
        Ok(())
    }

    /// Probe every registered service once and record the outcome.
    ///
    /// Takes a snapshot of the URLs, releases the lock for the duration of
    /// the network calls, then writes the statuses back and persists the
    /// whole map in one batched save. Individual probe failures land in the
    /// status field and never abort the run; only a failure of the final
    /// save is returned.
    pub async fn ping_all(&self) -> Result<()> {
        let snapshot: Vec<(String, String)> = {
            let services = self.state.lock().await;
            services
                .iter()
                .map(|(name, record)| (name.clone(), record.healthcheck_url.clone()))
                .collect()
        };

        let mut results: Vec<(String, String, ServiceStatus)> = Vec::with_capacity(snapshot.len());
        for (name, url) in snapshot {
            let status = self.prober.probe(&url).await;
            debug!("Probed {}: {:?}", name, status);
            results.push((name, url, status));
        }

        let mut services = self.state.lock().await;
        for (name, url, status) in results {
            match services.get_mut(&name) {
                // Only record the outcome if the URL we probed is still the
                // registered one; a re-registration mid-run already reset
                // the status and may point somewhere else entirely.
                Some(record) if record.healthcheck_url == url => record.status = status,
                Some(_) => debug!("Service {} re-registered during ping run", name),
                // Removed while we were probing; nothing to record.
                None => warn!("Service {} disappeared during ping run", name),
            }
        }
        self.store.save(&services)?;

        info!("Pinged {} services", services.len());
        Ok(())
    }
}
