use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::debug;

use crate::error::{RegistryError, Result};
use crate::service::ServiceRecord;

/// Durable backend for the registry map.
///
/// The registry saves the full map after every mutation, so implementations
/// only need whole-map load/save, not incremental updates.
pub trait StateStore: Send + Sync {
    fn load(&self) -> Result<HashMap<String, ServiceRecord>>;
    fn save(&self, services: &HashMap<String, ServiceRecord>) -> Result<()>;
}

/// JSON-file backed store. The file holds the serialized name -> record map.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = OsString::from(self.path.as_os_str());
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<HashMap<String, ServiceRecord>> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                RegistryError::CorruptState(format!("{}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No state file at {}, starting empty", self.path.display());
                Ok(HashMap::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, services: &HashMap<String, ServiceRecord>) -> Result<()> {
        let json = serde_json::to_vec_pretty(services)?;

        // Write to a sibling temp file and rename so a crash mid-write can
        // never leave a half-written state file behind.
        let tmp = self.tmp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;

        debug!(
            "Saved {} services to {}",
            services.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// In-memory store for tests and embedded use.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<HashMap<String, ServiceRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<HashMap<String, ServiceRecord>> {
        Ok(self.state.lock().unwrap().clone())
    }

    fn save(&self, services: &HashMap<String, ServiceRecord>) -> Result<()> {
        *self.state.lock().unwrap() = services.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceStatus;

    fn sample_map() -> HashMap<String, ServiceRecord> {
        let mut map = HashMap::new();
        map.insert(
            "api".to_string(),
            ServiceRecord {
                description: "auth".to_string(),
                healthcheck_url: "http://localhost:9/health".to_string(),
                status: ServiceStatus::Unknown,
            },
        );
        map
    }

    #[test]
    fn load_missing_file_returns_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("services.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("services.json"));

        store.save(&sample_map()).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["api"].description, "auth");
        assert_eq!(loaded["api"].status, ServiceStatus::Unknown);
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("services.json");
        let store = JsonFileStore::new(&path);

        store.save(&sample_map()).unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("services.json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("services.json");
        fs::write(&path, b"{ not json").unwrap();

        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, RegistryError::CorruptState(_)));
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_empty());
        store.save(&sample_map()).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }
}
