pub mod api;
pub mod error;
pub mod prober;
pub mod registry;
pub mod service;
pub mod store;

pub use error::{RegistryError, Result};
pub use prober::HealthProber;
pub use registry::ServiceRegistry;
pub use service::{RegisterRequest, ServiceRecord, ServiceStatus};
pub use store::{JsonFileStore, MemoryStore, StateStore};
