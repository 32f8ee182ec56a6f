use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{RegistryError, Result};

/// Last-known health classification of a registered service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Unknown,
    Healthy,
    Unhealthy,
    Unreachable,
    NotChecked,
}

/// A registered service. The service name is the registry map key, so the
/// record itself carries only the mutable attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub description: String,
    pub healthcheck_url: String,
    pub status: ServiceStatus,
}

/// Registration payload as received from clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub description: String,
    pub healthcheck_url: String,
}

impl RegisterRequest {
    /// Validate the payload before it reaches the registry.
    ///
    /// The name must be non-empty and the healthcheck URL must parse as an
    /// absolute http or https URL.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(RegistryError::InvalidServiceData(
                "service name must not be empty".to_string(),
            ));
        }

        let url = Url::parse(&self.healthcheck_url).map_err(|e| {
            RegistryError::InvalidServiceData(format!(
                "invalid healthcheck URL '{}': {}",
                self.healthcheck_url, e
            ))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(RegistryError::InvalidServiceData(format!(
                "unsupported healthcheck URL scheme: {}",
                other
            ))),
        }
    }

    /// Build the record stored under this request's name. Status always
    /// starts out unknown until the first probe.
    pub fn into_record(self) -> ServiceRecord {
        ServiceRecord {
            description: self.description,
            healthcheck_url: self.healthcheck_url,
            status: ServiceStatus::Unknown,
        }
    }
}
