use std::time::Duration;

use tracing::debug;

use crate::service::ServiceStatus;

/// Per-probe timeout. A service that cannot answer within this window is
/// reported unreachable.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Issues health probes and classifies their outcomes.
///
/// Each probe is a single HTTP GET with a fixed timeout; there are no
/// retries. Probe failures are never errors, they map onto a status.
pub struct HealthProber {
    client: reqwest::Client,
}

impl HealthProber {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Probe a single healthcheck URL.
    ///
    /// A record without a URL should not exist past validation, but is
    /// classified as not-checked rather than probed.
    pub async fn probe(&self, url: &str) -> ServiceStatus {
        if url.is_empty() {
            return ServiceStatus::NotChecked;
        }

        match self.client.get(url).timeout(PROBE_TIMEOUT).send().await {
            Ok(response) => classify_response(response.status()),
            Err(e) => {
                debug!("Probe of {} failed: {}", url, e);
                ServiceStatus::Unreachable
            }
        }
    }
}

impl Default for HealthProber {
    fn default() -> Self {
        Self::new()
    }
}

/// Only an exact 200 counts as healthy; any other answered status code means
/// the service responded but is unhealthy.
fn classify_response(status: reqwest::StatusCode) -> ServiceStatus {
    if status == reqwest::StatusCode::OK {
        ServiceStatus::Healthy
    } else {
        ServiceStatus::Unhealthy
    }
}
