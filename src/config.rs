//! Store configuration.

use std::env;
use std::time::Duration;

use log::{info, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration shared by the ride and locality stores.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Backend base URL. `None` runs the stores permanently in simulation mode.
    pub api_base_url: Option<String>,
    /// Per-request timeout for backend calls.
    pub request_timeout: Duration,
    /// Reject status changes out of terminal ride states.
    pub strict_status_transitions: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            strict_status_transitions: false,
        }
    }
}

impl StoreConfig {
    /// Config pointing at a backend.
    pub fn with_backend(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    /// Load from `COMMUNITY_API_BASE_URL`, `COMMUNITY_API_TIMEOUT_SECS` and
    /// `COMMUNITY_STRICT_STATUS`, falling back to defaults.
    pub fn from_env() -> Self {
        let api_base_url = env::var("COMMUNITY_API_BASE_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        if api_base_url.is_none() {
            info!("COMMUNITY_API_BASE_URL not set, running in simulation mode");
        }

        let timeout_secs = env::var("COMMUNITY_API_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| {
                raw.parse::<u64>()
                    .map_err(|e| warn!("Invalid COMMUNITY_API_TIMEOUT_SECS value: {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let strict_status_transitions = env::var("COMMUNITY_STRICT_STATUS")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Self {
            api_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            strict_status_transitions,
        }
    }

    pub fn backend_configured(&self) -> bool {
        self.api_base_url.is_some()
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
