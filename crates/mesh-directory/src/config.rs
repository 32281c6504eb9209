//! Client configuration and session credentials

use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection settings for the control-plane API.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Base URL of the control plane, e.g. `https://mesh.example.com`
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://mesh.example.com".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

/// API credentials, passed explicitly to every client.
///
/// Deliberately not serializable and with a redacting `Debug` so the key
/// cannot leak through config dumps or logs.
#[derive(Clone)]
pub struct Session {
    api_key: String,
}

impl Session {
    /// Session from a bearer API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// The bearer key for request authorization.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("api_key", &"<redacted>").finish()
    }
}
