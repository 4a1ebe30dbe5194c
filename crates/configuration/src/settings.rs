use serde::Deserialize;

use crate::error::ConfigError;

/// Root of the Vyapar public API used when `VYAPAR_BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "https://staging.vyaparapp.in/api/ns/public/";

/// Upper bound for a single remote call, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Credentials and connection settings for the Vyapar public API.
///
/// Loaded once from the environment and injected into the client at
/// construction; nothing in this crate keeps process-global state.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// The shared secret every request signature is keyed with (`VYAPAR_API_KEY`).
    pub api_key: String,

    /// The vendor identifier issued alongside the key (`VYAPAR_VENDOR`).
    /// Sent as the `x-vendor` header and embedded in the signed text.
    pub vendor: String,

    /// Root URL of the public API (`VYAPAR_BASE_URL`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds (`VYAPAR_REQUEST_TIMEOUT_SECS`).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl ApiConfig {
    /// Rejects credentials that could never produce a verifiable signature.
    /// An empty key or vendor indicates a deployment mistake, not a runtime
    /// condition to recover from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "VYAPAR_API_KEY must be set and non-empty".to_string(),
            ));
        }
        if self.vendor.trim().is_empty() {
            return Err(ConfigError::Validation(
                "VYAPAR_VENDOR must be set and non-empty".to_string(),
            ));
        }
        Ok(())
    }
}
