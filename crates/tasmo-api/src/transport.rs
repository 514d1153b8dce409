// Shared transport configuration for building reqwest::Client instances.
//
// Tasmota speaks plain HTTP on the local network, so there is no TLS
// story here -- just timeout and identification.

use std::time::Duration;

/// Transport settings for the device HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent("tasmoctl/0.1.0")
            .build()
            .map_err(crate::error::Error::Transport)
    }
}
