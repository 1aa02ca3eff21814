use crate::UpstreamAddr;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Plain DNS resolver, `host:port`.
    #[serde(default = "default_address")]
    pub address: String,

    /// Bound on one UDP round trip. Unset leaves the exchange unbounded.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl UpstreamConfig {
    pub fn upstream_addr(&self) -> Result<UpstreamAddr, String> {
        self.address.parse()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            timeout_ms: None,
        }
    }
}

fn default_address() -> String {
    "1.1.1.1:53".to_string()
}
