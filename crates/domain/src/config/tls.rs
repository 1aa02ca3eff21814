use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// PEM certificate chain and private key presented to DoQ clients.
///
/// Both paths unset means an ephemeral self-signed certificate is generated
/// at startup.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TlsConfig {
    #[serde(default)]
    pub cert_file: Option<PathBuf>,

    #[serde(default)]
    pub key_file: Option<PathBuf>,
}

impl TlsConfig {
    pub fn is_self_signed(&self) -> bool {
        self.cert_file.is_none() && self.key_file.is_none()
    }
}
