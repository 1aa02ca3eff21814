use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Invalid DNS message: {0}")]
    InvalidDnsMessage(String),

    #[error("Failed to encode DNS message: {0}")]
    MessageEncode(String),

    #[error("Upstream connect to {server} failed: {reason}")]
    UpstreamConnect { server: String, reason: String },

    #[error("Upstream query write to {server} failed: {reason}")]
    UpstreamWrite { server: String, reason: String },

    #[error("Upstream query read from {server} failed: {reason}")]
    UpstreamRead { server: String, reason: String },

    #[error("Upstream response from {server} could not be decoded: {reason}")]
    UpstreamUnpack { server: String, reason: String },

    #[error("Upstream query to {server} timed out")]
    UpstreamTimeout { server: String },

    #[error("QUIC stream read failed: {0}")]
    StreamRead(String),

    #[error("QUIC stream write failed: {0}")]
    StreamWrite(String),

    #[error("QUIC stream open failed: {0}")]
    StreamOpen(String),

    #[error("QUIC stream accept failed: {0}")]
    SessionAccept(String),

    #[error("QUIC connection to {server} failed: {reason}")]
    Connect { server: String, reason: String },

    #[error("TLS configuration error: {0}")]
    Tls(String),

    #[error("Failed to start QUIC listener on {addr}: {reason}")]
    ListenerBind { addr: String, reason: String },

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DomainError {
    /// True for failures that happened while talking to the upstream resolver.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            DomainError::UpstreamConnect { .. }
                | DomainError::UpstreamWrite { .. }
                | DomainError::UpstreamRead { .. }
                | DomainError::UpstreamUnpack { .. }
                | DomainError::UpstreamTimeout { .. }
        )
    }
}
