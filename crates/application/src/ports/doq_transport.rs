use async_trait::async_trait;
use doq_gateway_domain::{DoqErrorCode, DomainError};
use std::net::SocketAddr;

/// One client-initiated bidirectional stream carrying a single exchange.
#[async_trait]
pub trait DoqStream: Send {
    /// Read until the peer half-closes. Fails if more than `size_limit`
    /// bytes arrive.
    async fn read_to_end(&mut self, size_limit: usize) -> Result<Vec<u8>, DomainError>;

    /// Write `bytes`, returning how many were accepted.
    async fn write(&mut self, bytes: &[u8]) -> Result<usize, DomainError>;

    /// Finish the send side. Errors are ignored: the stream may already be
    /// gone.
    async fn close(&mut self);
}

/// One accepted QUIC connection.
#[async_trait]
pub trait DoqSession: Send + Sync {
    type Stream: DoqStream + 'static;

    async fn accept_stream(&self) -> Result<Self::Stream, DomainError>;

    fn close_with_error(&self, code: DoqErrorCode, reason: &str);

    fn remote_addr(&self) -> SocketAddr;
}
