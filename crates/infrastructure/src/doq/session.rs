use async_trait::async_trait;
use doq_gateway_application::ports::{DoqSession, DoqStream};
use doq_gateway_domain::{DoqErrorCode, DomainError};
use std::net::SocketAddr;

/// An accepted gateway connection.
pub struct QuinnSession {
    connection: quinn::Connection,
}

impl QuinnSession {
    pub fn new(connection: quinn::Connection) -> Self {
        Self { connection }
    }

    /// ALPN identifier the client negotiated, if any.
    pub fn negotiated_protocol(&self) -> Option<String> {
        self.connection
            .handshake_data()
            .and_then(|data| data.downcast::<quinn::crypto::rustls::HandshakeData>().ok())
            .and_then(|data| data.protocol)
            .map(|p| String::from_utf8_lossy(&p).into_owned())
    }
}

#[async_trait]
impl DoqSession for QuinnSession {
    type Stream = QuinnStream;

    async fn accept_stream(&self) -> Result<QuinnStream, DomainError> {
        let (send, recv) = self
            .connection
            .accept_bi()
            .await
            .map_err(|e| DomainError::SessionAccept(e.to_string()))?;
        Ok(QuinnStream { send, recv })
    }

    fn close_with_error(&self, code: DoqErrorCode, reason: &str) {
        self.connection
            .close(quinn::VarInt::from_u32(code.code()), reason.as_bytes());
    }

    fn remote_addr(&self) -> SocketAddr {
        self.connection.remote_address()
    }
}

/// Both halves of one client-initiated bidirectional stream.
pub struct QuinnStream {
    send: quinn::SendStream,
    recv: quinn::RecvStream,
}

#[async_trait]
impl DoqStream for QuinnStream {
    async fn read_to_end(&mut self, size_limit: usize) -> Result<Vec<u8>, DomainError> {
        self.recv
            .read_to_end(size_limit)
            .await
            .map_err(|e| DomainError::StreamRead(e.to_string()))
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<usize, DomainError> {
        self.send
            .write_all(bytes)
            .await
            .map_err(|e| DomainError::StreamWrite(e.to_string()))?;
        Ok(bytes.len())
    }

    async fn close(&mut self) {
        let _ = self.send.finish();
    }
}
