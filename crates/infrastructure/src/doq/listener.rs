use super::session::QuinnSession;
use doq_gateway_application::use_cases::ServeDoqSessionUseCase;
use doq_gateway_domain::doq_protocol::IDLE_TIMEOUT;
use doq_gateway_domain::{DoqErrorCode, DomainError};
use quinn::crypto::rustls::QuicServerConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info};

/// QUIC endpoint accepting DoQ connections.
pub struct DoqListener {
    endpoint: quinn::Endpoint,
}

/// Stops a running listener from another task.
#[derive(Clone)]
pub struct ListenerHandle {
    endpoint: quinn::Endpoint,
}

impl ListenerHandle {
    pub fn close(&self) {
        self.endpoint
            .close(quinn::VarInt::from_u32(DoqErrorCode::NoError.code()), b"");
    }
}

impl DoqListener {
    pub fn bind(addr: SocketAddr, tls: rustls::ServerConfig) -> Result<Self, DomainError> {
        let crypto = QuicServerConfig::try_from(tls)
            .map_err(|e| DomainError::Tls(format!("TLS config unusable for QUIC: {}", e)))?;

        let idle_timeout = quinn::IdleTimeout::try_from(IDLE_TIMEOUT)
            .map_err(|e| DomainError::ConfigError(e.to_string()))?;
        let mut transport = quinn::TransportConfig::default();
        transport.max_idle_timeout(Some(idle_timeout));

        let mut server_config = quinn::ServerConfig::with_crypto(Arc::new(crypto));
        server_config.transport_config(Arc::new(transport));

        let endpoint = quinn::Endpoint::server(server_config, addr).map_err(|e| {
            DomainError::ListenerBind {
                addr: addr.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self { endpoint })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, DomainError> {
        self.endpoint
            .local_addr()
            .map_err(|e| DomainError::IoError(e.to_string()))
    }

    pub fn handle(&self) -> ListenerHandle {
        ListenerHandle {
            endpoint: self.endpoint.clone(),
        }
    }

    /// Accepts connections until the endpoint is closed. Every connection
    /// is served on its own task; failed handshakes only cost a log line.
    pub async fn run(self, serve_session: Arc<ServeDoqSessionUseCase>) {
        if let Ok(addr) = self.endpoint.local_addr() {
            info!(bind_address = %addr, "DoQ listener accepting connections");
        }

        while let Some(incoming) = self.endpoint.accept().await {
            let serve_session = Arc::clone(&serve_session);
            tokio::spawn(async move {
                let remote = incoming.remote_address();
                match incoming.await {
                    Ok(connection) => {
                        let session = QuinnSession::new(connection);
                        debug!(
                            client = %remote,
                            alpn = session.negotiated_protocol().as_deref().unwrap_or("none"),
                            "DoQ session established"
                        );
                        let streams = serve_session.execute(session).await;
                        debug!(client = %remote, streams, "DoQ session finished");
                    }
                    Err(e) => {
                        debug!(client = %remote, error = %e, "QUIC handshake failed");
                    }
                }
            });
        }

        self.endpoint.wait_idle().await;
        info!("DoQ listener stopped");
    }
}
