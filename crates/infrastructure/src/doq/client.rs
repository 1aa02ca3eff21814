//! Minimal DoQ client: one connection, one bidirectional stream per query.

use super::tls;
use doq_gateway_domain::doq_protocol::{DEFAULT_DOQ_PORT, MAX_DNS_MESSAGE_SIZE};
use doq_gateway_domain::{AlpnMode, DoqErrorCode, DomainError, UpstreamAddr};
use hickory_proto::op::Message;
use quinn::crypto::rustls::QuicClientConfig;
use rustls::pki_types::CertificateDer;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DoqClientConfig {
    /// `host:port`, an IP literal, or a bare host on the default DoQ port.
    pub server: String,
    /// TLS name to verify; defaults to the host part of `server`.
    pub server_name: Option<String>,
    pub insecure_skip_verify: bool,
    pub alpn_mode: AlpnMode,
    /// Trusted in addition to the bundled web PKI roots.
    pub extra_roots: Vec<CertificateDer<'static>>,
}

impl DoqClientConfig {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            server_name: None,
            insecure_skip_verify: false,
            alpn_mode: AlpnMode::Standard,
            extra_roots: Vec::new(),
        }
    }
}

pub struct DoqClient {
    endpoint: quinn::Endpoint,
    connection: quinn::Connection,
}

impl DoqClient {
    pub async fn connect(config: DoqClientConfig) -> Result<Self, DomainError> {
        let (server_addr, default_name) = resolve_server(&config.server).await?;
        let server_name = config.server_name.clone().unwrap_or(default_name);

        let tls = tls::client_config(
            config.alpn_mode,
            config.insecure_skip_verify,
            &config.extra_roots,
        )?;
        let crypto = QuicClientConfig::try_from(tls)
            .map_err(|e| DomainError::Tls(format!("TLS config unusable for QUIC: {}", e)))?;

        let bind_addr: SocketAddr = if server_addr.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let mut endpoint =
            quinn::Endpoint::client(bind_addr).map_err(|e| DomainError::IoError(e.to_string()))?;
        endpoint.set_default_client_config(quinn::ClientConfig::new(Arc::new(crypto)));

        debug!(server = %server_addr, server_name = %server_name, "dialing DoQ server");
        let connecting = endpoint
            .connect(server_addr, &server_name)
            .map_err(|e| DomainError::Connect {
                server: config.server.clone(),
                reason: e.to_string(),
            })?;
        let connection = connecting.await.map_err(|e| DomainError::Connect {
            server: config.server.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            endpoint,
            connection,
        })
    }

    /// The underlying connection, for callers that drive streams by hand.
    pub fn connection(&self) -> &quinn::Connection {
        &self.connection
    }

    /// Sends `query` on a fresh stream and decodes whatever the server
    /// writes before finishing it.
    pub async fn send_query(&self, query: &Message) -> Result<Message, DomainError> {
        let packed = query
            .to_vec()
            .map_err(|e| DomainError::MessageEncode(e.to_string()))?;

        let (mut send, mut recv) = self
            .connection
            .open_bi()
            .await
            .map_err(|e| DomainError::StreamOpen(e.to_string()))?;

        send.write_all(&packed)
            .await
            .map_err(|e| DomainError::StreamWrite(e.to_string()))?;
        send.finish()
            .map_err(|e| DomainError::StreamWrite(e.to_string()))?;

        let response = recv
            .read_to_end(MAX_DNS_MESSAGE_SIZE)
            .await
            .map_err(|e| DomainError::StreamRead(e.to_string()))?;

        Message::from_vec(&response).map_err(|e| DomainError::InvalidDnsMessage(e.to_string()))
    }

    pub async fn close(self) {
        self.connection
            .close(quinn::VarInt::from_u32(DoqErrorCode::NoError.code()), b"");
        self.endpoint.wait_idle().await;
    }
}

async fn resolve_server(server: &str) -> Result<(SocketAddr, String), DomainError> {
    let addr = if let Ok(ip) = server.parse::<IpAddr>() {
        UpstreamAddr::Resolved(SocketAddr::new(ip, DEFAULT_DOQ_PORT))
    } else if server.contains(':') {
        server
            .parse::<UpstreamAddr>()
            .map_err(|reason| DomainError::Connect {
                server: server.to_string(),
                reason,
            })?
    } else {
        UpstreamAddr::Unresolved {
            hostname: server.into(),
            port: DEFAULT_DOQ_PORT,
        }
    };

    match addr.unresolved_parts() {
        Some((host, port)) => {
            let resolved = tokio::net::lookup_host((host, port))
                .await
                .map_err(|e| DomainError::Connect {
                    server: server.to_string(),
                    reason: format!("lookup failed: {}", e),
                })?
                .next()
                .ok_or_else(|| DomainError::Connect {
                    server: server.to_string(),
                    reason: "lookup returned no addresses".to_string(),
                })?;
            Ok((resolved, host.to_string()))
        }
        None => {
            let resolved = addr.socket_addr().ok_or_else(|| DomainError::Connect {
                server: server.to_string(),
                reason: "unusable address".to_string(),
            })?;
            Ok((resolved, resolved.ip().to_string()))
        }
    }
}
