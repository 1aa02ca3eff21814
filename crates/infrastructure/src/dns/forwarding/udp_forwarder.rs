//! Plain DNS-over-UDP forwarder (RFC 1035 §4.2.1)
//!
//! One fresh socket per query: no pooling, no retries, no fallback
//! resolver. The connected socket only accepts datagrams from the resolver
//! it was pointed at, which is all the correlation a single exchange needs.

use async_trait::async_trait;
use doq_gateway_application::ports::UpstreamForwarder;
use doq_gateway_domain::doq_protocol::MAX_UDP_RESPONSE_SIZE;
use doq_gateway_domain::{DomainError, UpstreamAddr};
use hickory_proto::op::Message;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

pub struct UdpForwarder {
    timeout: Option<Duration>,
}

impl UdpForwarder {
    /// Forwarder that waits on the resolver for as long as the socket does.
    pub fn new() -> Self {
        Self { timeout: None }
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn resolve(upstream: &UpstreamAddr) -> Result<SocketAddr, DomainError> {
        if let Some(addr) = upstream.socket_addr() {
            return Ok(addr);
        }

        let (host, port) = upstream
            .unresolved_parts()
            .ok_or_else(|| DomainError::UpstreamConnect {
                server: upstream.to_string(),
                reason: "address has no host".to_string(),
            })?;

        tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| DomainError::UpstreamConnect {
                server: upstream.to_string(),
                reason: format!("lookup failed: {}", e),
            })?
            .next()
            .ok_or_else(|| DomainError::UpstreamConnect {
                server: upstream.to_string(),
                reason: "lookup returned no addresses".to_string(),
            })
    }

    async fn connect(server: &str, server_addr: SocketAddr) -> Result<UdpSocket, DomainError> {
        let bind_addr: SocketAddr = if server_addr.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| DomainError::UpstreamConnect {
                server: server.to_string(),
                reason: format!("bind failed: {}", e),
            })?;

        socket
            .connect(server_addr)
            .await
            .map_err(|e| DomainError::UpstreamConnect {
                server: server.to_string(),
                reason: e.to_string(),
            })?;

        Ok(socket)
    }

    async fn receive(&self, socket: &UdpSocket, server: &str) -> Result<Vec<u8>, DomainError> {
        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];

        let received = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, socket.recv(&mut recv_buf))
                .await
                .map_err(|_| DomainError::UpstreamTimeout {
                    server: server.to_string(),
                })?,
            None => socket.recv(&mut recv_buf).await,
        };

        let len = received.map_err(|e| DomainError::UpstreamRead {
            server: server.to_string(),
            reason: e.to_string(),
        })?;

        recv_buf.truncate(len);
        Ok(recv_buf)
    }
}

impl Default for UdpForwarder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpstreamForwarder for UdpForwarder {
    async fn forward(
        &self,
        query: &Message,
        upstream: &UpstreamAddr,
    ) -> Result<Message, DomainError> {
        let packed = query
            .to_vec()
            .map_err(|e| DomainError::MessageEncode(e.to_string()))?;

        let server = upstream.to_string();
        debug!(upstream = %server, "dialing udp dns upstream");
        let server_addr = Self::resolve(upstream).await?;
        let socket = Self::connect(&server, server_addr).await?;

        debug!(upstream = %server, bytes = packed.len(), "writing query to dns upstream");
        let sent = socket
            .send(&packed)
            .await
            .map_err(|e| DomainError::UpstreamWrite {
                server: server.clone(),
                reason: e.to_string(),
            })?;
        if sent != packed.len() {
            return Err(DomainError::UpstreamWrite {
                server,
                reason: format!("sent {} of {} bytes", sent, packed.len()),
            });
        }

        debug!(upstream = %server, "reading query response from dns upstream");
        let response = self.receive(&socket, &server).await?;

        debug!(upstream = %server, bytes = response.len(), "UDP response received");

        Message::from_vec(&response).map_err(|e| DomainError::UpstreamUnpack {
            server,
            reason: e.to_string(),
        })
    }
}
