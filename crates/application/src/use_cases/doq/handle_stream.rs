use crate::ports::{DoqStream, QueryMetricsSink, UpstreamForwarder};
use crate::services::message_guard;
use doq_gateway_domain::doq_protocol::MAX_DNS_MESSAGE_SIZE;
use doq_gateway_domain::{StreamOutcome, UpstreamAddr};
use hickory_proto::op::Message;
use std::sync::Arc;
use tracing::{debug, warn};

/// Runs one DoQ query/response exchange to completion.
///
/// The stream is closed exactly once on every path that gets past the
/// minimum-size check. Streams that never deliver a full message are left
/// for the transport to clean up.
pub struct HandleDoqStreamUseCase {
    forwarder: Arc<dyn UpstreamForwarder>,
    metrics: Arc<dyn QueryMetricsSink>,
    upstream: UpstreamAddr,
}

impl HandleDoqStreamUseCase {
    pub fn new(
        forwarder: Arc<dyn UpstreamForwarder>,
        metrics: Arc<dyn QueryMetricsSink>,
        upstream: UpstreamAddr,
    ) -> Self {
        Self {
            forwarder,
            metrics,
            upstream,
        }
    }

    pub async fn execute<S: DoqStream>(&self, mut stream: S) -> StreamOutcome {
        // The client signals the end of its query with the stream FIN.
        let bytes = match stream.read_to_end(MAX_DNS_MESSAGE_SIZE).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(error = %e, "QUIC stream read failed");
                return StreamOutcome::Undersized;
            }
        };

        if message_guard::is_undersized(&bytes) {
            debug!(len = bytes.len(), "DNS query length is too small");
            return StreamOutcome::Undersized;
        }

        self.metrics.record_query();

        let mut query = match Message::from_vec(&bytes) {
            Ok(message) => message,
            Err(e) => {
                debug!(error = %e, len = bytes.len(), "DNS query unpack error");
                stream.close().await;
                return StreamOutcome::Malformed;
            }
        };

        if message_guard::has_tcp_keepalive(&query) {
            debug!(id = query.id(), "edns-tcp-keepalive on DoQ stream, aborting");
            stream.close().await;
            return StreamOutcome::KeepaliveRejected;
        }

        // DoQ messages carry ID 0 on the wire; the client's ID goes back on
        // the response for proxies that match on it.
        let client_id = query.id();
        query.set_id(0);

        let forwarded = self.forwarder.forward(&query, &self.upstream).await;
        self.metrics.record_valid_query();

        let (mut response, upstream_ok) = match forwarded {
            Ok(response) => (response, true),
            Err(e) => {
                self.metrics.record_upstream_error();
                warn!(upstream = %self.upstream, error = %e, "DNS query error");
                (Message::new(), false)
            }
        };
        response.set_id(client_id);

        let packed = match response.to_vec() {
            Ok(packed) => packed,
            Err(e) => {
                debug!(error = %e, "DNS response pack error");
                stream.close().await;
                return StreamOutcome::WriteFailed;
            }
        };

        let outcome = match stream.write(&packed).await {
            Ok(written) => {
                let short_write = written != packed.len();
                if short_write {
                    debug!(
                        written,
                        expected = packed.len(),
                        "QUIC stream write length mismatch"
                    );
                }
                StreamOutcome::Answered {
                    upstream_ok,
                    short_write,
                }
            }
            Err(e) => {
                debug!(error = %e, "QUIC stream write failed");
                StreamOutcome::WriteFailed
            }
        };

        stream.close().await;
        outcome
    }
}
