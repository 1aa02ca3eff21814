//! Checks applied to every DNS message arriving on a DoQ stream.

use doq_gateway_domain::doq_protocol::{EDNS_TCP_KEEPALIVE_CODE, MIN_DNS_MESSAGE_SIZE};
use hickory_proto::op::Message;
use hickory_proto::rr::rdata::opt::EdnsCode;

pub fn is_undersized(bytes: &[u8]) -> bool {
    bytes.len() < MIN_DNS_MESSAGE_SIZE
}

/// True if the message carries an edns-tcp-keepalive option, which is
/// forbidden on DoQ.
pub fn has_tcp_keepalive(message: &Message) -> bool {
    message
        .extensions()
        .as_ref()
        .map(|edns| {
            edns.options()
                .get(EdnsCode::from(EDNS_TCP_KEEPALIVE_CODE))
                .is_some()
        })
        .unwrap_or(false)
}
