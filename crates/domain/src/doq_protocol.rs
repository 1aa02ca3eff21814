//! DNS-over-QUIC wire contract shared by the gateway and the client.
//!
//! Every DoQ stream carries exactly one DNS message in each direction and is
//! terminated by the QUIC FIN; there is no length prefix. Messages on a DoQ
//! stream carry transaction ID zero.

use std::time::Duration;

/// Smallest legal DNS query: 12-byte header plus a root-name question.
pub const MIN_DNS_MESSAGE_SIZE: usize = 17;

/// Largest DNS message a stream may deliver before it is abandoned.
pub const MAX_DNS_MESSAGE_SIZE: usize = u16::MAX as usize;

/// Receive buffer for one upstream UDP response.
pub const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// Idle timeout negotiated on every gateway connection.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default UDP port for DoQ servers speaking the draft protocol.
pub const DEFAULT_DOQ_PORT: u16 = 784;

/// ALPN identifier of the standardised protocol.
pub const ALPN_DOQ: &str = "doq";

/// ALPN identifiers advertised in compatibility mode, for clients pinned to
/// earlier drafts.
pub const ALPN_DOQ_COMPAT: &[&str] = &["doq", "doq-i00", "doq-i02", "doq-i03", "dq"];

/// Which set of ALPN identifiers an endpoint advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlpnMode {
    #[default]
    Standard,
    Compat,
}

impl AlpnMode {
    pub fn from_compat_flag(compat: bool) -> Self {
        if compat {
            AlpnMode::Compat
        } else {
            AlpnMode::Standard
        }
    }

    pub fn protocols(&self) -> &'static [&'static str] {
        match self {
            AlpnMode::Standard => &[ALPN_DOQ],
            AlpnMode::Compat => ALPN_DOQ_COMPAT,
        }
    }

    /// Protocol identifiers in the byte form TLS stacks expect.
    pub fn alpn_protocols(&self) -> Vec<Vec<u8>> {
        self.protocols()
            .iter()
            .map(|p| p.as_bytes().to_vec())
            .collect()
    }
}

/// DoQ application error codes used when closing a connection or stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum DoqErrorCode {
    NoError = 0x0,
    InternalError = 0x1,
}

impl DoqErrorCode {
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// EDNS(0) option code of edns-tcp-keepalive (RFC 7828). Its presence on a
/// DoQ stream is a fatal protocol violation.
pub const EDNS_TCP_KEEPALIVE_CODE: u16 = 11;
