/// How the gateway finished with one DoQ stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Fewer bytes than the smallest DNS message (or a failed read) before
    /// the FIN. Nothing was forwarded or written.
    Undersized,
    /// The bytes did not decode as a DNS message. The stream was closed
    /// without a response.
    Malformed,
    /// The query carried an edns-tcp-keepalive option. The stream was closed
    /// without a response.
    KeepaliveRejected,
    /// A response was written. `upstream_ok` is false when the resolver
    /// exchange failed and an empty message was sent instead.
    Answered { upstream_ok: bool, short_write: bool },
    /// Forwarding ran but the response could not be encoded or written.
    WriteFailed,
}

impl StreamOutcome {
    pub fn is_answered(&self) -> bool {
        matches!(self, StreamOutcome::Answered { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamOutcome::Undersized => "undersized",
            StreamOutcome::Malformed => "malformed",
            StreamOutcome::KeepaliveRejected => "keepalive_rejected",
            StreamOutcome::Answered {
                upstream_ok: true, ..
            } => "answered",
            StreamOutcome::Answered {
                upstream_ok: false,
                ..
            } => "answered_empty",
            StreamOutcome::WriteFailed => "write_failed",
        }
    }
}
