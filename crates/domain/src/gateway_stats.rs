use serde::Serialize;

/// Point-in-time copy of the gateway counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GatewayStats {
    pub queries: u64,
    pub valid_queries: u64,
    pub upstream_errors: u64,
}
