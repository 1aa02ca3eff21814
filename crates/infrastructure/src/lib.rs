//! DoQ Gateway Infrastructure Layer
//!
//! quinn/rustls adapters for the application ports, the QUIC listener, the
//! plain-UDP upstream forwarder, counters and the DoQ client.

pub mod dns;
pub mod doq;
pub mod metrics;

pub use metrics::GatewayMetrics;
