//! DoQ Gateway Domain Layer
pub mod config;
pub mod doq_protocol;
pub mod errors;
pub mod gateway_stats;
pub mod stream_outcome;
pub mod upstream_addr;

pub use config::{CliOverrides, Config, ConfigError};
pub use doq_protocol::{AlpnMode, DoqErrorCode};
pub use errors::DomainError;
pub use gateway_stats::GatewayStats;
pub use stream_outcome::StreamOutcome;
pub use upstream_addr::UpstreamAddr;
