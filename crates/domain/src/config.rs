mod errors;
mod logging;
mod metrics;
mod root;
mod server;
mod tls;
mod upstream;

pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use metrics::MetricsConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
pub use tls::TlsConfig;
pub use upstream::UpstreamConfig;
