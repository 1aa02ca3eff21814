pub mod doq;
pub mod metrics;

pub use doq::start_doq_server;
pub use metrics::start_metrics_server;
