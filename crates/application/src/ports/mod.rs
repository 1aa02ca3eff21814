mod doq_transport;
mod query_metrics;
mod upstream_forwarder;

pub use doq_transport::{DoqSession, DoqStream};
pub use query_metrics::QueryMetricsSink;
pub use upstream_forwarder::UpstreamForwarder;
