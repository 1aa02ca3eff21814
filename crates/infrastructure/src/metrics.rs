use doq_gateway_application::ports::QueryMetricsSink;
use doq_gateway_domain::GatewayStats;
use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};

/// Process counters shared by every stream task. Clones share the same
/// registry and counters.
#[derive(Clone)]
pub struct GatewayMetrics {
    registry: Registry,
    queries_total: IntCounter,
    valid_queries_total: IntCounter,
    upstream_errors_total: IntCounter,
}

impl GatewayMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let counter = |name: &str, help: &str| -> Result<IntCounter, prometheus::Error> {
            IntCounter::with_opts(Opts::new(name, help))
        };

        let queries_total = counter(
            "doq_queries_total",
            "DoQ streams that delivered a minimum-size DNS message",
        )?;
        let valid_queries_total = counter(
            "doq_valid_queries_total",
            "DoQ queries forwarded to the upstream resolver",
        )?;
        let upstream_errors_total = counter(
            "doq_upstream_errors_total",
            "Failed exchanges with the upstream resolver",
        )?;

        registry.register(Box::new(queries_total.clone()))?;
        registry.register(Box::new(valid_queries_total.clone()))?;
        registry.register(Box::new(upstream_errors_total.clone()))?;

        Ok(Self {
            registry,
            queries_total,
            valid_queries_total,
            upstream_errors_total,
        })
    }

    pub fn snapshot(&self) -> GatewayStats {
        GatewayStats {
            queries: self.queries_total.get(),
            valid_queries: self.valid_queries_total.get(),
            upstream_errors: self.upstream_errors_total.get(),
        }
    }

    /// Prometheus text exposition of the registry.
    pub fn render_prometheus(&self) -> Result<Vec<u8>, prometheus::Error> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

impl QueryMetricsSink for GatewayMetrics {
    fn record_query(&self) {
        self.queries_total.inc();
    }

    fn record_valid_query(&self) {
        self.valid_queries_total.inc();
    }

    fn record_upstream_error(&self) {
        self.upstream_errors_total.inc();
    }
}
