use anyhow::anyhow;
use doq_gateway_application::use_cases::{HandleDoqStreamUseCase, ServeDoqSessionUseCase};
use doq_gateway_domain::Config;
use doq_gateway_infrastructure::dns::UdpForwarder;
use doq_gateway_infrastructure::GatewayMetrics;
use std::sync::Arc;
use tracing::info;

pub struct GatewayServices {
    pub metrics: GatewayMetrics,
    pub serve_session: Arc<ServeDoqSessionUseCase>,
}

impl GatewayServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let upstream = config
            .upstream
            .upstream_addr()
            .map_err(|e| anyhow!("Invalid upstream address: {}", e))?;

        let forwarder = Arc::new(UdpForwarder::with_timeout(config.upstream.timeout()));
        let metrics = GatewayMetrics::new()?;

        info!(
            upstream = %upstream,
            timeout_ms = ?config.upstream.timeout_ms,
            "Forwarding DoQ queries to UDP upstream"
        );

        let stream_handler = Arc::new(HandleDoqStreamUseCase::new(
            forwarder,
            Arc::new(metrics.clone()),
            upstream,
        ));
        let serve_session = Arc::new(ServeDoqSessionUseCase::new(stream_handler));

        Ok(Self {
            metrics,
            serve_session,
        })
    }
}
