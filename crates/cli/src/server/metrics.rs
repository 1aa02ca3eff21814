use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use doq_gateway_domain::GatewayStats;
use doq_gateway_infrastructure::GatewayMetrics;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn start_metrics_server(
    bind_addr: SocketAddr,
    metrics: GatewayMetrics,
) -> anyhow::Result<()> {
    info!(
        bind_address = %bind_addr,
        metrics_url = format!("http://{}/metrics", bind_addr),
        "Starting metrics server"
    );

    let app = create_app(metrics);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}

fn create_app(metrics: GatewayMetrics) -> Router {
    Router::new()
        .route("/metrics", get(prometheus_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(metrics)
}

async fn prometheus_handler(State(metrics): State<GatewayMetrics>) -> Response {
    match metrics.render_prometheus() {
        Ok(body) => ([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn stats_handler(State(metrics): State<GatewayMetrics>) -> Json<GatewayStats> {
    Json(metrics.snapshot())
}

async fn health_handler() -> &'static str {
    "ok"
}
