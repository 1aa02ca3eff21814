use anyhow::Context;
use doq_gateway_application::use_cases::ServeDoqSessionUseCase;
use doq_gateway_domain::Config;
use doq_gateway_infrastructure::doq::{tls, DoqListener, TlsIdentity};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn start_doq_server(
    config: &Config,
    serve_session: Arc<ServeDoqSessionUseCase>,
) -> anyhow::Result<()> {
    let bind_addr: SocketAddr = config
        .server
        .listen_addr()
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.server.listen_addr()))?;

    let alpn_mode = config.server.alpn_mode();
    let identity = TlsIdentity::load(&config.tls)?;
    let tls = tls::server_config(identity, alpn_mode)?;

    let listener = DoqListener::bind(bind_addr, tls)?;
    info!(
        bind_address = %listener.local_addr()?,
        alpn = ?alpn_mode.protocols(),
        "Starting DoQ server"
    );

    let handle = listener.handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received, closing DoQ listener");
                handle.close();
            }
            Err(e) => warn!(error = %e, "Cannot listen for shutdown signal"),
        }
    });

    listener.run(serve_session).await;

    Ok(())
}
