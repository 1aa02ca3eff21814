use clap::Parser;
use doq_gateway_domain::CliOverrides;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{error, info};

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "doq-gateway")]
#[command(version)]
#[command(about = "DoQ Gateway - DNS-over-QUIC front end for a plain UDP resolver")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// DoQ listen port
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Upstream resolver (host:port)
    #[arg(short = 'u', long)]
    upstream: Option<String>,

    /// PEM certificate chain
    #[arg(long, value_name = "FILE")]
    cert: Option<PathBuf>,

    /// PEM private key
    #[arg(long, value_name = "FILE")]
    key: Option<PathBuf>,

    /// Also advertise the draft ALPN identifiers
    #[arg(long)]
    tls_compat: bool,

    /// Serve counters over HTTP on this port
    #[arg(long)]
    metrics_port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        bind_address: cli.bind,
        port: cli.port,
        tls_compat: cli.tls_compat,
        cert_file: cli.cert,
        key_file: cli.key,
        upstream: cli.upstream,
        metrics_port: cli.metrics_port,
        log_level: cli.log_level,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting DoQ Gateway v{}", env!("CARGO_PKG_VERSION"));

    let services = di::GatewayServices::new(&config)?;

    if config.metrics.enabled {
        let metrics_addr: SocketAddr = config.metrics.listen_addr().parse()?;
        let metrics = services.metrics.clone();

        tokio::spawn(async move {
            if let Err(e) = server::start_metrics_server(metrics_addr, metrics).await {
                error!(error = %e, "Metrics server error");
            }
        });
    }

    // Blocks until Ctrl-C closes the listener
    server::start_doq_server(&config, services.serve_session).await?;

    let stats = services.metrics.snapshot();
    info!(
        queries = stats.queries,
        valid_queries = stats.valid_queries,
        upstream_errors = stats.upstream_errors,
        "Server shutdown complete"
    );
    Ok(())
}
