use anyhow::{anyhow, Context};
use clap::{ArgAction, Parser};
use doq_gateway_domain::AlpnMode;
use doq_gateway_infrastructure::doq::query::build_query;
use doq_gateway_infrastructure::doq::{DoqClient, DoqClientConfig};
use hickory_proto::op::Message;
use hickory_proto::rr::{Name, RecordType};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "doq-client")]
#[command(version)]
#[command(about = "Send one DNS query over QUIC and print the response")]
struct Cli {
    /// DoQ server (host:port)
    #[arg(long, default_value = "[::1]:784")]
    server: String,

    /// Accept any server certificate
    #[arg(long)]
    insecure_skip_verify: bool,

    /// Set the EDNS0 DO bit
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    dnssec: bool,

    /// Set the RD bit
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    recursion: bool,

    #[arg(long, default_value = "example.com.")]
    query_name: String,

    #[arg(long, default_value = "A")]
    query_type: String,

    /// Offer the draft ALPN identifiers too
    #[arg(long)]
    compat: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let name = Name::from_str(&cli.query_name)
        .with_context(|| format!("Invalid query name {}", cli.query_name))?;
    let record_type = RecordType::from_str(&cli.query_type.to_ascii_uppercase())
        .map_err(|e| anyhow!("Invalid query type {}: {}", cli.query_type, e))?;
    let query = build_query(name, record_type, cli.recursion, cli.dnssec);

    let client = DoqClient::connect(DoqClientConfig {
        server: cli.server,
        server_name: None,
        insecure_skip_verify: cli.insecure_skip_verify,
        alpn_mode: AlpnMode::from_compat_flag(cli.compat),
        extra_roots: Vec::new(),
    })
    .await?;

    let response = client.send_query(&query).await;
    client.close().await;

    print!("{}", format_response(&response?));
    Ok(())
}

fn format_response(response: &Message) -> String {
    let mut out = format!(
        ";; id: {}  rcode: {}  flags:{}{}{}{}\n",
        response.id(),
        response.response_code(),
        if response.authoritative() { " aa" } else { "" },
        if response.truncated() { " tc" } else { "" },
        if response.recursion_desired() { " rd" } else { "" },
        if response.recursion_available() { " ra" } else { "" },
    );

    out.push_str(";; QUESTION SECTION:\n");
    for query in response.queries() {
        out.push_str(&format!("{}\n", query));
    }

    for (title, records) in [
        ("ANSWER", response.answers()),
        ("AUTHORITY", response.name_servers()),
        ("ADDITIONAL", response.additionals()),
    ] {
        if records.is_empty() {
            continue;
        }
        out.push_str(&format!(";; {} SECTION:\n", title));
        for record in records {
            out.push_str(&format!("{}\n", record));
        }
    }

    out
}
