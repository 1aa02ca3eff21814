use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

/// Plain-UDP resolver the gateway forwards to. A hostname is looked up
/// again on every forward.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UpstreamAddr {
    Resolved(SocketAddr),
    Unresolved { hostname: Arc<str>, port: u16 },
}

impl UpstreamAddr {
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        if let UpstreamAddr::Resolved(addr) = self {
            Some(*addr)
        } else {
            None
        }
    }

    pub fn unresolved_parts(&self) -> Option<(&str, u16)> {
        if let UpstreamAddr::Unresolved { hostname, port } = self {
            Some((hostname, *port))
        } else {
            None
        }
    }
}

impl fmt::Display for UpstreamAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamAddr::Resolved(addr) => addr.fmt(f),
            UpstreamAddr::Unresolved { hostname, port } => write!(f, "{}:{}", hostname, port),
        }
    }
}

impl FromStr for UpstreamAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let target = s.strip_prefix("udp://").unwrap_or(s);

        if let Ok(addr) = target.parse::<SocketAddr>() {
            return Ok(UpstreamAddr::Resolved(addr));
        }

        // Bracketed hosts are IPv6 literals, which SocketAddr already rejected.
        let hostname = target
            .rsplit_once(':')
            .filter(|(host, _)| !host.is_empty() && !host.contains([':', '[', ']']))
            .and_then(|(host, port)| port.parse::<u16>().ok().map(|port| (host, port)));

        match hostname {
            Some((host, port)) => Ok(UpstreamAddr::Unresolved {
                hostname: host.into(),
                port,
            }),
            None => Err(format!(
                "upstream '{}' is not of the form host:port (optionally prefixed with udp://)",
                s
            )),
        }
    }
}
