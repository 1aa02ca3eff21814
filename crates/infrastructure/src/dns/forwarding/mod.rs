pub mod udp_forwarder;

pub use udp_forwarder::UdpForwarder;
