pub mod forwarding;

pub use forwarding::UdpForwarder;
