//! DNS-over-QUIC on top of quinn.

pub mod client;
pub mod listener;
pub mod query;
pub mod session;
pub mod tls;

pub use client::{DoqClient, DoqClientConfig};
pub use listener::{DoqListener, ListenerHandle};
pub use session::{QuinnSession, QuinnStream};
pub use tls::TlsIdentity;
