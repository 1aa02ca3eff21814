use super::HandleDoqStreamUseCase;
use crate::ports::DoqSession;
use doq_gateway_domain::DoqErrorCode;
use std::sync::Arc;
use tracing::{debug, trace};

/// Accepts streams from one connection until the connection fails.
pub struct ServeDoqSessionUseCase {
    stream_handler: Arc<HandleDoqStreamUseCase>,
}

impl ServeDoqSessionUseCase {
    pub fn new(stream_handler: Arc<HandleDoqStreamUseCase>) -> Self {
        Self { stream_handler }
    }

    /// Returns the number of streams dispatched before the session ended.
    ///
    /// Each stream runs on its own task, so a slow upstream never holds up
    /// the next accept. Once accepting fails the connection is closed with
    /// `DOQ_INTERNAL_ERROR` and abandoned; reconnecting is up to the client.
    pub async fn execute<C: DoqSession>(&self, session: C) -> usize {
        let peer = session.remote_addr();
        let mut dispatched = 0usize;

        loop {
            match session.accept_stream().await {
                Ok(stream) => {
                    dispatched += 1;
                    let handler = Arc::clone(&self.stream_handler);
                    tokio::spawn(async move {
                        let outcome = handler.execute(stream).await;
                        trace!(%peer, outcome = outcome.as_str(), "DoQ stream finished");
                    });
                }
                Err(e) => {
                    debug!(%peer, error = %e, streams = dispatched, "QUIC stream accept");
                    session.close_with_error(DoqErrorCode::InternalError, "");
                    return dispatched;
                }
            }
        }
    }
}
