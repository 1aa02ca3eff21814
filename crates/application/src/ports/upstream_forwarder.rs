use async_trait::async_trait;
use doq_gateway_domain::{DomainError, UpstreamAddr};
use hickory_proto::op::Message;

#[async_trait]
pub trait UpstreamForwarder: Send + Sync {
    /// Send one query to `upstream` and return its single response.
    ///
    /// Every call is an independent exchange; nothing is retried or pooled.
    async fn forward(
        &self,
        query: &Message,
        upstream: &UpstreamAddr,
    ) -> Result<Message, DomainError>;
}
