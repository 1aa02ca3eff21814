/// Sink for the gateway's monotonically increasing counters.
///
/// Implementations must tolerate concurrent increments from any number of
/// stream tasks without losing updates.
pub trait QueryMetricsSink: Send + Sync {
    /// A stream delivered at least a minimum-size DNS message.
    fn record_query(&self);

    /// The upstream forward step ran for a stream, whatever its result.
    fn record_valid_query(&self);

    /// A forward attempt failed.
    fn record_upstream_error(&self);
}
