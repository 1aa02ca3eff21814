#![allow(dead_code)]

use async_trait::async_trait;
use doq_gateway_application::ports::{DoqSession, DoqStream, QueryMetricsSink, UpstreamForwarder};
use doq_gateway_domain::{DoqErrorCode, DomainError, UpstreamAddr};
use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::opt::EdnsOption;
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::collections::{HashMap, VecDeque};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub const ANSWER_IP: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);

pub fn upstream() -> UpstreamAddr {
    "127.0.0.1:53".parse().unwrap()
}

// ── message builders ───────────────────────────────────────────────────────

pub fn build_query(id: u16, name: &str) -> Message {
    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true);
    message.add_query(Query::query(Name::from_ascii(name).unwrap(), RecordType::A));
    message
}

pub fn build_keepalive_query(id: u16, name: &str) -> Message {
    let mut message = build_query(id, name);
    let mut edns = Edns::new();
    edns.set_max_payload(1232);
    edns.options_mut()
        .insert(EdnsOption::Unknown(11, vec![0x00, 0x64]));
    message.set_edns(edns);
    message
}

pub fn pack(message: &Message) -> Vec<u8> {
    message.to_vec().unwrap()
}

/// Answers `query` with one A record, keeping the ID it was sent with.
pub fn answer_for(query: &Message) -> Message {
    let mut response = Message::new();
    response
        .set_id(query.id())
        .set_message_type(MessageType::Response)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(query.recursion_desired())
        .set_recursion_available(true)
        .set_response_code(ResponseCode::NoError);
    for q in query.queries() {
        response.add_query(q.clone());
        response.add_answer(Record::from_rdata(
            q.name().clone(),
            60,
            RData::A(A(ANSWER_IP)),
        ));
    }
    response
}

// ── MockStream ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct StreamState {
    pub written: Mutex<Vec<u8>>,
    pub write_calls: AtomicUsize,
    pub close_calls: AtomicUsize,
    closed: Notify,
}

impl StreamState {
    pub fn written(&self) -> Vec<u8> {
        self.written.lock().unwrap().clone()
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn response(&self) -> Message {
        Message::from_vec(&self.written()).unwrap()
    }

    pub async fn wait_closed(&self, timeout: Duration) -> bool {
        let wait = async {
            loop {
                let notified = self.closed.notified();
                if self.close_calls() > 0 {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(timeout, wait).await.is_ok()
    }
}

#[derive(Clone, Copy)]
pub enum WriteBehavior {
    Full,
    Short(usize),
    Fail,
}

pub struct MockStream {
    input: Result<Vec<u8>, DomainError>,
    write_behavior: WriteBehavior,
    state: Arc<StreamState>,
}

impl MockStream {
    pub fn new(input: Vec<u8>) -> (Self, Arc<StreamState>) {
        Self::build(Ok(input), WriteBehavior::Full)
    }

    pub fn with_query(query: &Message) -> (Self, Arc<StreamState>) {
        Self::new(pack(query))
    }

    pub fn failing_read() -> (Self, Arc<StreamState>) {
        Self::build(
            Err(DomainError::StreamRead("connection lost".to_string())),
            WriteBehavior::Full,
        )
    }

    pub fn with_write_behavior(input: Vec<u8>, behavior: WriteBehavior) -> (Self, Arc<StreamState>) {
        Self::build(Ok(input), behavior)
    }

    fn build(
        input: Result<Vec<u8>, DomainError>,
        write_behavior: WriteBehavior,
    ) -> (Self, Arc<StreamState>) {
        let state = Arc::new(StreamState::default());
        (
            Self {
                input,
                write_behavior,
                state: state.clone(),
            },
            state,
        )
    }
}

#[async_trait]
impl DoqStream for MockStream {
    async fn read_to_end(&mut self, size_limit: usize) -> Result<Vec<u8>, DomainError> {
        match &self.input {
            Ok(bytes) if bytes.len() > size_limit => {
                Err(DomainError::StreamRead("stream too long".to_string()))
            }
            Ok(bytes) => Ok(bytes.clone()),
            Err(e) => Err(e.clone()),
        }
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<usize, DomainError> {
        self.state.write_calls.fetch_add(1, Ordering::SeqCst);
        match self.write_behavior {
            WriteBehavior::Full => {
                self.state.written.lock().unwrap().extend_from_slice(bytes);
                Ok(bytes.len())
            }
            WriteBehavior::Short(n) => {
                let n = n.min(bytes.len());
                self.state
                    .written
                    .lock()
                    .unwrap()
                    .extend_from_slice(&bytes[..n]);
                Ok(n)
            }
            WriteBehavior::Fail => Err(DomainError::StreamWrite("stream reset".to_string())),
        }
    }

    async fn close(&mut self) {
        self.state.close_calls.fetch_add(1, Ordering::SeqCst);
        self.state.closed.notify_waiters();
    }
}

// ── MockSession ────────────────────────────────────────────────────────────

pub struct MockSession {
    streams: Mutex<VecDeque<MockStream>>,
    accept_calls: AtomicUsize,
    closes: Arc<Mutex<Vec<(DoqErrorCode, String)>>>,
}

impl MockSession {
    /// Hands out `streams` in order, then fails the next accept as if the
    /// peer had closed the connection.
    pub fn new(streams: Vec<MockStream>) -> Self {
        Self {
            streams: Mutex::new(streams.into()),
            accept_calls: AtomicUsize::new(0),
            closes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn closes_handle(&self) -> Arc<Mutex<Vec<(DoqErrorCode, String)>>> {
        self.closes.clone()
    }
}

#[async_trait]
impl DoqSession for MockSession {
    type Stream = MockStream;

    async fn accept_stream(&self) -> Result<MockStream, DomainError> {
        self.accept_calls.fetch_add(1, Ordering::SeqCst);
        self.streams
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| DomainError::SessionAccept("connection closed by peer".to_string()))
    }

    fn close_with_error(&self, code: DoqErrorCode, reason: &str) {
        self.closes.lock().unwrap().push((code, reason.to_string()));
    }

    fn remote_addr(&self) -> SocketAddr {
        "192.0.2.10:40000".parse().unwrap()
    }
}

// ── MockForwarder ──────────────────────────────────────────────────────────

pub struct MockForwarder {
    received: Mutex<Vec<Message>>,
    failures: Mutex<HashMap<String, DomainError>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    fail_all: Mutex<Option<DomainError>>,
}

impl MockForwarder {
    pub fn new() -> Self {
        Self {
            received: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            fail_all: Mutex::new(None),
        }
    }

    pub fn failing(error: DomainError) -> Self {
        let forwarder = Self::new();
        *forwarder.fail_all.lock().unwrap() = Some(error);
        forwarder
    }

    pub fn fail_name(&self, name: &str, error: DomainError) {
        self.failures
            .lock()
            .unwrap()
            .insert(name.to_string(), error);
    }

    /// Holds queries for `name` until the returned handle is notified.
    pub fn hold_name(&self, name: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(name.to_string(), gate.clone());
        gate
    }

    pub fn received(&self) -> Vec<Message> {
        self.received.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

impl Default for MockForwarder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpstreamForwarder for MockForwarder {
    async fn forward(
        &self,
        query: &Message,
        _upstream: &UpstreamAddr,
    ) -> Result<Message, DomainError> {
        self.received.lock().unwrap().push(query.clone());

        let name = query
            .queries()
            .first()
            .map(|q| q.name().to_ascii())
            .unwrap_or_default();

        let gate = self.gates.lock().unwrap().get(&name).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if let Some(err) = self.fail_all.lock().unwrap().clone() {
            return Err(err);
        }
        if let Some(err) = self.failures.lock().unwrap().get(&name).cloned() {
            return Err(err);
        }

        Ok(answer_for(query))
    }
}

// ── CountingMetrics ────────────────────────────────────────────────────────

#[derive(Default)]
pub struct CountingMetrics {
    queries: AtomicU64,
    valid_queries: AtomicU64,
    upstream_errors: AtomicU64,
}

impl CountingMetrics {
    pub fn queries(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn valid_queries(&self) -> u64 {
        self.valid_queries.load(Ordering::SeqCst)
    }

    pub fn upstream_errors(&self) -> u64 {
        self.upstream_errors.load(Ordering::SeqCst)
    }
}

impl QueryMetricsSink for CountingMetrics {
    fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }

    fn record_valid_query(&self) {
        self.valid_queries.fetch_add(1, Ordering::SeqCst);
    }

    fn record_upstream_error(&self) {
        self.upstream_errors.fetch_add(1, Ordering::SeqCst);
    }
}
