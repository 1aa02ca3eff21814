#![allow(dead_code)]
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

pub const MOCK_ANSWER_IP: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);

/// How the mock resolver reacts to a datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// Answers with one A record for the first question.
    Answer,
    /// Reads the query and never replies.
    Blackhole,
    /// Replies with bytes that are not a DNS message.
    Garbage,
}

/// Plain-UDP resolver on an ephemeral loopback port. Records the ID of
/// every query it sees.
pub struct MockDnsServer {
    addr: SocketAddr,
    received_ids: Arc<Mutex<Vec<u16>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(behavior: MockBehavior) -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let local_addr = socket.local_addr()?;
        let received_ids = Arc::new(Mutex::new(Vec::new()));

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let ids = Arc::clone(&received_ids);

        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = socket.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { continue };
                        let Ok(query) = Message::from_vec(&buf[..len]) else { continue };
                        ids.lock().unwrap().push(query.id());

                        let reply = match behavior {
                            MockBehavior::Answer => Self::build_mock_response(&query),
                            MockBehavior::Blackhole => continue,
                            MockBehavior::Garbage => vec![0xff; 7],
                        };
                        let _ = socket.send_to(&reply, peer).await;
                    }
                }
            }
        });

        Ok(Self {
            addr: local_addr,
            received_ids,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn received_ids(&self) -> Vec<u16> {
        self.received_ids.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.received_ids.lock().unwrap().len()
    }

    pub fn build_mock_response(query: &Message) -> Vec<u8> {
        let mut response = Message::new();
        response
            .set_id(query.id())
            .set_message_type(MessageType::Response)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(query.recursion_desired())
            .set_recursion_available(true)
            .set_response_code(ResponseCode::NoError);

        if let Some(question) = query.queries().first() {
            response.add_query(question.clone());
            response.add_answer(Record::from_rdata(
                question.name().clone(),
                60,
                RData::A(A(MOCK_ANSWER_IP)),
            ));
        }

        response.to_vec().unwrap_or_default()
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

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

pub fn answer_ip(response: &Message) -> Option<Ipv4Addr> {
    response.answers().iter().find_map(|record| match record.data() {
        RData::A(a) => Some(a.0),
        _ => None,
    })
}
