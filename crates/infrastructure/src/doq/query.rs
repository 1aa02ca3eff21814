//! Query construction for the DoQ client.

use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query};
use hickory_proto::rr::{Name, RecordType};

/// UDP payload size advertised in the OPT record.
pub const EDNS_PAYLOAD_SIZE: u16 = 4096;

/// Builds a single-question query with a random ID and an EDNS0 OPT
/// record, the DO bit set when `dnssec` is requested.
pub fn build_query(name: Name, record_type: RecordType, recursion: bool, dnssec: bool) -> Message {
    let mut edns = Edns::new();
    edns.set_max_payload(EDNS_PAYLOAD_SIZE);
    edns.set_dnssec_ok(dnssec);

    let mut message = Message::new();
    message
        .set_id(fastrand::u16(..))
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(recursion);
    message.add_query(Query::query(name, record_type));
    message.set_edns(edns);
    message
}
