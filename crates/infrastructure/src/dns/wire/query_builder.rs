use super::reader::{additional_count, HEADER_LEN};
use ferrous_forwarder_domain::{DomainError, RecordType};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RecordType as HickoryRecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;

const EDNS_UDP_PAYLOAD: u16 = 1280;

/// Builds a recursive query for `domain` with a random ID.
///
/// Used when the forwarder has to ask upstream on its own, for instance
/// to chase a CNAME found in the hosts table.
pub fn build_query(domain: &str, record_type: RecordType) -> Result<(u16, Vec<u8>), DomainError> {
    let name = Name::from_str(domain).map_err(|e| {
        DomainError::InvalidDomainName(format!("Invalid domain '{}': {}", domain, e))
    })?;

    let mut query = Query::new();
    query.set_name(name);
    query.set_query_type(HickoryRecordType::from(record_type.to_u16()));
    query.set_query_class(DNSClass::IN);

    let id = fastrand::u16(..);
    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.metadata.recursion_desired = true;
    message.add_query(query);

    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    message.emit(&mut encoder).map_err(|e| {
        DomainError::MalformedMessage(format!("Failed to serialize DNS query: {}", e))
    })?;
    Ok((id, buf))
}

/// Appends an OPT pseudo-record advertising a 1280-byte UDP payload,
/// unless the query already carries one.
pub fn append_edns_probe(query: &mut Vec<u8>) {
    if query.len() < HEADER_LEN || super::has_opt_record(query) {
        return;
    }
    let arcount = additional_count(query).saturating_add(1);
    query[10..12].copy_from_slice(&arcount.to_be_bytes());

    query.push(0);
    query.extend_from_slice(&RecordType::OPT.to_u16().to_be_bytes());
    query.extend_from_slice(&EDNS_UDP_PAYLOAD.to_be_bytes());
    query.extend_from_slice(&[0, 0, 0, 0]);
    query.extend_from_slice(&[0, 0]);
}
