use super::reader::HEADER_LEN;
use ferrous_forwarder_domain::{DomainError, RecordClass, RecordType};

/// Compression pointer to the question name of a message.
pub const QUESTION_POINTER: u16 = 0xC00C;

const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_LEN: usize = 255;

/// Writes `name` as uncompressed labels.
pub fn write_name(out: &mut Vec<u8>, name: &str) -> Result<(), DomainError> {
    let name = name.trim_end_matches('.');
    let start = out.len();
    if !name.is_empty() {
        for label in name.split('.') {
            if label.is_empty() || label.len() > MAX_LABEL_LEN {
                out.truncate(start);
                return Err(DomainError::InvalidDomainName(name.to_string()));
            }
            out.push(label.len() as u8);
            out.extend_from_slice(label.as_bytes());
        }
    }
    out.push(0);
    if out.len() - start > MAX_NAME_LEN {
        out.truncate(start);
        return Err(DomainError::InvalidDomainName(name.to_string()));
    }
    Ok(())
}

fn write_record_tail(
    out: &mut Vec<u8>,
    rtype: RecordType,
    class: RecordClass,
    ttl: u32,
    rdata: &[u8],
) -> Result<(), DomainError> {
    let rdlen = u16::try_from(rdata.len())
        .map_err(|_| DomainError::MalformedMessage("rdata longer than 65535".to_string()))?;
    out.extend_from_slice(&rtype.to_u16().to_be_bytes());
    out.extend_from_slice(&class.to_u16().to_be_bytes());
    out.extend_from_slice(&ttl.to_be_bytes());
    out.extend_from_slice(&rdlen.to_be_bytes());
    out.extend_from_slice(rdata);
    Ok(())
}

pub fn serialize_resource_record(
    out: &mut Vec<u8>,
    name: &str,
    rtype: RecordType,
    class: RecordClass,
    ttl: u32,
    rdata: &[u8],
) -> Result<(), DomainError> {
    write_name(out, name)?;
    write_record_tail(out, rtype, class, ttl, rdata)
}

/// Writes a record whose owner is a compression pointer, usually
/// [`QUESTION_POINTER`].
pub fn write_record_with_pointer(
    out: &mut Vec<u8>,
    pointer: u16,
    rtype: RecordType,
    class: RecordClass,
    ttl: u32,
    rdata: &[u8],
) -> Result<(), DomainError> {
    out.extend_from_slice(&pointer.to_be_bytes());
    write_record_tail(out, rtype, class, ttl, rdata)
}

pub fn set_message_id(msg: &mut [u8], id: u16) {
    if msg.len() >= 2 {
        msg[..2].copy_from_slice(&id.to_be_bytes());
    }
}

/// Builds a response to `request`: its ID, opcode and RD flag, its first
/// question, then `answer_count` records already serialized in `answers`.
pub fn build_response(
    request: &[u8],
    question_end: usize,
    rcode: u8,
    answer_count: u16,
    answers: &[u8],
) -> Vec<u8> {
    let question_end = question_end.clamp(HEADER_LEN, request.len().max(HEADER_LEN));
    let mut out = Vec::with_capacity(question_end + answers.len());
    out.extend_from_slice(&request[..HEADER_LEN.min(request.len())]);
    out.resize(HEADER_LEN, 0);

    out[2] = 0x80 | (out[2] & 0x79);
    out[3] = 0x80 | (rcode & 0x0F);
    let has_question = question_end > HEADER_LEN;
    out[4..6].copy_from_slice(&(has_question as u16).to_be_bytes());
    out[6..8].copy_from_slice(&answer_count.to_be_bytes());
    out[8..12].fill(0);

    if has_question {
        out.extend_from_slice(&request[HEADER_LEN..question_end]);
    }
    out.extend_from_slice(answers);
    out
}
