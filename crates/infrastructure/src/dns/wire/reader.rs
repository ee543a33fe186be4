use ferrous_forwarder_domain::{DomainError, RecordClass, RecordType};

pub const HEADER_LEN: usize = 12;
const MAX_NAME_LEN: usize = 255;
const MAX_POINTER_HOPS: usize = 32;

#[inline]
fn u16_at(msg: &[u8], pos: usize) -> u16 {
    u16::from_be_bytes([msg[pos], msg[pos + 1]])
}

pub fn message_id(msg: &[u8]) -> Option<u16> {
    (msg.len() >= 2).then(|| u16_at(msg, 0))
}

pub fn rcode(msg: &[u8]) -> u8 {
    msg.get(3).map(|b| b & 0x0F).unwrap_or(0)
}

pub fn question_count(msg: &[u8]) -> u16 {
    if msg.len() < HEADER_LEN {
        return 0;
    }
    u16_at(msg, 4)
}

pub fn answer_count(msg: &[u8]) -> u16 {
    if msg.len() < HEADER_LEN {
        return 0;
    }
    u16_at(msg, 6)
}

pub fn authority_count(msg: &[u8]) -> u16 {
    if msg.len() < HEADER_LEN {
        return 0;
    }
    u16_at(msg, 8)
}

pub fn additional_count(msg: &[u8]) -> u16 {
    if msg.len() < HEADER_LEN {
        return 0;
    }
    u16_at(msg, 10)
}

fn malformed(what: &str) -> DomainError {
    DomainError::MalformedMessage(what.to_string())
}

/// Reads a possibly compressed name at `pos`.
///
/// Returns the lowercased dotted name (empty for the root) and the offset just
/// past the name in the original position, not past any pointer target.
pub fn read_name(msg: &[u8], pos: usize) -> Result<(String, usize), DomainError> {
    let mut name = String::new();
    let mut cursor = pos;
    let mut end = None;
    let mut hops = 0;

    loop {
        let len = *msg.get(cursor).ok_or_else(|| malformed("name runs past end"))? as usize;
        match len & 0xC0 {
            0x00 => {
                if len == 0 {
                    return Ok((name, end.unwrap_or(cursor + 1)));
                }
                let label = msg
                    .get(cursor + 1..cursor + 1 + len)
                    .ok_or_else(|| malformed("label runs past end"))?;
                if !name.is_empty() {
                    name.push('.');
                }
                name.extend(label.iter().map(|b| b.to_ascii_lowercase() as char));
                if name.len() > MAX_NAME_LEN {
                    return Err(malformed("name too long"));
                }
                cursor += 1 + len;
            }
            0xC0 => {
                let low = *msg
                    .get(cursor + 1)
                    .ok_or_else(|| malformed("pointer runs past end"))?;
                if end.is_none() {
                    end = Some(cursor + 2);
                }
                hops += 1;
                if hops > MAX_POINTER_HOPS {
                    return Err(malformed("compression loop"));
                }
                cursor = ((len & 0x3F) << 8) | low as usize;
            }
            _ => return Err(malformed("extended label type")),
        }
    }
}

pub fn skip_name(msg: &[u8], mut pos: usize) -> Result<usize, DomainError> {
    loop {
        let len = *msg.get(pos).ok_or_else(|| malformed("name runs past end"))? as usize;
        match len & 0xC0 {
            0x00 if len == 0 => return Ok(pos + 1),
            0x00 => pos += 1 + len,
            0xC0 => return Ok(pos + 2),
            _ => return Err(malformed("extended label type")),
        }
    }
}

/// The first question of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: String,
    pub qtype: RecordType,
    pub qclass: RecordClass,
    /// Offset just past the question.
    pub end: usize,
}

pub fn extract_question(msg: &[u8]) -> Result<Question, DomainError> {
    if msg.len() < HEADER_LEN {
        return Err(malformed("short header"));
    }
    if question_count(msg) == 0 {
        return Err(malformed("no question"));
    }
    let (name, pos) = read_name(msg, HEADER_LEN)?;
    if pos + 4 > msg.len() {
        return Err(malformed("question truncated"));
    }
    Ok(Question {
        name,
        qtype: RecordType::from_u16(u16_at(msg, pos)),
        qclass: RecordClass::from_u16(u16_at(msg, pos + 2)),
        end: pos + 4,
    })
}
