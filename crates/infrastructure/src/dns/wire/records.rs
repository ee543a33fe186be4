use super::reader::{
    additional_count, answer_count, authority_count, question_count, read_name, skip_name,
    HEADER_LEN,
};
use super::writer::write_name;
use ferrous_forwarder_domain::{DomainError, RecordClass, RecordType};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// One resource record with its RDATA made self-contained: names embedded in
/// the RDATA are expanded, so the bytes can be stored and replayed anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordView {
    pub name: String,
    pub rtype: RecordType,
    pub class: RecordClass,
    pub ttl: u32,
    pub rdata: Vec<u8>,
}

impl RecordView {
    /// The target name of a CNAME record.
    pub fn cname_target(&self) -> Option<String> {
        if self.rtype != RecordType::CNAME {
            return None;
        }
        read_name(&self.rdata, 0).ok().map(|(name, _)| name)
    }

    pub fn address(&self) -> Option<IpAddr> {
        match (self.rtype, self.rdata.len()) {
            (RecordType::A, 4) => {
                let o: [u8; 4] = self.rdata[..4].try_into().ok()?;
                Some(IpAddr::V4(Ipv4Addr::from(o)))
            }
            (RecordType::AAAA, 16) => {
                let o: [u8; 16] = self.rdata[..16].try_into().ok()?;
                Some(IpAddr::V6(Ipv6Addr::from(o)))
            }
            _ => None,
        }
    }
}

fn malformed(what: &str) -> DomainError {
    DomainError::MalformedMessage(what.to_string())
}

fn skip_questions(msg: &[u8]) -> Result<usize, DomainError> {
    let mut pos = HEADER_LEN;
    for _ in 0..question_count(msg) {
        pos = skip_name(msg, pos)? + 4;
    }
    if pos > msg.len() {
        return Err(malformed("question section truncated"));
    }
    Ok(pos)
}

fn read_record(msg: &[u8], pos: usize) -> Result<(RecordView, usize), DomainError> {
    let (name, after_name) = read_name(msg, pos)?;
    let header = msg
        .get(after_name..after_name + 10)
        .ok_or_else(|| malformed("record header truncated"))?;
    let rtype = RecordType::from_u16(u16::from_be_bytes([header[0], header[1]]));
    let class = RecordClass::from_u16(u16::from_be_bytes([header[2], header[3]]));
    let ttl = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
    let rdlen = u16::from_be_bytes([header[8], header[9]]) as usize;
    let rdata_start = after_name + 10;
    let rdata_end = rdata_start + rdlen;
    if rdata_end > msg.len() {
        return Err(malformed("rdata truncated"));
    }

    let rdata = expand_rdata(msg, rtype, rdata_start, rdata_end)?;
    Ok((
        RecordView {
            name,
            rtype,
            class,
            ttl,
            rdata,
        },
        rdata_end,
    ))
}

/// Copies RDATA, replacing compressed names with their full form.
fn expand_rdata(
    msg: &[u8],
    rtype: RecordType,
    start: usize,
    end: usize,
) -> Result<Vec<u8>, DomainError> {
    if !rtype.rdata_has_names() {
        return Ok(msg[start..end].to_vec());
    }

    let mut out = Vec::with_capacity(end - start + 16);
    let mut pos = start;
    let fixed_prefix = match rtype {
        RecordType::MX => 2,
        RecordType::SRV => 6,
        _ => 0,
    };
    out.extend_from_slice(
        msg.get(pos..pos + fixed_prefix)
            .ok_or_else(|| malformed("rdata truncated"))?,
    );
    pos += fixed_prefix;

    let names = if rtype == RecordType::SOA { 2 } else { 1 };
    for _ in 0..names {
        let (name, next) = read_name(msg, pos)?;
        write_name(&mut out, &name)?;
        pos = next;
    }

    if pos < end {
        out.extend_from_slice(&msg[pos..end]);
    }
    Ok(out)
}

/// Every record in the answer section, in order.
pub fn answer_records(msg: &[u8]) -> Result<Vec<RecordView>, DomainError> {
    let mut pos = skip_questions(msg)?;
    let count = answer_count(msg) as usize;
    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        let (record, next) = read_record(msg, pos)?;
        records.push(record);
        pos = next;
    }
    Ok(records)
}

/// The `n`th answer record, zero-based.
pub fn nth_answer(msg: &[u8], n: usize) -> Result<Option<RecordView>, DomainError> {
    if n >= answer_count(msg) as usize {
        return Ok(None);
    }
    let mut pos = skip_questions(msg)?;
    for _ in 0..n {
        pos = skip_record(msg, pos)?;
    }
    read_record(msg, pos).map(|(record, _)| Some(record))
}

fn skip_record(msg: &[u8], pos: usize) -> Result<usize, DomainError> {
    let after_name = skip_name(msg, pos)?;
    let header = msg
        .get(after_name..after_name + 10)
        .ok_or_else(|| malformed("record header truncated"))?;
    let rdlen = u16::from_be_bytes([header[8], header[9]]) as usize;
    let next = after_name + 10 + rdlen;
    if next > msg.len() {
        return Err(malformed("rdata truncated"));
    }
    Ok(next)
}

/// Address carried by the first A or AAAA answer, if any.
pub fn first_answer_address(msg: &[u8]) -> Option<IpAddr> {
    let mut pos = skip_questions(msg).ok()?;
    for _ in 0..answer_count(msg) {
        let after_name = skip_name(msg, pos).ok()?;
        let header = msg.get(after_name..after_name + 10)?;
        let rtype = u16::from_be_bytes([header[0], header[1]]);
        let rdlen = u16::from_be_bytes([header[8], header[9]]) as usize;
        let rdata = msg.get(after_name + 10..after_name + 10 + rdlen)?;
        match (rtype, rdlen) {
            (1, 4) => {
                let o: [u8; 4] = rdata.try_into().ok()?;
                return Some(IpAddr::V4(Ipv4Addr::from(o)));
            }
            (28, 16) => {
                let o: [u8; 16] = rdata.try_into().ok()?;
                return Some(IpAddr::V6(Ipv6Addr::from(o)));
            }
            _ => pos = after_name + 10 + rdlen,
        }
    }
    None
}

/// Whether the additional section carries an OPT pseudo-record.
pub fn has_opt_record(msg: &[u8]) -> bool {
    let Ok(mut pos) = skip_questions(msg) else {
        return false;
    };
    let preceding = answer_count(msg) as usize + authority_count(msg) as usize;
    for _ in 0..preceding {
        match skip_record(msg, pos) {
            Ok(next) => pos = next,
            Err(_) => return false,
        }
    }
    for _ in 0..additional_count(msg) {
        let Ok(after_name) = skip_name(msg, pos) else {
            return false;
        };
        match msg.get(after_name..after_name + 2) {
            Some([0x00, 0x29]) => return true,
            Some(_) => {}
            None => return false,
        }
        match skip_record(msg, pos) {
            Ok(next) => pos = next,
            Err(_) => return false,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Response for example.com with a compressed CNAME and an A record.
    fn sample_response() -> Vec<u8> {
        let mut msg = vec![0xAB, 0xCD, 0x81, 0x80, 0, 1, 0, 2, 0, 0, 0, 0];
        msg.extend_from_slice(&[7]);
        msg.extend_from_slice(b"example");
        msg.extend_from_slice(&[3]);
        msg.extend_from_slice(b"com");
        msg.extend_from_slice(&[0, 0, 1, 0, 1]);
        // example.com CNAME www.example.com (www + pointer to 12)
        msg.extend_from_slice(&[0xC0, 0x0C, 0, 5, 0, 1, 0, 0, 0, 60, 0, 6]);
        msg.extend_from_slice(&[3, b'w', b'w', b'w', 0xC0, 0x0C]);
        // www.example.com A 93.184.216.34 (pointer to the CNAME target)
        let target = 12 + 13 + 4 + 12;
        msg.extend_from_slice(&[0xC0, target as u8, 0, 1, 0, 1, 0, 0, 1, 0, 0, 4]);
        msg.extend_from_slice(&[93, 184, 216, 34]);
        msg
    }

    #[test]
    fn test_answer_records_expand_compressed_names() {
        let msg = sample_response();
        let records = answer_records(&msg).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "example.com");
        assert_eq!(records[0].rtype, RecordType::CNAME);
        assert_eq!(records[0].cname_target().as_deref(), Some("www.example.com"));
        assert_eq!(records[1].name, "www.example.com");
        assert_eq!(records[1].ttl, 256);
        assert_eq!(
            records[1].address(),
            Some(IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)))
        );
    }

    #[test]
    fn test_nth_answer_and_first_address() {
        let msg = sample_response();

        assert_eq!(
            nth_answer(&msg, 1).unwrap().unwrap().rtype,
            RecordType::A
        );
        assert_eq!(nth_answer(&msg, 2).unwrap(), None);
        assert_eq!(
            first_answer_address(&msg),
            Some(IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)))
        );
    }

    #[test]
    fn test_opt_detection() {
        let mut msg = sample_response();
        assert!(!has_opt_record(&msg));

        msg[11] = 1;
        msg.extend_from_slice(&[0, 0, 0x29, 0x10, 0, 0, 0, 0, 0, 0, 0]);
        assert!(has_opt_record(&msg));
    }

    #[test]
    fn test_truncated_rdata_is_rejected() {
        let mut msg = sample_response();
        msg.truncate(msg.len() - 2);
        assert!(answer_records(&msg).is_err());
    }
}
