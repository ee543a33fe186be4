use ferrous_forwarder_domain::{RecordClass, RecordType};

pub const CONTENT_START: u8 = 0xFF;
pub const CONTENT_END: u8 = 0x0A;
pub const CONTENT_EXPIRED: u8 = 0xFD;
pub const CONTENT_PADDING: u8 = 0xFE;
const KEY_TERMINATOR: u8 = 0x00;

/// Payload metadata kept in a hash-table node of the cache region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryMeta {
    pub offset: u32,
    pub ttl: u32,
    pub time_added: u64,
    /// Bytes reserved at `offset`, padding included.
    pub length: u32,
}

impl EntryMeta {
    pub fn end(&self) -> usize {
        self.offset as usize + self.length as usize
    }
}

/// Hash key of a cached record: `name\x01type\x01class`, numbers in decimal.
pub fn cache_key(name: &str, rtype: RecordType, class: RecordClass) -> Vec<u8> {
    let name = name.trim_end_matches('.').to_ascii_lowercase();
    format!("{}\x01{}\x01{}", name, rtype.to_u16(), class.to_u16()).into_bytes()
}

pub fn round_up(len: usize) -> usize {
    (len + 7) & !7
}

/// Serialized payload: start sentinel, key, terminator, rdlen, rdata, end sentinel.
pub fn encode_content(key: &[u8], rdata: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(key.len() + rdata.len() + 5);
    out.push(CONTENT_START);
    out.extend_from_slice(key);
    out.push(KEY_TERMINATOR);
    out.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
    out.extend_from_slice(rdata);
    out.push(CONTENT_END);
    out
}

/// Borrowed view over an encoded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentView<'a> {
    pub key: &'a [u8],
    pub rdata: &'a [u8],
}

impl<'a> ContentView<'a> {
    /// Parses the payload at the start of `bytes`. Expired or padded
    /// payloads yield `None`.
    pub fn parse(bytes: &'a [u8]) -> Option<Self> {
        if bytes.first() != Some(&CONTENT_START) {
            return None;
        }
        let key_len = bytes[1..].iter().position(|&b| b == KEY_TERMINATOR)?;
        let key = &bytes[1..1 + key_len];
        let len_at = 2 + key_len;
        let rdlen = u16::from_be_bytes(bytes.get(len_at..len_at + 2)?.try_into().ok()?) as usize;
        let rdata = bytes.get(len_at + 2..len_at + 2 + rdlen)?;
        if bytes.get(len_at + 2 + rdlen) != Some(&CONTENT_END) {
            return None;
        }
        Some(Self { key, rdata })
    }

    /// Splits the key back into its name, type and class.
    pub fn question(&self) -> Option<(&'a str, RecordType, RecordClass)> {
        let text = std::str::from_utf8(self.key).ok()?;
        let mut parts = text.split('\x01');
        let name = parts.next()?;
        let rtype = parts.next()?.parse::<u16>().ok()?;
        let class = parts.next()?.parse::<u16>().ok()?;
        Some((name, RecordType::from_u16(rtype), RecordClass::from_u16(class)))
    }
}

/// True if the payload at the start of `bytes` belongs to `key`.
pub fn content_has_key(bytes: &[u8], key: &[u8]) -> bool {
    bytes.len() > key.len() + 1
        && bytes[0] == CONTENT_START
        && &bytes[1..1 + key.len()] == key
        && bytes[1 + key.len()] == KEY_TERMINATOR
}
