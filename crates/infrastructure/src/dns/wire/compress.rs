use hickory_proto::op::Message;
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::borrow::Cow;

/// Re-encodes `msg` with name compression. Returns the input untouched if
/// it does not parse or the re-encoded form is not shorter.
pub fn compress(msg: &[u8]) -> Cow<'_, [u8]> {
    let Ok(message) = Message::from_vec(msg) else {
        return Cow::Borrowed(msg);
    };

    let mut buf = Vec::with_capacity(msg.len());
    let mut encoder = BinEncoder::new(&mut buf);
    if message.emit(&mut encoder).is_err() {
        return Cow::Borrowed(msg);
    }

    if buf.len() < msg.len() {
        Cow::Owned(buf)
    } else {
        Cow::Borrowed(msg)
    }
}
