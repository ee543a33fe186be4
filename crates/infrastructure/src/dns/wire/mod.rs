//! Byte-level helpers over raw DNS messages.
//!
//! The hot path reads and writes wire format directly; hickory-proto is used
//! where a full message model is worth its cost (synthetic queries and
//! name compression).
mod compress;
mod query_builder;
mod reader;
mod records;
mod writer;

pub use compress::compress;
pub use query_builder::{append_edns_probe, build_query};
pub use reader::{
    additional_count, answer_count, authority_count, extract_question, message_id, question_count,
    rcode, read_name, skip_name, Question, HEADER_LEN,
};
pub use records::{answer_records, first_answer_address, has_opt_record, nth_answer, RecordView};
pub use writer::{
    build_response, serialize_resource_record, set_message_id, write_name,
    write_record_with_pointer, QUESTION_POINTER,
};

pub const RCODE_NOERROR: u8 = 0;
pub const RCODE_SERVFAIL: u8 = 2;
pub const RCODE_REFUSED: u8 = 5;
