//! The per-request pipeline from a parsed question to response bytes.
mod context;
mod dispatcher;

pub use context::QueryContext;
pub use dispatcher::{DnsDispatcher, ProtocolPolicy, HOSTS_TTL};
