use crate::dns::filters::BlockedIpSet;
use crate::dns::wire::{first_answer_address, has_opt_record, message_id, rcode, RCODE_NOERROR};
use std::fmt;
use std::net::IpAddr;

/// Why a UDP datagram was not accepted as the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Truncated,
    IdMismatch { expected: u16, got: u16 },
    ErrorCode(u8),
    BlockedAddress(IpAddr),
    MissingOpt,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Truncated => f.write_str("short packet"),
            Rejection::IdMismatch { expected, got } => {
                write!(f, "id mismatch (expected {expected}, got {got})")
            }
            Rejection::ErrorCode(code) => write!(f, "rcode {code}"),
            Rejection::BlockedAddress(addr) => write!(f, "blocked address {addr}"),
            Rejection::MissingOpt => f.write_str("missing OPT record"),
        }
    }
}

/// Heuristics against forged UDP answers.
#[derive(Debug, Default)]
pub struct ResponseValidator {
    blocked: Option<BlockedIpSet>,
    append_edns: bool,
}

impl ResponseValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects answers whose first address record is in `blocked`.
    pub fn with_blocked_ips(mut self, blocked: BlockedIpSet) -> Self {
        self.blocked = Some(blocked);
        self
    }

    /// Appends an OPT probe to outgoing queries and requires it echoed back.
    pub fn with_edns_probe(mut self, enabled: bool) -> Self {
        self.append_edns = enabled;
        self
    }

    pub fn appends_edns(&self) -> bool {
        self.append_edns
    }

    pub fn check(&self, response: &[u8], expected_id: u16) -> Result<(), Rejection> {
        let got = message_id(response).ok_or(Rejection::Truncated)?;
        if got != expected_id {
            return Err(Rejection::IdMismatch {
                expected: expected_id,
                got,
            });
        }
        let code = rcode(response);
        if code != RCODE_NOERROR {
            return Err(Rejection::ErrorCode(code));
        }
        if let Some(blocked) = &self.blocked {
            if let Some(addr) = first_answer_address(response) {
                if blocked.contains(addr) {
                    return Err(Rejection::BlockedAddress(addr));
                }
            }
        }
        if self.append_edns && !has_opt_record(response) {
            return Err(Rejection::MissingOpt);
        }
        Ok(())
    }
}
