use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid server address: {0}")]
    InvalidServerAddress(String),

    #[error("Malformed DNS message: {0}")]
    MalformedMessage(String),

    #[error("Capacity exhausted: {0}")]
    CapacityExhausted(&'static str),

    #[error("Query refused by policy")]
    Refused,

    #[error("Timeout waiting for {server}")]
    TransportTimeout { server: String },

    #[error("Transport error with {server}: {reason}")]
    Transport { server: String, reason: String },

    #[error("No upstream server available for {protocol}")]
    NoUpstream { protocol: &'static str },

    #[error("All upstream attempts failed")]
    AllServersFailed,

    #[error("CNAME loop detected at {name}")]
    RecursionLoop { name: String },

    #[error("Cache region is incompatible: {0}")]
    CacheIncompatible(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::Io(e.to_string())
    }
}
