use std::fmt;

/// Where an answer handed back to a client came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuerySource {
    Hosts,
    Cache,
    Udp,
    Tcp,
}

impl QuerySource {
    /// Single-letter tag used in query logs.
    pub fn tag(&self) -> char {
        match self {
            QuerySource::Hosts => 'H',
            QuerySource::Cache => 'C',
            QuerySource::Udp => 'U',
            QuerySource::Tcp => 'T',
        }
    }
}

impl fmt::Display for QuerySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Terminal state of one pass through the dispatch pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Type or domain is administratively disabled.
    Disabled,
    /// Every upstream attempt failed.
    Error,
    /// `len` bytes of response are ready in the context's buffer.
    Answered { len: usize, source: QuerySource },
}

impl QueryOutcome {
    pub fn source(&self) -> Option<QuerySource> {
        match self {
            QueryOutcome::Answered { source, .. } => Some(*source),
            _ => None,
        }
    }
}
