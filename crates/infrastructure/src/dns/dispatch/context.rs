use crate::dns::transport::UpstreamSession;
use crate::dns::wire::{build_query, extract_question, question_count, Question};
use ferrous_forwarder_domain::{DomainError, QuerySource};
use smallvec::SmallVec;
use std::net::SocketAddr;

/// State of one request as it moves through the dispatch pipeline.
///
/// A CNAME found in hosts spawns a child context for the target name. The
/// child remembers every ancestor name so a redirect cycle is refused
/// instead of recursing forever, and it borrows the parent's upstream
/// session.
pub struct QueryContext<'s> {
    request: Vec<u8>,
    question: Question,
    single_question: bool,
    client: Option<SocketAddr>,
    ancestors: SmallVec<[String; 4]>,
    session: &'s mut UpstreamSession,
    response: Vec<u8>,
    source: Option<QuerySource>,
}

impl<'s> QueryContext<'s> {
    pub fn new(
        request: &[u8],
        client: Option<SocketAddr>,
        session: &'s mut UpstreamSession,
    ) -> Result<Self, DomainError> {
        let question = extract_question(request)?;
        Ok(Self {
            request: request.to_vec(),
            single_question: question_count(request) == 1,
            question,
            client,
            ancestors: SmallVec::new(),
            session,
            response: Vec::new(),
            source: None,
        })
    }

    /// Builds the sub-query for a hosts CNAME target.
    pub fn child(&mut self, target: &str) -> Result<QueryContext<'_>, DomainError> {
        let target = target.trim_end_matches('.').to_ascii_lowercase();
        if self.is_in_lineage(&target) {
            return Err(DomainError::RecursionLoop { name: target });
        }
        let (_, request) = build_query(&target, self.question.qtype)?;
        let question = extract_question(&request)?;

        let mut ancestors = self.ancestors.clone();
        ancestors.push(self.question.name.clone());
        Ok(QueryContext {
            request,
            question,
            single_question: true,
            client: self.client,
            ancestors,
            session: &mut *self.session,
            response: Vec::new(),
            source: None,
        })
    }

    /// True when `name` is this request or one of its ancestors.
    pub fn is_in_lineage(&self, name: &str) -> bool {
        self.question.name == name || self.ancestors.iter().any(|a| a == name)
    }

    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    pub fn request(&self) -> &[u8] {
        &self.request
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn single_question(&self) -> bool {
        self.single_question
    }

    pub fn client(&self) -> Option<SocketAddr> {
        self.client
    }

    pub fn session(&mut self) -> &mut UpstreamSession {
        &mut *self.session
    }

    pub fn response(&self) -> &[u8] {
        &self.response
    }

    pub fn into_response(self) -> Vec<u8> {
        self.response
    }

    /// Where the response came from, once answered.
    pub fn source(&self) -> Option<QuerySource> {
        self.source
    }

    pub(super) fn request_and_session(&mut self) -> (&[u8], &mut UpstreamSession) {
        (&self.request, &mut *self.session)
    }

    pub(super) fn set_response(&mut self, response: Vec<u8>, source: QuerySource) {
        self.response = response;
        self.source = Some(source);
    }
}
