use super::glob::{glob_match, is_wildcard};
use crate::collections::{Array, HashTable, HeapStorage};
use ferrous_forwarder_domain::DomainError;
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Span {
    offset: u32,
    len: u32,
}

impl Span {
    #[inline]
    fn slice<'a>(&self, arena: &'a [u8]) -> &'a [u8] {
        &arena[self.offset as usize..(self.offset + self.len) as usize]
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Entry {
    pattern: Span,
    data: Option<Span>,
}

/// A successful match: the stored pattern and the data attached to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainMatch<'a> {
    pub pattern: &'a str,
    pub data: Option<&'a [u8]>,
}

impl<'a> DomainMatch<'a> {
    pub fn data_str(&self) -> Option<&'a str> {
        self.data.and_then(|d| std::str::from_utf8(d).ok())
    }
}

/// Exact-plus-wildcard domain set with per-entry data.
///
/// Literal patterns go to a hash table, patterns containing `?` or `*` to a
/// list scanned in insertion order. Pattern text and attached data live in two
/// append-only arenas referenced by offset. Instances are immutable once
/// published; reloads build a new matcher and swap it in.
#[derive(Clone)]
pub struct DomainMatcher {
    exact: HashTable<HeapStorage<Entry>>,
    wildcards: Array<Entry>,
    strings: Vec<u8>,
    data: Vec<u8>,
}

impl DomainMatcher {
    pub fn new() -> Self {
        Self::with_capacity(16)
    }

    pub fn with_capacity(expected: usize) -> Self {
        Self {
            exact: HashTable::new(expected),
            wildcards: Array::with_capacity(4),
            strings: Vec::new(),
            data: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.exact.node_count() + self.wildcards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn wildcard_count(&self) -> usize {
        self.wildcards.len()
    }

    fn push_bytes(arena: &mut Vec<u8>, bytes: &[u8]) -> Result<Span, DomainError> {
        let offset = u32::try_from(arena.len())
            .map_err(|_| DomainError::CapacityExhausted("domain matcher arena"))?;
        let len = u32::try_from(bytes.len())
            .map_err(|_| DomainError::CapacityExhausted("domain matcher arena"))?;
        arena.extend_from_slice(bytes);
        Ok(Span { offset, len })
    }

    /// Adds `pattern`, lowercased, with optional attached data.
    pub fn add(&mut self, pattern: &str, data: Option<&[u8]>) -> Result<(), DomainError> {
        let pattern = pattern.trim().to_ascii_lowercase();
        if pattern.is_empty() {
            return Err(DomainError::InvalidDomainName(pattern));
        }

        let entry = Entry {
            pattern: Self::push_bytes(&mut self.strings, pattern.as_bytes())?,
            data: data
                .map(|d| Self::push_bytes(&mut self.data, d))
                .transpose()?,
        };

        if is_wildcard(&pattern) {
            self.wildcards
                .push_back(entry)
                .ok_or(DomainError::CapacityExhausted("domain matcher wildcards"))?;
        } else {
            self.exact.add(pattern.as_bytes(), &entry, None)?;
        }
        Ok(())
    }

    /// Adds `pattern` unless the exact same pattern is already present.
    /// Returns whether it was added.
    pub fn add_unique(&mut self, pattern: &str, data: Option<&[u8]>) -> Result<bool, DomainError> {
        let lowered = pattern.trim().to_ascii_lowercase();
        if self.contains_pattern(&lowered) {
            return Ok(false);
        }
        self.add(&lowered, data)?;
        Ok(true)
    }

    fn contains_pattern(&self, pattern: &str) -> bool {
        if is_wildcard(pattern) {
            self.wildcards
                .iter()
                .any(|e| e.pattern.slice(&self.strings) == pattern.as_bytes())
        } else {
            self.find_exact(pattern).is_some()
        }
    }

    fn to_match(&self, entry: &Entry) -> DomainMatch<'_> {
        DomainMatch {
            pattern: std::str::from_utf8(entry.pattern.slice(&self.strings)).unwrap_or_default(),
            data: entry.data.map(|span| span.slice(&self.data)),
        }
    }

    fn find_exact(&self, domain: &str) -> Option<DomainMatch<'_>> {
        self.exact
            .chain(domain.as_bytes(), None)
            .map(|node| self.exact.record(node))
            .find(|entry| entry.pattern.slice(&self.strings) == domain.as_bytes())
            .map(|entry| self.to_match(&entry))
    }

    /// Exact lookup first, then the wildcard list; the first wildcard inserted
    /// that matches wins.
    pub fn find(&self, domain: &str) -> Option<DomainMatch<'_>> {
        let domain = lowercase(domain);
        if let Some(found) = self.find_exact(&domain) {
            return Some(found);
        }
        self.wildcards
            .iter()
            .find(|entry| {
                std::str::from_utf8(entry.pattern.slice(&self.strings))
                    .is_ok_and(|pattern| glob_match(pattern, &domain))
            })
            .map(|entry| self.to_match(entry))
    }

    pub fn matches(&self, domain: &str) -> bool {
        self.find(domain).is_some()
    }

    /// Like [`find`](Self::find), also trying every parent zone:
    /// `a.b.example.com`, `b.example.com`, `example.com`, `com`.
    pub fn find_with_parents(&self, domain: &str) -> Option<DomainMatch<'_>> {
        let mut candidate = domain.trim_end_matches('.');
        loop {
            if let Some(found) = self.find(candidate) {
                return Some(found);
            }
            match candidate.find('.') {
                Some(dot) => candidate = &candidate[dot + 1..],
                None => return None,
            }
        }
    }

    pub fn matches_with_parents(&self, domain: &str) -> bool {
        self.find_with_parents(domain).is_some()
    }
}

impl Default for DomainMatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn lowercase(domain: &str) -> Cow<'_, str> {
    if domain.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(domain.to_ascii_lowercase())
    } else {
        Cow::Borrowed(domain)
    }
}
