//! GFW-style rule lists reduced to plain domain names.
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ferrous_forwarder_domain::DomainError;
use std::collections::HashSet;
use std::path::Path;

/// Reduces one rule to the domain it names, or `None` for rules that are
/// comments, exceptions, URL paths or patterns.
pub fn parse_gfw_item(item: &str) -> Option<&str> {
    let item = item.trim();
    if item.is_empty()
        || item.contains(['/', '*', '?'])
        || item.starts_with(['@', '!', '['])
        || !item.contains('.')
    {
        return None;
    }
    let item = item.trim_start_matches('|');
    let item = item.strip_prefix('.').unwrap_or(item);
    if item.is_empty() {
        None
    } else {
        Some(item)
    }
}

/// Distinct domains named by the rules in `text`, in file order.
pub fn parse_gfw_list(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.lines()
        .filter_map(parse_gfw_item)
        .map(str::to_ascii_lowercase)
        .filter(|domain| seen.insert(domain.clone()))
        .collect()
}

pub fn decode_base64_list(raw: &[u8]) -> Result<String, DomainError> {
    let compact: Vec<u8> = raw
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let decoded = STANDARD
        .decode(compact)
        .map_err(|e| DomainError::MalformedMessage(format!("GFW list is not base64: {}", e)))?;
    Ok(String::from_utf8_lossy(&decoded).into_owned())
}

pub fn load_gfw_list(path: &Path, base64_encoded: bool) -> Result<Vec<String>, DomainError> {
    let raw = std::fs::read(path)?;
    let text = if base64_encoded {
        decode_base64_list(&raw)?
    } else {
        String::from_utf8_lossy(&raw).into_owned()
    };
    Ok(parse_gfw_list(&text))
}
