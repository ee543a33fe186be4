use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch; the cache timestamps entries with this.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
