use super::entry::{
    cache_key, content_has_key, encode_content, round_up, ContentView, EntryMeta,
    CONTENT_EXPIRED, CONTENT_PADDING,
};
use super::region::{header, Region, HEADER_LEN, NODE_LEN, SLOT_LEN};
use super::storage::RegionStorage;
use crate::collections::HashTable;
use crate::dns::wire::{answer_records, read_name, RecordView};
use ferrous_forwarder_domain::config::cache::MIN_CACHE_SIZE;
use ferrous_forwarder_domain::{CacheConfig, DomainError, RecordClass, RecordType, TtlPolicy};
use ferrous_forwarder_application::ports::CacheSweepOutcome;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

const MAX_CNAME_HOPS: usize = 16;
const SMALL_CACHE_LIMIT: usize = 1_048_576;

/// How stored TTLs run out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryMode {
    /// Stored TTLs are decremented by a one-second sweep.
    Countdown,
    /// Stored TTLs stay fixed; age is computed from the insertion time.
    WallClock,
    /// Records never expire.
    Never,
}

impl ExpiryMode {
    pub fn sweep_interval(&self) -> Option<Duration> {
        match self {
            ExpiryMode::Countdown => Some(Duration::from_secs(1)),
            ExpiryMode::WallClock => Some(Duration::from_secs(59)),
            ExpiryMode::Never => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBacking {
    Memory,
    File {
        path: PathBuf,
        /// Reattach a compatible file left by a previous run.
        reload: bool,
        /// Rebuild an incompatible file instead of failing.
        overwrite: bool,
    },
}

#[derive(Debug, Clone)]
pub struct RecordCacheOptions {
    pub size: usize,
    pub ttl_policy: TtlPolicy,
    pub expiry: ExpiryMode,
    pub backing: CacheBacking,
}

impl RecordCacheOptions {
    pub fn in_memory(size: usize) -> Self {
        Self {
            size,
            ttl_policy: TtlPolicy::Multiply(1),
            expiry: ExpiryMode::Countdown,
            backing: CacheBacking::Memory,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        let expiry = if config.ignore_ttl {
            ExpiryMode::Never
        } else if config.static_ttl_countdown {
            ExpiryMode::WallClock
        } else {
            ExpiryMode::Countdown
        };
        let backing = match (&config.cache_file, config.memory_cache) {
            (Some(path), false) => CacheBacking::File {
                path: PathBuf::from(path),
                reload: config.reload_cache,
                overwrite: config.overwrite_cache,
            },
            _ => CacheBacking::Memory,
        };
        Self {
            size: config.size,
            ttl_policy: config.ttl_policy(),
            expiry,
            backing,
        }
    }

    pub fn with_expiry(mut self, expiry: ExpiryMode) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn with_ttl_policy(mut self, policy: TtlPolicy) -> Self {
        self.ttl_policy = policy;
        self
    }

    pub fn with_backing(mut self, backing: CacheBacking) -> Self {
        self.backing = backing;
        self
    }
}

/// Slot count for a cache region of `size` bytes.
pub fn calculate_cache_slot_count(size: usize) -> usize {
    let raw = if size < SMALL_CACHE_LIMIT {
        (size / 4979).saturating_sub(18)
    } else {
        let ln = (size as f64).ln();
        (ln * ln) as usize
    };
    raw / 10 * 10 + 6
}

/// DNS answer records kept in one contiguous region.
///
/// Records are keyed by name, type and class; several records may share a
/// key. Payloads are placed at the region's end cursor or recycled from a
/// freed node of the same rounded length, so a steady workload stops
/// growing the payload area.
pub struct RecordCache {
    table: HashTable<RegionStorage>,
    policy: TtlPolicy,
    expiry: ExpiryMode,
}

impl RecordCache {
    pub fn open(options: RecordCacheOptions) -> Result<Self, DomainError> {
        let size = round_up(options.size);
        if size < MIN_CACHE_SIZE {
            return Err(DomainError::CacheIncompatible(format!(
                "cache size {} is below the minimum of {} bytes",
                size, MIN_CACHE_SIZE
            )));
        }
        if size > u32::MAX as usize {
            return Err(DomainError::CacheIncompatible(format!(
                "cache size {} does not fit 32-bit offsets",
                size
            )));
        }
        let slot_count = calculate_cache_slot_count(size);

        let region = match &options.backing {
            CacheBacking::Memory => {
                let mut region = Region::heap(size);
                region.format(slot_count);
                region
            }
            CacheBacking::File {
                path,
                reload,
                overwrite,
            } => {
                let previous_len = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
                if *reload && previous_len != 0 && previous_len != size as u64 && !*overwrite {
                    return Err(DomainError::CacheIncompatible(format!(
                        "'{}' holds {} bytes, configured size is {}",
                        path.display(),
                        previous_len,
                        size
                    )));
                }

                let mut region = Region::map_file(path, size)?;
                let reusable = *reload && previous_len == size as u64;
                if reusable && layout_is_sane(&region) {
                    info!(path = %path.display(), "Reattaching record cache file");
                } else if reusable && !*overwrite {
                    return Err(DomainError::CacheIncompatible(format!(
                        "'{}' was written by another version or is damaged",
                        path.display()
                    )));
                } else {
                    if reusable {
                        warn!(path = %path.display(), "Rebuilding incompatible record cache file");
                    }
                    region.format(slot_count);
                }
                region
            }
        };

        let cache = Self {
            table: HashTable::with_storage(RegionStorage::attach(region)),
            policy: options.ttl_policy,
            expiry: options.expiry,
        };

        info!(
            size,
            slots = cache.table.slot_count(),
            live_entries = cache.live_count(),
            expiry = ?cache.expiry,
            "Record cache ready"
        );
        Ok(cache)
    }

    pub fn expiry(&self) -> ExpiryMode {
        self.expiry
    }

    fn region(&self) -> &Region {
        self.table.storage().region()
    }

    fn region_mut(&mut self) -> &mut Region {
        self.table.storage_mut().region_mut()
    }

    pub fn size(&self) -> usize {
        self.region().len()
    }

    /// First free payload byte.
    pub fn end_cursor(&self) -> usize {
        self.region().read_u64(header::END_CURSOR) as usize
    }

    fn set_end_cursor(&mut self, end: usize) {
        self.region_mut().write_u64(header::END_CURSOR, end as u64);
    }

    pub fn live_count(&self) -> usize {
        self.region().read_u64(header::LIVE_COUNT) as usize
    }

    fn set_live_count(&mut self, count: usize) {
        self.region_mut().write_u64(header::LIVE_COUNT, count as u64);
    }

    pub fn node_count(&self) -> usize {
        self.table.node_count()
    }

    pub fn flush(&self) -> Result<(), DomainError> {
        self.region().flush()
    }

    fn content(&self, meta: &EntryMeta) -> &[u8] {
        let bytes = self.region().as_slice();
        let end = meta.end().min(bytes.len());
        bytes.get(meta.offset as usize..end).unwrap_or_default()
    }

    #[inline]
    fn is_fresh(&self, meta: &EntryMeta, now: u64) -> bool {
        match self.expiry {
            ExpiryMode::Countdown => meta.ttl != 0,
            ExpiryMode::WallClock => now.saturating_sub(meta.time_added) < meta.ttl as u64,
            ExpiryMode::Never => true,
        }
    }

    #[inline]
    fn remaining_ttl(&self, meta: &EntryMeta, now: u64) -> u32 {
        match self.expiry {
            ExpiryMode::WallClock => {
                let elapsed = now.saturating_sub(meta.time_added);
                (meta.ttl as u64).saturating_sub(elapsed) as u32
            }
            ExpiryMode::Countdown | ExpiryMode::Never => meta.ttl,
        }
    }

    /// Caches every answer record of `response`. Returns how many were added.
    pub fn store_response(&mut self, response: &[u8], now: u64) -> Result<usize, DomainError> {
        let mut added = 0;
        for record in answer_records(response)? {
            if self.add_record(&record, now)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Caches one record. Returns `false` when an identical live record is
    /// already present or the record would expire immediately.
    pub fn add_record(&mut self, record: &RecordView, now: u64) -> Result<bool, DomainError> {
        let ttl = self.policy.apply(record.ttl);
        if ttl == 0 && self.expiry != ExpiryMode::Never {
            return Ok(false);
        }

        let key = cache_key(&record.name, record.rtype, record.class);
        let content = encode_content(&key, &record.rdata);
        let hash = self.table.hash(&key);

        let mut stale = Vec::new();
        for node in self.table.chain(&key, Some(hash)) {
            let meta = self.table.record(node);
            if meta.length as usize == round_up(content.len())
                && self.content(&meta).starts_with(&content)
            {
                if self.is_fresh(&meta, now) {
                    return Ok(false);
                }
                stale.push(node);
            }
        }
        if !stale.is_empty() {
            for node in stale {
                self.expire_node(node);
            }
            self.reclaim_tail();
        }

        let (node, mut meta) = self.find_or_allocate(content.len())?;
        let start = meta.offset as usize;
        let padded_end = meta.end();
        {
            let bytes = self.region_mut().as_mut_slice();
            bytes[start..start + content.len()].copy_from_slice(&content);
            bytes[start + content.len()..padded_end].fill(CONTENT_PADDING);
        }
        meta.ttl = ttl;
        meta.time_added = now;
        self.table.set_record(node, &meta);
        self.table.add_by_node(&key, node, Some(hash));
        self.set_live_count(self.live_count() + 1);
        Ok(true)
    }

    /// Returns a detached node whose payload can hold `len` bytes: a freed
    /// node of the same rounded length, else a new node placed at the end
    /// cursor.
    pub fn find_or_allocate(&mut self, len: usize) -> Result<(usize, EntryMeta), DomainError> {
        let rounded = round_up(len);

        let mut previous = None;
        let mut cursor = self.table.find_unused_node(None);
        while let Some(node) = cursor {
            let meta = self.table.record(node);
            if meta.length as usize == rounded {
                self.table.fetch_node(node, previous);
                return Ok((node, meta));
            }
            previous = Some(node);
            cursor = self.table.find_unused_node(Some(node));
        }

        let end = self.end_cursor();
        let node = self
            .table
            .create_new_node(end + rounded)
            .ok_or(DomainError::CapacityExhausted("record cache region"))?;
        let meta = EntryMeta {
            offset: end as u32,
            length: rounded as u32,
            ..EntryMeta::default()
        };
        self.table.set_record(node, &meta);
        self.set_end_cursor(end + rounded);
        Ok((node, meta))
    }

    /// Looks up `name`/`rtype`/`class`, following cached CNAMEs first for any
    /// type other than CNAME. A chain that ends without records of the
    /// requested type is a miss.
    pub fn get_by_question(
        &self,
        name: &str,
        rtype: RecordType,
        class: RecordClass,
        now: u64,
    ) -> Option<Vec<RecordView>> {
        let mut answers = Vec::new();
        let mut name = name.trim_end_matches('.').to_ascii_lowercase();

        if rtype != RecordType::CNAME {
            for _ in 0..MAX_CNAME_HOPS {
                let Some(cname) = self.first_record(&name, RecordType::CNAME, RecordClass::IN, now)
                else {
                    break;
                };
                let Ok((target, _)) = read_name(&cname.rdata, 0) else {
                    break;
                };
                answers.push(cname);
                name = target;
            }
        }

        let before = answers.len();
        self.collect_records(&name, rtype, class, now, &mut answers, usize::MAX);
        if answers.len() == before {
            None
        } else {
            Some(answers)
        }
    }

    fn first_record(
        &self,
        name: &str,
        rtype: RecordType,
        class: RecordClass,
        now: u64,
    ) -> Option<RecordView> {
        let mut found = Vec::with_capacity(1);
        self.collect_records(name, rtype, class, now, &mut found, 1);
        found.pop()
    }

    fn collect_records(
        &self,
        name: &str,
        rtype: RecordType,
        class: RecordClass,
        now: u64,
        out: &mut Vec<RecordView>,
        limit: usize,
    ) {
        let key = cache_key(name, rtype, class);
        let mut taken = 0;
        for node in self.table.chain(&key, None) {
            if taken == limit {
                break;
            }
            let meta = self.table.record(node);
            if !self.is_fresh(&meta, now) {
                continue;
            }
            let bytes = self.content(&meta);
            if !content_has_key(bytes, &key) {
                continue;
            }
            let Some(view) = ContentView::parse(bytes) else {
                continue;
            };
            out.push(RecordView {
                name: name.to_string(),
                rtype,
                class,
                ttl: self.remaining_ttl(&meta, now),
                rdata: view.rdata.to_vec(),
            });
            taken += 1;
        }
    }

    fn expire_node(&mut self, node: usize) {
        let meta = self.table.record(node);
        let at = meta.offset as usize;
        if let Some(first) = self.region_mut().as_mut_slice().get_mut(at) {
            *first = CONTENT_EXPIRED;
        }
        if self.table.remove_node(node) {
            self.set_live_count(self.live_count().saturating_sub(1));
        }
    }

    /// Pulls the end cursor back to the last node still in the arena.
    fn reclaim_tail(&mut self) {
        let end = match self.table.node_count() {
            0 => HEADER_LEN,
            n => self.table.record(n - 1).end(),
        };
        self.set_end_cursor(end);
    }

    fn outcome(&self, entries_expired: usize) -> CacheSweepOutcome {
        CacheSweepOutcome {
            entries_expired,
            live_entries: self.live_count(),
            end_cursor: self.end_cursor(),
        }
    }

    /// One countdown tick: every live TTL loses a second and records that
    /// reach zero are evicted.
    pub fn sweep_countdown_tick(&mut self) -> CacheSweepOutcome {
        let mut expired = 0;
        for node in (0..self.table.node_count()).rev() {
            if !self.table.links(node).is_live() {
                continue;
            }
            let mut meta = self.table.record(node);
            meta.ttl = meta.ttl.saturating_sub(1);
            if meta.ttl == 0 {
                self.table.set_record(node, &meta);
                self.expire_node(node);
                expired += 1;
            } else {
                self.table.set_record(node, &meta);
            }
        }
        if expired > 0 {
            self.reclaim_tail();
        }
        self.outcome(expired)
    }

    /// Read-only scan for records past their TTL at `now`.
    pub fn collect_expired(&self, now: u64) -> Vec<usize> {
        (0..self.table.node_count())
            .filter(|&node| self.table.links(node).is_live())
            .filter(|&node| !self.is_fresh(&self.table.record(node), now))
            .collect()
    }

    /// Evicts nodes found by [`collect_expired`](Self::collect_expired),
    /// skipping any that were replaced or refreshed in between.
    pub fn remove_expired(&mut self, nodes: &[usize], now: u64) -> CacheSweepOutcome {
        let mut nodes = nodes.to_vec();
        nodes.sort_unstable_by(|a, b| b.cmp(a));
        let mut expired = 0;
        for node in nodes {
            if node >= self.table.node_count() || !self.table.links(node).is_live() {
                continue;
            }
            if self.is_fresh(&self.table.record(node), now) {
                continue;
            }
            self.expire_node(node);
            expired += 1;
        }
        if expired > 0 {
            self.reclaim_tail();
        }
        self.outcome(expired)
    }

    pub fn sweep_wall_clock(&mut self, now: u64) -> CacheSweepOutcome {
        let expired = self.collect_expired(now);
        self.remove_expired(&expired, now)
    }

    pub fn sweep_outcome(&self) -> CacheSweepOutcome {
        self.outcome(0)
    }
}

/// Structural checks on a reattached region before trusting its links.
fn layout_is_sane(region: &Region) -> bool {
    if !region.header_matches() {
        debug!("Cache header version or size mismatch");
        return false;
    }
    let size = region.len();
    let slots = region.read_u32(header::SLOT_COUNT) as usize;
    let used = region.read_u32(header::NODE_USED) as usize;
    let end = region.read_u64(header::END_CURSOR) as usize;
    let Some(node_top) = size.checked_sub(slots * SLOT_LEN) else {
        return false;
    };
    let Some(node_low) = node_top.checked_sub(used * NODE_LEN) else {
        return false;
    };
    slots >= 2 && end >= HEADER_LEN && end <= node_low
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: usize = 128 * 1024;

    fn record(name: &str, rtype: RecordType, ttl: u32, rdata: &[u8]) -> RecordView {
        RecordView {
            name: name.to_string(),
            rtype,
            class: RecordClass::IN,
            ttl,
            rdata: rdata.to_vec(),
        }
    }

    fn cname_rdata(target: &str) -> Vec<u8> {
        let mut out = Vec::new();
        crate::dns::wire::write_name(&mut out, target).unwrap();
        out
    }

    fn cache(expiry: ExpiryMode) -> RecordCache {
        RecordCache::open(RecordCacheOptions::in_memory(SIZE).with_expiry(expiry)).unwrap()
    }

    #[test]
    fn test_slot_count_formula() {
        assert_eq!(calculate_cache_slot_count(102_400), 6);
        assert_eq!(calculate_cache_slot_count(SIZE), 6);
        assert_eq!(calculate_cache_slot_count(512 * 1024), 86);
        assert_eq!(calculate_cache_slot_count(1_048_576), 196);
    }

    #[test]
    fn test_lookup_returns_identical_rdata() {
        let mut cache = cache(ExpiryMode::Countdown);
        cache
            .add_record(&record("example.com", RecordType::A, 300, &[1, 2, 3, 4]), 0)
            .unwrap();

        let hit = cache
            .get_by_question("EXAMPLE.com.", RecordType::A, RecordClass::IN, 0)
            .unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].rdata, vec![1, 2, 3, 4]);
        assert_eq!(hit[0].ttl, 300);
        assert!(cache
            .get_by_question("example.com", RecordType::AAAA, RecordClass::IN, 0)
            .is_none());
    }

    #[test]
    fn test_identical_record_is_stored_once() {
        let mut cache = cache(ExpiryMode::Countdown);
        let a = record("example.com", RecordType::A, 60, &[1, 2, 3, 4]);
        assert!(cache.add_record(&a, 0).unwrap());
        assert!(!cache.add_record(&a, 0).unwrap());
        assert!(cache
            .add_record(&record("example.com", RecordType::A, 60, &[5, 6, 7, 8]), 0)
            .unwrap());
        assert_eq!(cache.live_count(), 2);

        let hit = cache
            .get_by_question("example.com", RecordType::A, RecordClass::IN, 0)
            .unwrap();
        assert_eq!(hit.len(), 2);
    }

    #[test]
    fn test_wall_clock_scenario() {
        let mut cache = cache(ExpiryMode::WallClock);
        cache
            .add_record(
                &record("www.example.com", RecordType::A, 60, &[93, 184, 216, 34]),
                0,
            )
            .unwrap();

        let at_30 = cache
            .get_by_question("www.example.com", RecordType::A, RecordClass::IN, 30)
            .unwrap();
        assert_eq!(at_30[0].ttl, 30);
        assert_eq!(at_30[0].rdata, vec![93, 184, 216, 34]);

        assert!(cache
            .get_by_question("www.example.com", RecordType::A, RecordClass::IN, 61)
            .is_none());

        let outcome = cache.sweep_wall_clock(61);
        assert_eq!(outcome.entries_expired, 1);
        assert_eq!(outcome.live_entries, 0);
        assert_eq!(outcome.end_cursor, HEADER_LEN);
    }

    #[test]
    fn test_countdown_expires_after_exactly_ttl_ticks() {
        let mut cache = cache(ExpiryMode::Countdown);
        cache
            .add_record(&record("short.example", RecordType::A, 5, &[10, 0, 0, 1]), 0)
            .unwrap();

        for _ in 0..4 {
            cache.sweep_countdown_tick();
        }
        let hit = cache
            .get_by_question("short.example", RecordType::A, RecordClass::IN, 0)
            .unwrap();
        assert_eq!(hit[0].ttl, 1);

        let outcome = cache.sweep_countdown_tick();
        assert_eq!(outcome.entries_expired, 1);
        assert!(cache
            .get_by_question("short.example", RecordType::A, RecordClass::IN, 0)
            .is_none());
    }

    #[test]
    fn test_expired_slot_is_reused_without_growth() {
        let mut cache = cache(ExpiryMode::WallClock);
        cache
            .add_record(&record("first.example", RecordType::A, 10, &[1, 1, 1, 1]), 0)
            .unwrap();
        cache
            .add_record(&record("second.example", RecordType::A, 100, &[2, 2, 2, 2]), 0)
            .unwrap();
        let end = cache.end_cursor();

        let outcome = cache.sweep_wall_clock(20);
        assert_eq!(outcome.entries_expired, 1);
        assert_eq!(cache.end_cursor(), end);
        assert_eq!(cache.table.free_list_len(), 1);

        cache
            .add_record(&record("third.example", RecordType::A, 10, &[3, 3, 3, 3]), 20)
            .unwrap();
        assert_eq!(cache.end_cursor(), end);
        assert_eq!(cache.table.free_list_len(), 0);
        assert!(cache
            .get_by_question("third.example", RecordType::A, RecordClass::IN, 20)
            .is_some());
    }

    #[test]
    fn test_removing_last_node_rewinds_end_cursor() {
        let mut cache = cache(ExpiryMode::WallClock);
        cache
            .add_record(&record("keep.example", RecordType::A, 100, &[1, 1, 1, 1]), 0)
            .unwrap();
        let after_first = cache.end_cursor();
        cache
            .add_record(&record("drop.example", RecordType::A, 10, &[2, 2, 2, 2]), 0)
            .unwrap();
        assert!(cache.end_cursor() > after_first);

        cache.sweep_wall_clock(10);
        assert_eq!(cache.end_cursor(), after_first);
        assert_eq!(cache.node_count(), 1);
    }

    #[test]
    fn test_cname_chain_is_followed() {
        let mut cache = cache(ExpiryMode::Countdown);
        cache
            .add_record(
                &record("www.example.com", RecordType::CNAME, 300, &cname_rdata("edge.example.net")),
                0,
            )
            .unwrap();
        cache
            .add_record(&record("edge.example.net", RecordType::A, 60, &[198, 51, 100, 7]), 0)
            .unwrap();

        let hit = cache
            .get_by_question("www.example.com", RecordType::A, RecordClass::IN, 0)
            .unwrap();
        assert_eq!(hit.len(), 2);
        assert_eq!(hit[0].rtype, RecordType::CNAME);
        assert_eq!(hit[1].name, "edge.example.net");
        assert_eq!(hit[1].rdata, vec![198, 51, 100, 7]);
    }

    #[test]
    fn test_cname_without_target_records_is_a_miss() {
        let mut cache = cache(ExpiryMode::Countdown);
        cache
            .add_record(
                &record("alias.example", RecordType::CNAME, 300, &cname_rdata("gone.example")),
                0,
            )
            .unwrap();

        assert!(cache
            .get_by_question("alias.example", RecordType::A, RecordClass::IN, 0)
            .is_none());
        assert!(cache
            .get_by_question("alias.example", RecordType::CNAME, RecordClass::IN, 0)
            .is_some());
    }

    #[test]
    fn test_cname_loop_terminates() {
        let mut cache = cache(ExpiryMode::Countdown);
        cache
            .add_record(&record("a.loop", RecordType::CNAME, 300, &cname_rdata("b.loop")), 0)
            .unwrap();
        cache
            .add_record(&record("b.loop", RecordType::CNAME, 300, &cname_rdata("a.loop")), 0)
            .unwrap();

        assert!(cache
            .get_by_question("a.loop", RecordType::A, RecordClass::IN, 0)
            .is_none());
    }

    #[test]
    fn test_full_region_reports_capacity_exhaustion() {
        let mut cache = cache(ExpiryMode::Never);
        let payload = vec![0xAB; 1000];
        let mut stored = 0;
        let result = loop {
            let name = format!("host{}.example", stored);
            match cache.add_record(&record(&name, RecordType::TXT, 60, &payload), 0) {
                Ok(_) => stored += 1,
                Err(e) => break e,
            }
        };
        assert_eq!(result, DomainError::CapacityExhausted("record cache region"));
        assert!(stored > 100);
        assert!(cache
            .get_by_question("host0.example", RecordType::TXT, RecordClass::IN, 0)
            .is_some());
    }

    #[test]
    fn test_ttl_policy_is_applied() {
        let mut cache = RecordCache::open(
            RecordCacheOptions::in_memory(SIZE).with_ttl_policy(TtlPolicy::Override(42)),
        )
        .unwrap();
        cache
            .add_record(&record("example.com", RecordType::A, 5, &[1, 2, 3, 4]), 0)
            .unwrap();
        let hit = cache
            .get_by_question("example.com", RecordType::A, RecordClass::IN, 0)
            .unwrap();
        assert_eq!(hit[0].ttl, 42);
    }

    #[test]
    fn test_undersized_region_is_rejected() {
        assert!(matches!(
            RecordCache::open(RecordCacheOptions::in_memory(4096)),
            Err(DomainError::CacheIncompatible(_))
        ));
    }
}
