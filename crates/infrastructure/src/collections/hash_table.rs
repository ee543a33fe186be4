use super::array::Array;
use ferrous_forwarder_domain::DomainError;

/// Link stored in a node or slot head.
///
/// Live nodes have `next` in {`Node`, `Tail`} and `prev` in {`Node`, `Slot`}.
/// Free nodes carry `prev == Free` and are chained through `next`.
/// Stray nodes are allocated but not yet linked anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ref {
    Node(usize),
    Slot(usize),
    Tail,
    Free,
    Stray,
}

impl Ref {
    const TAIL: i32 = -1;
    const FREE: i32 = -2;
    const STRAY: i32 = -3;
    const SLOT_BASE: i32 = -4;

    /// Fixed-width form used when the table lives inside a byte region.
    pub fn encode(self) -> i32 {
        match self {
            Ref::Node(i) => i as i32,
            Ref::Tail => Self::TAIL,
            Ref::Free => Self::FREE,
            Ref::Stray => Self::STRAY,
            Ref::Slot(i) => Self::SLOT_BASE - i as i32,
        }
    }

    pub fn decode(raw: i32) -> Ref {
        match raw {
            n if n >= 0 => Ref::Node(n as usize),
            Self::TAIL => Ref::Tail,
            Self::FREE => Ref::Free,
            Self::STRAY => Ref::Stray,
            n => Ref::Slot((Self::SLOT_BASE - n) as usize),
        }
    }

    #[inline]
    fn node(self) -> Option<usize> {
        match self {
            Ref::Node(i) => Some(i),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeLinks {
    pub next: Ref,
    pub prev: Ref,
}

impl NodeLinks {
    pub const STRAY: NodeLinks = NodeLinks {
        next: Ref::Stray,
        prev: Ref::Stray,
    };

    #[inline]
    pub fn is_free(&self) -> bool {
        self.prev == Ref::Free
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        matches!(self.prev, Ref::Node(_) | Ref::Slot(_))
    }
}

/// Backing store for slot heads and nodes.
///
/// Implemented over owned vectors for in-process tables and over a byte
/// region for the record cache, where every link must be an index.
pub trait TableStorage {
    type Record;

    fn slot_count(&self) -> usize;
    fn slot_head(&self, slot: usize) -> Ref;
    fn set_slot_head(&mut self, slot: usize, head: Ref);

    /// Nodes in use, live, free and stray alike.
    fn node_count(&self) -> usize;
    fn links(&self, node: usize) -> NodeLinks;
    fn set_links(&mut self, node: usize, links: NodeLinks);
    fn record(&self, node: usize) -> Self::Record;
    fn set_record(&mut self, node: usize, record: &Self::Record);

    /// Appends a stray node. `low_cursor` bounds arenas that share a region
    /// with an upward-growing neighbour; growable arenas ignore it.
    fn push_node(&mut self, low_cursor: usize) -> Option<usize>;
    /// Drops the physically last node.
    fn pop_node(&mut self);

    fn free_head(&self) -> Ref;
    fn set_free_head(&mut self, head: Ref);
}

/// Slot count for a table expected to hold `element_count` entries.
pub fn calculate_appropriate_slot_count(element_count: usize) -> usize {
    if element_count > 10 {
        (element_count / 3) / 10 * 10 + 6
    } else {
        3
    }
}

pub fn elf_hash(key: &[u8]) -> u32 {
    let mut h: u32 = 0;
    for &c in key {
        h = (h << 4).wrapping_add(c as u32);
        let x = h & 0xF000_0000;
        if x != 0 {
            h ^= x >> 24;
        }
        h &= !x;
    }
    h & 0x7FFF_FFFF
}

/// Slot-chained hash table over index links.
///
/// The table hashes keys to slots but stores only records; callers compare
/// their own key material while walking a chain with [`HashTable::get`].
/// One slot is never targeted: the modulus is `slot_count - 1`.
#[derive(Clone)]
pub struct HashTable<S> {
    storage: S,
    hash_fn: fn(&[u8]) -> u32,
}

impl<R: Clone + Default> HashTable<HeapStorage<R>> {
    pub fn new(expected_entries: usize) -> Self {
        Self::with_storage(HeapStorage::new(
            calculate_appropriate_slot_count(expected_entries),
            expected_entries,
        ))
    }
}

impl<S: TableStorage> HashTable<S> {
    pub fn with_storage(storage: S) -> Self {
        Self {
            storage,
            hash_fn: elf_hash,
        }
    }

    pub fn with_hash_fn(mut self, hash_fn: fn(&[u8]) -> u32) -> Self {
        self.hash_fn = hash_fn;
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    #[inline]
    pub fn hash(&self, key: &[u8]) -> u32 {
        (self.hash_fn)(key)
    }

    #[inline]
    fn slot_of(&self, hash: u32) -> usize {
        hash as usize % (self.storage.slot_count() - 1)
    }

    /// Stores `record` under `key` and returns its node index.
    ///
    /// `hash` lets a caller reuse the value computed for a preceding lookup.
    pub fn add(
        &mut self,
        key: &[u8],
        record: &S::Record,
        hash: Option<u32>,
    ) -> Result<usize, DomainError> {
        let node = match self.find_unused_node(None) {
            Some(node) => {
                self.fetch_node(node, None);
                node
            }
            None => self
                .create_new_node(0)
                .ok_or(DomainError::CapacityExhausted("hash table node arena"))?,
        };
        self.storage.set_record(node, record);
        self.add_by_node(key, node, hash);
        Ok(node)
    }

    /// Walks the free list: `None` yields its head, `Some(n)` the free node after `n`.
    pub fn find_unused_node(&self, after: Option<usize>) -> Option<usize> {
        let next = match after {
            None => self.storage.free_head(),
            Some(node) => self.storage.links(node).next,
        };
        next.node()
    }

    pub fn create_new_node(&mut self, low_cursor: usize) -> Option<usize> {
        let node = self.storage.push_node(low_cursor)?;
        self.storage.set_links(node, NodeLinks::STRAY);
        Some(node)
    }

    /// Detaches a free node found by [`find_unused_node`](Self::find_unused_node).
    /// `predecessor` is the free node visited just before it, if any.
    pub fn fetch_node(&mut self, node: usize, predecessor: Option<usize>) {
        let links = self.storage.links(node);
        if !links.is_free() {
            return;
        }
        match predecessor {
            None => self.storage.set_free_head(links.next),
            Some(prev) => {
                let mut prev_links = self.storage.links(prev);
                prev_links.next = links.next;
                self.storage.set_links(prev, prev_links);
            }
        }
        self.storage.set_links(node, NodeLinks::STRAY);
    }

    /// Links a stray node at the front of the chain for `key`.
    pub fn add_by_node(&mut self, key: &[u8], node: usize, hash: Option<u32>) {
        let slot = self.slot_of(hash.unwrap_or_else(|| self.hash(key)));
        let head = self.storage.slot_head(slot);
        if let Ref::Node(old_head) = head {
            let mut links = self.storage.links(old_head);
            links.prev = Ref::Node(node);
            self.storage.set_links(old_head, links);
        }
        self.storage.set_links(
            node,
            NodeLinks {
                next: head,
                prev: Ref::Slot(slot),
            },
        );
        self.storage.set_slot_head(slot, Ref::Node(node));
    }

    /// Next node on `key`'s chain: the head when `cursor` is `None`,
    /// otherwise the node after `cursor`.
    pub fn get(&self, key: &[u8], cursor: Option<usize>, hash: Option<u32>) -> Option<usize> {
        let next = match cursor {
            None => {
                let slot = self.slot_of(hash.unwrap_or_else(|| self.hash(key)));
                self.storage.slot_head(slot)
            }
            Some(node) => self.storage.links(node).next,
        };
        next.node()
    }

    pub fn chain<'a>(&'a self, key: &[u8], hash: Option<u32>) -> Chain<'a, S> {
        Chain {
            table: self,
            next: self.get(key, None, hash),
        }
    }

    /// Unlinks `node` and recycles it. The physically last node shrinks the
    /// arena instead of joining the free list. Returns `false` for nodes that
    /// are out of range or already free.
    pub fn remove_node(&mut self, node: usize) -> bool {
        if node >= self.storage.node_count() {
            return false;
        }
        let links = self.storage.links(node);
        if links.is_free() {
            return false;
        }

        if links.is_live() {
            if let Ref::Node(next) = links.next {
                let mut next_links = self.storage.links(next);
                next_links.prev = links.prev;
                self.storage.set_links(next, next_links);
            }
            match links.prev {
                Ref::Slot(slot) => self.storage.set_slot_head(slot, links.next),
                Ref::Node(prev) => {
                    let mut prev_links = self.storage.links(prev);
                    prev_links.next = links.next;
                    self.storage.set_links(prev, prev_links);
                }
                _ => {}
            }
        }

        if node + 1 == self.storage.node_count() {
            self.storage.pop_node();
        } else {
            let head = self.storage.free_head();
            self.storage.set_links(
                node,
                NodeLinks {
                    next: head,
                    prev: Ref::Free,
                },
            );
            self.storage.set_free_head(Ref::Node(node));
        }
        true
    }

    #[inline]
    pub fn record(&self, node: usize) -> S::Record {
        self.storage.record(node)
    }

    #[inline]
    pub fn set_record(&mut self, node: usize, record: &S::Record) {
        self.storage.set_record(node, record);
    }

    #[inline]
    pub fn links(&self, node: usize) -> NodeLinks {
        self.storage.links(node)
    }

    pub fn node_count(&self) -> usize {
        self.storage.node_count()
    }

    pub fn slot_count(&self) -> usize {
        self.storage.slot_count()
    }

    pub fn free_list_len(&self) -> usize {
        let mut count = 0;
        let mut cursor = self.find_unused_node(None);
        while let Some(node) = cursor {
            count += 1;
            cursor = self.find_unused_node(Some(node));
        }
        count
    }
}

pub struct Chain<'a, S> {
    table: &'a HashTable<S>,
    next: Option<usize>,
}

impl<S: TableStorage> Iterator for Chain<'_, S> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next?;
        self.next = self.table.storage.links(current).next.node();
        Some(current)
    }
}

/// Heap-owned storage: a slot vector plus a node arena that doubles on demand,
/// or refuses to grow when created with [`HeapStorage::fixed`].
#[derive(Debug, Clone)]
pub struct HeapStorage<R> {
    slots: Vec<Ref>,
    nodes: Array<(NodeLinks, R)>,
    free_head: Ref,
}

impl<R: Clone + Default> HeapStorage<R> {
    pub fn new(slot_count: usize, initial_nodes: usize) -> Self {
        Self {
            slots: vec![Ref::Tail; slot_count.max(2)],
            nodes: Array::with_capacity(initial_nodes),
            free_head: Ref::Tail,
        }
    }

    pub fn fixed(slot_count: usize, node_capacity: usize) -> Self {
        Self {
            slots: vec![Ref::Tail; slot_count.max(2)],
            nodes: Array::fixed(node_capacity),
            free_head: Ref::Tail,
        }
    }
}

impl<R: Clone + Default> TableStorage for HeapStorage<R> {
    type Record = R;

    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn slot_head(&self, slot: usize) -> Ref {
        self.slots[slot]
    }

    fn set_slot_head(&mut self, slot: usize, head: Ref) {
        self.slots[slot] = head;
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn links(&self, node: usize) -> NodeLinks {
        self.nodes.get(node).map(|n| n.0).unwrap_or(NodeLinks::STRAY)
    }

    fn set_links(&mut self, node: usize, links: NodeLinks) {
        if let Some(entry) = self.nodes.get_mut(node) {
            entry.0 = links;
        }
    }

    fn record(&self, node: usize) -> R {
        self.nodes.get(node).map(|n| n.1.clone()).unwrap_or_default()
    }

    fn set_record(&mut self, node: usize, record: &R) {
        if let Some(entry) = self.nodes.get_mut(node) {
            entry.1 = record.clone();
        }
    }

    fn push_node(&mut self, _low_cursor: usize) -> Option<usize> {
        self.nodes.push_back((NodeLinks::STRAY, R::default()))
    }

    fn pop_node(&mut self) {
        self.nodes.pop_back();
    }

    fn free_head(&self) -> Ref {
        self.free_head
    }

    fn set_free_head(&mut self, head: Ref) {
        self.free_head = head;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    type KeyedTable = HashTable<HeapStorage<(String, u32)>>;

    fn lookup(table: &KeyedTable, key: &str) -> Vec<u32> {
        table
            .chain(key.as_bytes(), None)
            .map(|node| table.record(node))
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v)
            .collect()
    }

    fn insert(table: &mut KeyedTable, key: &str, value: u32) -> usize {
        table
            .add(key.as_bytes(), &(key.to_string(), value), None)
            .unwrap()
    }

    #[test]
    fn test_slot_count_rule() {
        assert_eq!(calculate_appropriate_slot_count(0), 3);
        assert_eq!(calculate_appropriate_slot_count(10), 3);
        assert_eq!(calculate_appropriate_slot_count(100), 36);
        assert_eq!(calculate_appropriate_slot_count(1000), 336);
    }

    #[test]
    fn test_ref_encoding_round_trips() {
        for r in [
            Ref::Node(0),
            Ref::Node(77),
            Ref::Slot(0),
            Ref::Slot(195),
            Ref::Tail,
            Ref::Free,
            Ref::Stray,
        ] {
            assert_eq!(Ref::decode(r.encode()), r);
        }
    }

    #[test]
    fn test_duplicate_keys_are_all_enumerated() {
        let mut table = KeyedTable::new(16);
        insert(&mut table, "a.example", 1);
        insert(&mut table, "a.example", 2);
        insert(&mut table, "b.example", 3);

        let mut values = lookup(&table, "a.example");
        values.sort();
        assert_eq!(values, vec![1, 2]);
        assert_eq!(lookup(&table, "b.example"), vec![3]);
    }

    #[test]
    fn test_removing_last_node_shrinks_arena() {
        let mut table = KeyedTable::new(16);
        insert(&mut table, "a", 1);
        let last = insert(&mut table, "b", 2);

        assert!(table.remove_node(last));

        assert_eq!(table.node_count(), 1);
        assert_eq!(table.free_list_len(), 0);
        assert!(lookup(&table, "b").is_empty());
    }

    #[test]
    fn test_removing_inner_node_feeds_free_list_and_is_reused() {
        let mut table = KeyedTable::new(16);
        let first = insert(&mut table, "a", 1);
        insert(&mut table, "b", 2);

        assert!(table.remove_node(first));
        assert_eq!(table.free_list_len(), 1);
        assert_eq!(table.node_count(), 2);

        let reused = insert(&mut table, "c", 3);
        assert_eq!(reused, first);
        assert_eq!(table.free_list_len(), 0);
        assert_eq!(lookup(&table, "c"), vec![3]);
        assert!(lookup(&table, "a").is_empty());
    }

    #[test]
    fn test_removing_free_node_twice_is_rejected() {
        let mut table = KeyedTable::new(16);
        let first = insert(&mut table, "a", 1);
        insert(&mut table, "b", 2);

        assert!(table.remove_node(first));
        assert!(!table.remove_node(first));
        assert_eq!(table.free_list_len(), 1);
    }

    #[test]
    fn test_unlink_from_chain_middle_and_head() {
        // Single usable slot forces every key onto one chain.
        let mut table: KeyedTable = HashTable::with_storage(HeapStorage::new(2, 8));
        insert(&mut table, "a", 1);
        let b = insert(&mut table, "b", 2);
        let c = insert(&mut table, "c", 3);
        insert(&mut table, "d", 4);

        assert!(table.remove_node(b));
        assert_eq!(lookup(&table, "a"), vec![1]);
        assert_eq!(lookup(&table, "c"), vec![3]);

        // "d" is the head; its successor must now point back at the slot.
        let head = table.get(b"d", None, None).unwrap();
        assert!(table.remove_node(head));
        let new_head = table.get(b"c", None, None).unwrap();
        assert_eq!(new_head, c);
        assert_eq!(table.links(c).prev, Ref::Slot(0));
        assert_eq!(lookup(&table, "a"), vec![1]);
        assert_eq!(table.chain(b"a", None).count(), 2);
    }

    #[test]
    fn test_fixed_arena_reports_capacity_exhaustion() {
        let mut table: KeyedTable = HashTable::with_storage(HeapStorage::fixed(5, 2));
        insert(&mut table, "a", 1);
        insert(&mut table, "b", 2);

        let result = table.add(b"c", &("c".to_string(), 3), None);
        assert_eq!(
            result,
            Err(DomainError::CapacityExhausted("hash table node arena"))
        );
    }

    #[test]
    fn test_precomputed_hash_matches_computed() {
        let mut table = KeyedTable::new(64);
        let hash = table.hash(b"precomputed.example");
        table
            .add(
                b"precomputed.example",
                &("precomputed.example".to_string(), 9),
                Some(hash),
            )
            .unwrap();

        assert_eq!(lookup(&table, "precomputed.example"), vec![9]);
    }

    #[test]
    fn test_random_adds_and_removes_keep_live_keys_reachable() {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        let mut table = KeyedTable::new(32);
        let mut live: HashMap<usize, (String, u32)> = HashMap::new();

        for step in 0..2000u32 {
            if live.is_empty() || rng.u8(..) < 160 {
                let key = format!("k{}", rng.u32(..64));
                let node = insert(&mut table, &key, step);
                live.insert(node, (key, step));
            } else {
                let victim = *live.keys().nth(rng.usize(..live.len())).unwrap();
                assert!(table.remove_node(victim));
                live.remove(&victim);
            }

            if step % 97 == 0 {
                for (node, (key, value)) in &live {
                    let found: Vec<usize> = table.chain(key.as_bytes(), None).collect();
                    assert!(found.contains(node), "live node {} unreachable", node);
                    assert_eq!(table.record(*node), (key.clone(), *value));
                }
            }
        }

        let reachable: usize = (0..table.slot_count())
            .map(|slot| {
                let mut n = 0;
                let mut cursor = table.storage().slot_head(slot);
                while let Ref::Node(i) = cursor {
                    assert!(live.contains_key(&i), "removed node {} still linked", i);
                    n += 1;
                    cursor = table.links(i).next;
                }
                n
            })
            .sum();
        assert_eq!(reachable, live.len());
    }
}
