use super::entry::EntryMeta;
use super::region::{header, Region, HEADER_LEN, NODE_LEN, SLOT_LEN};
use crate::collections::{DownwardArray, NodeLinks, Ref, TableStorage};

/// Hash-table storage laid out inside a cache [`Region`].
///
/// Node layout: next `i32`, prev `i32`, offset `u32`, ttl `u32`,
/// time_added `u64`, length `u32`, 4 bytes of padding.
pub struct RegionStorage {
    region: Region,
    slot_count: usize,
    nodes: DownwardArray,
}

impl RegionStorage {
    /// Binds to an already formatted region, trusting its header.
    pub fn attach(region: Region) -> Self {
        let slot_count = region.read_u32(header::SLOT_COUNT) as usize;
        let used = region.read_u32(header::NODE_USED) as usize;
        let top = region.len() - slot_count * SLOT_LEN;
        Self {
            region,
            slot_count,
            nodes: DownwardArray::new(top, NODE_LEN, used),
        }
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn region_mut(&mut self) -> &mut Region {
        &mut self.region
    }

    pub fn node_low_edge(&self) -> usize {
        self.nodes.low_edge()
    }

    #[inline]
    fn slot_offset(&self, slot: usize) -> usize {
        self.region.len() - (slot + 1) * SLOT_LEN
    }

    #[inline]
    fn node_offset(&self, node: usize) -> usize {
        self.nodes.offset_of(node)
    }
}

impl TableStorage for RegionStorage {
    type Record = EntryMeta;

    fn slot_count(&self) -> usize {
        self.slot_count
    }

    fn slot_head(&self, slot: usize) -> Ref {
        Ref::decode(self.region.read_i32(self.slot_offset(slot)))
    }

    fn set_slot_head(&mut self, slot: usize, head: Ref) {
        let at = self.slot_offset(slot);
        self.region.write_i32(at, head.encode());
    }

    fn node_count(&self) -> usize {
        self.nodes.used
    }

    fn links(&self, node: usize) -> NodeLinks {
        let at = self.node_offset(node);
        NodeLinks {
            next: Ref::decode(self.region.read_i32(at)),
            prev: Ref::decode(self.region.read_i32(at + 4)),
        }
    }

    fn set_links(&mut self, node: usize, links: NodeLinks) {
        let at = self.node_offset(node);
        self.region.write_i32(at, links.next.encode());
        self.region.write_i32(at + 4, links.prev.encode());
    }

    fn record(&self, node: usize) -> EntryMeta {
        let at = self.node_offset(node) + 8;
        EntryMeta {
            offset: self.region.read_u32(at),
            ttl: self.region.read_u32(at + 4),
            time_added: self.region.read_u64(at + 8),
            length: self.region.read_u32(at + 16),
        }
    }

    fn set_record(&mut self, node: usize, record: &EntryMeta) {
        let at = self.node_offset(node) + 8;
        self.region.write_u32(at, record.offset);
        self.region.write_u32(at + 4, record.ttl);
        self.region.write_u64(at + 8, record.time_added);
        self.region.write_u32(at + 16, record.length);
    }

    fn push_node(&mut self, low_cursor: usize) -> Option<usize> {
        let node = self.nodes.push(low_cursor.max(HEADER_LEN))?;
        self.region
            .write_u32(header::NODE_USED, self.nodes.used as u32);
        Some(node)
    }

    fn pop_node(&mut self) {
        self.nodes.pop();
        self.region
            .write_u32(header::NODE_USED, self.nodes.used as u32);
    }

    fn free_head(&self) -> Ref {
        Ref::decode(self.region.read_i32(header::FREE_HEAD))
    }

    fn set_free_head(&mut self, head: Ref) {
        self.region.write_i32(header::FREE_HEAD, head.encode());
    }
}
