//! Index-based containers shared by the record cache and the domain matchers.
pub mod array;
pub mod bst;
pub mod hash_table;

pub use array::{Array, DownwardArray};
pub use bst::IndexBst;
pub use hash_table::{
    calculate_appropriate_slot_count, elf_hash, HashTable, HeapStorage, NodeLinks, Ref,
    TableStorage,
};
