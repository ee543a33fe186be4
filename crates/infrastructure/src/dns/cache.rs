//! Record cache: answer records in one contiguous region, heap or file backed.
mod clock;
mod entry;
mod record_cache;
mod region;
mod shared;
mod storage;

pub use clock::now_secs;
pub use entry::EntryMeta;
pub use record_cache::{
    calculate_cache_slot_count, CacheBacking, ExpiryMode, RecordCache, RecordCacheOptions,
};
pub use region::{CACHE_VERSION, HEADER_LEN};
pub use shared::SharedRecordCache;
