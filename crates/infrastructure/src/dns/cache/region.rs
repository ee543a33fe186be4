//! Contiguous byte region backing the record cache.
//!
//! Layout: a fixed header, payload growing up from the header, the node
//! arena growing down from beneath the slot array, and the slot array fixed
//! at the end of the region. Every link inside is an index or an offset, so
//! a file-backed region can be mapped at any address on the next run.
use ferrous_forwarder_domain::DomainError;
#[cfg(unix)]
use std::fs::{File, OpenOptions};
use std::path::Path;

pub const CACHE_VERSION: u32 = 10;
pub const HEADER_LEN: usize = 128;
pub const SLOT_LEN: usize = 4;
pub const NODE_LEN: usize = 32;

pub(crate) mod header {
    pub const VERSION: usize = 0;
    pub const SIZE: usize = 8;
    pub const END_CURSOR: usize = 16;
    pub const LIVE_COUNT: usize = 24;
    pub const SLOT_COUNT: usize = 32;
    pub const NODE_USED: usize = 36;
    pub const FREE_HEAD: usize = 40;
    pub const COMMENT: usize = 48;
}

const COMMENT: &[u8] = b"\nferrous-forwarder record cache. Do not edit.\n";

enum Bytes {
    Heap(Box<[u8]>),
    #[cfg(unix)]
    Mapped(MappedFile),
}

pub struct Region {
    bytes: Bytes,
}

impl Region {
    pub fn heap(size: usize) -> Self {
        Self {
            bytes: Bytes::Heap(vec![0u8; size].into_boxed_slice()),
        }
    }

    /// Maps `path` with exactly `size` bytes. A file of any other length is
    /// cleared and resized first; a file of this length keeps its contents.
    #[cfg(unix)]
    pub fn map_file(path: &Path, size: usize) -> Result<Self, DomainError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        if file.metadata()?.len() != size as u64 {
            file.set_len(0)?;
            file.set_len(size as u64)?;
        }
        Ok(Self {
            bytes: Bytes::Mapped(MappedFile::new(file, size)?),
        })
    }

    #[cfg(not(unix))]
    pub fn map_file(path: &Path, _size: usize) -> Result<Self, DomainError> {
        Err(DomainError::Io(format!(
            "file-backed cache '{}' is only supported on unix",
            path.display()
        )))
    }

    pub fn is_file_backed(&self) -> bool {
        !matches!(self.bytes, Bytes::Heap(_))
    }

    pub fn as_slice(&self) -> &[u8] {
        match &self.bytes {
            Bytes::Heap(b) => b,
            #[cfg(unix)]
            Bytes::Mapped(m) => m.as_slice(),
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match &mut self.bytes {
            Bytes::Heap(b) => b,
            #[cfg(unix)]
            Bytes::Mapped(m) => m.as_mut_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zeroes the region and stamps a fresh header.
    pub fn format(&mut self, slot_count: usize) {
        let size = self.len();
        self.as_mut_slice().fill(0);
        self.write_u32(header::VERSION, CACHE_VERSION);
        self.write_u64(header::SIZE, size as u64);
        self.write_u64(header::END_CURSOR, HEADER_LEN as u64);
        self.write_u64(header::LIVE_COUNT, 0);
        self.write_u32(header::SLOT_COUNT, slot_count as u32);
        self.write_u32(header::NODE_USED, 0);
        self.write_i32(header::FREE_HEAD, -1);
        let comment_len = COMMENT.len().min(HEADER_LEN - header::COMMENT);
        self.as_mut_slice()[header::COMMENT..header::COMMENT + comment_len]
            .copy_from_slice(&COMMENT[..comment_len]);
        let slots_from = size - slot_count * SLOT_LEN;
        for slot in 0..slot_count {
            self.write_i32(slots_from + slot * SLOT_LEN, -1);
        }
    }

    /// True when the header was written by this version for a region of this size.
    pub fn header_matches(&self) -> bool {
        self.len() >= HEADER_LEN
            && self.read_u32(header::VERSION) == CACHE_VERSION
            && self.read_u64(header::SIZE) == self.len() as u64
    }

    pub fn flush(&self) -> Result<(), DomainError> {
        match &self.bytes {
            Bytes::Heap(_) => Ok(()),
            #[cfg(unix)]
            Bytes::Mapped(m) => m.flush(),
        }
    }

    #[inline]
    fn array<const N: usize>(&self, at: usize) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.as_slice()[at..at + N]);
        out
    }

    #[inline]
    pub fn read_u32(&self, at: usize) -> u32 {
        u32::from_le_bytes(self.array(at))
    }

    #[inline]
    pub fn read_i32(&self, at: usize) -> i32 {
        i32::from_le_bytes(self.array(at))
    }

    #[inline]
    pub fn read_u64(&self, at: usize) -> u64 {
        u64::from_le_bytes(self.array(at))
    }

    #[inline]
    pub fn write_u32(&mut self, at: usize, value: u32) {
        self.as_mut_slice()[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_i32(&mut self, at: usize, value: i32) {
        self.as_mut_slice()[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn write_u64(&mut self, at: usize, value: u64) {
        self.as_mut_slice()[at..at + 8].copy_from_slice(&value.to_le_bytes());
    }
}

#[cfg(unix)]
struct MappedFile {
    ptr: std::ptr::NonNull<u8>,
    len: usize,
    _file: File,
}

// SAFETY: the mapping is owned by this value and only reached through
// `&self`/`&mut self`, so the usual borrow rules serialize access.
#[cfg(unix)]
unsafe impl Send for MappedFile {}
#[cfg(unix)]
unsafe impl Sync for MappedFile {}

#[cfg(unix)]
impl MappedFile {
    fn new(file: File, len: usize) -> Result<Self, DomainError> {
        use std::os::unix::io::AsRawFd;

        // SAFETY: the descriptor is open read-write and the file is at least
        // `len` bytes long; the result is checked against MAP_FAILED.
        let raw = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                0,
            )
        };
        if raw == libc::MAP_FAILED {
            return Err(std::io::Error::last_os_error().into());
        }
        let ptr = std::ptr::NonNull::new(raw as *mut u8)
            .ok_or_else(|| DomainError::Io("mmap returned a null mapping".to_string()))?;
        Ok(Self {
            ptr,
            len,
            _file: file,
        })
    }

    fn as_slice(&self) -> &[u8] {
        // SAFETY: `ptr` maps `len` readable bytes for the lifetime of `self`.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as above, and `&mut self` guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    fn flush(&self) -> Result<(), DomainError> {
        // SAFETY: flushes exactly the range mapped in `new`.
        let rc = unsafe { libc::msync(self.ptr.as_ptr() as *mut libc::c_void, self.len, libc::MS_SYNC) };
        if rc != 0 {
            return Err(std::io::Error::last_os_error().into());
        }
        Ok(())
    }
}

#[cfg(unix)]
impl Drop for MappedFile {
    fn drop(&mut self) {
        // SAFETY: unmaps the range mapped in `new`; no slice outlives `self`.
        unsafe {
            libc::munmap(self.ptr.as_ptr() as *mut libc::c_void, self.len);
        }
    }
}
