//! Cache module for the next-match slot
//!
//! This module provides a single-slot cache that remembers the club's next
//! match until either a fixed TTL elapses or the match kicks off, whichever
//! comes first. Persistence goes through the [`Storage`] trait so the same
//! cache runs against files on disk or an in-memory map.

mod storage;
mod store;

pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::{CacheEntry, MatchCache, CACHE_KEY, DEFAULT_CACHE_TTL_HOURS};
