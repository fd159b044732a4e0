//! Local model cache
//!
//! Entries carry the time they were stored. Anything older than the
//! freshness window is treated as a miss and replaced by the refetch.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::error::CacheUnavailable;

/// Cached models stay valid for seven days
pub const FRESHNESS_WINDOW_MS: u64 = 7 * 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub bytes: Vec<u8>,
    pub stored_at_ms: u64,
}

impl CacheEntry {
    pub fn is_fresh(&self, now_ms: u64, window_ms: u64) -> bool {
        now_ms.saturating_sub(self.stored_at_ms) < window_ms
    }
}

/// Key/value store for downloaded model bytes.
///
/// Methods take `&self` so concurrent loads can share one cache; stores are
/// expected to use interior mutability.
pub trait AssetCache {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheUnavailable>;

    fn put(&self, key: &str, entry: CacheEntry) -> Result<(), CacheUnavailable>;
}

/// Wall clock in milliseconds since the Unix epoch
pub trait Clock {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        web_time::SystemTime::now()
            .duration_since(web_time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(now_ms: u64) -> Self {
        Self { now: Cell::new(now_ms) }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// In-process cache; lives as long as the page
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RefCell<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl AssetCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheUnavailable> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn put(&self, key: &str, entry: CacheEntry) -> Result<(), CacheUnavailable> {
        self.entries.borrow_mut().insert(key.to_string(), entry);
        Ok(())
    }
}

impl<T: AssetCache + ?Sized> AssetCache for std::rc::Rc<T> {
    fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheUnavailable> {
        (**self).get(key)
    }

    fn put(&self, key: &str, entry: CacheEntry) -> Result<(), CacheUnavailable> {
        (**self).put(key, entry)
    }
}
