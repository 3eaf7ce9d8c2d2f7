//! Bounded result cache.
//!
//! Memoizes whole `process` results keyed by the raw input and the effective
//! configuration. Eviction is oldest-inserted-first. Entries are cloned in
//! and out, so a caller mutating a returned result never touches cached
//! state.
//!
//! The cache is the only state shared between calls. A single mutex guards
//! it; two threads may still compute the same key concurrently.

use crate::{Context, ProcessorOptions, RecurrenceOptions};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tracing::trace;

/// Exact (input, configuration) pair.
///
/// The configuration half is the `Debug` rendering of the options plus the
/// reference date.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    input: String,
    config: String,
}

impl CacheKey {
    pub(crate) fn new(input: &str, context: &Context, options: &ProcessorOptions) -> Self {
        CacheKey { input: input.to_string(), config: format!("{:?}@{}", options, context.reference_time.date()) }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CacheEntry {
    /// `None` records "not a recognised pattern".
    pub result: Option<RecurrenceOptions>,
    pub inserted_at: Instant,
    pub fast_path: bool,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<CacheKey, CacheEntry>,
    order: VecDeque<CacheKey>,
}

/// In-memory, process-lifetime cache of processing results.
#[derive(Debug)]
pub struct ResultCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl ResultCache {
    pub const DEFAULT_CAPACITY: usize = 512;

    /// Create a cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        ResultCache { inner: Mutex::new(CacheInner::default()), capacity: capacity.max(1) }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    pub(crate) fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.lock().entries.get(key).cloned()
    }

    pub(crate) fn insert(&self, key: CacheKey, entry: CacheEntry) {
        let mut inner = self.lock();
        if inner.entries.insert(key.clone(), entry).is_some() {
            // Re-insert keeps the original position in the eviction order.
            return;
        }
        inner.order.push_back(key);

        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
                trace!(input = %oldest.input, "evicted cache entry");
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        // Poisoned: keep serving, entries are whole values.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Frequency;

    fn key(input: &str) -> CacheKey {
        CacheKey::new(input, &Context::default(), &ProcessorOptions::default())
    }

    fn entry(frequency: Frequency) -> CacheEntry {
        CacheEntry {
            result: Some(RecurrenceOptions { frequency: Some(frequency), ..RecurrenceOptions::default() }),
            inserted_at: Instant::now(),
            fast_path: false,
        }
    }

    #[test]
    fn evicts_oldest_inserted_first() {
        let cache = ResultCache::new(2);
        cache.insert(key("a"), entry(Frequency::Daily));
        cache.insert(key("b"), entry(Frequency::Weekly));
        // Reading does not refresh position.
        assert!(cache.get(&key("a")).is_some());
        cache.insert(key("c"), entry(Frequency::Monthly));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("a")).is_none());
        assert!(cache.get(&key("b")).is_some());
        assert!(cache.get(&key("c")).is_some());
    }

    #[test]
    fn reinsert_replaces_without_growing() {
        let cache = ResultCache::new(2);
        cache.insert(key("a"), entry(Frequency::Daily));
        cache.insert(key("a"), entry(Frequency::Yearly));
        assert_eq!(cache.len(), 1);
        let stored = cache.get(&key("a")).unwrap().result.unwrap();
        assert_eq!(stored.frequency, Some(Frequency::Yearly));
    }

    #[test]
    fn key_includes_configuration() {
        let no_metrics = ProcessorOptions::default();
        let metrics = ProcessorOptions { collect_metrics: true, ..ProcessorOptions::default() };
        let ctx = Context::default();
        assert_ne!(CacheKey::new("daily", &ctx, &no_metrics), CacheKey::new("daily", &ctx, &metrics));
        assert_eq!(CacheKey::new("daily", &ctx, &no_metrics), CacheKey::new("daily", &ctx, &no_metrics));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let cache = ResultCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.insert(key("a"), entry(Frequency::Daily));
        cache.insert(key("b"), entry(Frequency::Daily));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
