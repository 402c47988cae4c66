// =============================================================================
// Tier cache — short-lived per-symbol memo of tier results
// =============================================================================
//
// The cache is injected into `TierClassifier` so callers (and tests) control
// isolation and time.  `InMemoryTierCache` holds its mutex across the
// compute in `get_or_compute`, so two concurrent misses for the same symbol
// compute once and never overwrite each other with a stale result.  Every
// write sweeps expired entries, so symbols that stop being queried do not
// pile up.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::trace;

use super::TierResult;

// =============================================================================
// Clock
// =============================================================================

/// Time source for cache expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Monotonic wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock()
    }
}

// =============================================================================
// TierCache
// =============================================================================

/// Keyed store of tier results with per-entry TTL.
pub trait TierCache: Send + Sync {
    /// Fresh entry for `key`, if any.
    fn get(&self, key: &str) -> Option<TierResult>;

    fn set(&self, key: &str, value: TierResult, ttl: Duration);

    fn clear(&self);

    /// Return the fresh entry for `key` or compute, store and return a new
    /// one.
    ///
    /// The default is a plain get-then-set; implementations shared between
    /// threads should serialise the compute per key.
    fn get_or_compute(&self, key: &str, ttl: Duration, compute: &mut dyn FnMut() -> TierResult) -> TierResult {
        if let Some(hit) = self.get(key) {
            return hit;
        }
        let value = compute();
        self.set(key, value.clone(), ttl);
        value
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: TierResult,
    written_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.written_at) < self.ttl
    }
}

/// Mutex-guarded map cache.
pub struct InMemoryTierCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryTierCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Number of stored entries, fresh or expired.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn prune(entries: &mut HashMap<String, CacheEntry>, now: Instant) {
    let before = entries.len();
    entries.retain(|_, entry| entry.is_fresh(now));
    let dropped = before - entries.len();
    if dropped > 0 {
        trace!(dropped, "tier cache pruned");
    }
}

impl Default for InMemoryTierCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TierCache for InMemoryTierCache {
    fn get(&self, key: &str) -> Option<TierResult> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.is_fresh(now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: TierResult, ttl: Duration) {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        prune(&mut entries, now);
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                written_at: now,
                ttl,
            },
        );
    }

    fn clear(&self) {
        self.entries.lock().clear();
    }

    fn get_or_compute(&self, key: &str, ttl: Duration, compute: &mut dyn FnMut() -> TierResult) -> TierResult {
        let mut entries = self.entries.lock();
        let now = self.clock.now();
        if let Some(entry) = entries.get(key) {
            if entry.is_fresh(now) {
                trace!(key, "tier cache hit");
                return entry.value.clone();
            }
        }

        trace!(key, "tier cache miss");
        let value = compute();
        prune(&mut entries, self.clock.now());
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.clone(),
                written_at: self.clock.now(),
                ttl,
            },
        );
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::compute_tier;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(60);

    fn cache_with_clock() -> (InMemoryTierCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (InMemoryTierCache::with_clock(clock.clone()), clock)
    }

    #[test]
    fn hit_before_ttl_miss_after() {
        let (cache, clock) = cache_with_clock();
        cache.set("BTCUSDT", compute_tier(&[]), TTL);
        assert!(cache.get("BTCUSDT").is_some());

        clock.advance(Duration::from_secs(59));
        assert!(cache.get("BTCUSDT").is_some());

        clock.advance(Duration::from_secs(1));
        assert!(cache.get("BTCUSDT").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_drops_everything() {
        let (cache, _) = cache_with_clock();
        cache.set("A", compute_tier(&[]), TTL);
        cache.set("B", compute_tier(&[]), TTL);
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.get("A").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn get_or_compute_memoises_until_expiry() {
        let (cache, clock) = cache_with_clock();
        let mut calls = 0;
        let mut compute = || {
            calls += 1;
            compute_tier(&[])
        };
        cache.get_or_compute("X", TTL, &mut compute);
        cache.get_or_compute("X", TTL, &mut compute);
        clock.advance(TTL);
        cache.get_or_compute("X", TTL, &mut compute);
        drop(compute);
        assert_eq!(calls, 2);
    }

    #[test]
    fn writes_sweep_expired_symbols() {
        let (cache, clock) = cache_with_clock();
        cache.set("OLD1", compute_tier(&[]), TTL);
        cache.set("OLD2", compute_tier(&[]), Duration::from_secs(10));
        clock.advance(Duration::from_secs(30));

        cache.set("NEW", compute_tier(&[]), TTL);
        assert_eq!(cache.len(), 2);

        clock.advance(TTL);
        let mut compute = || compute_tier(&[]);
        cache.get_or_compute("OTHER", TTL, &mut compute);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("OTHER").is_some());
    }

    #[test]
    fn concurrent_misses_compute_once() {
        let cache = InMemoryTierCache::new();
        let calls = AtomicUsize::new(0);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let mut compute = || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        std::thread::sleep(Duration::from_millis(5));
                        compute_tier(&[])
                    };
                    cache.get_or_compute("SAME", TTL, &mut compute);
                });
            }
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
