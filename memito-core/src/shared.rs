use dashmap::DashMap;
use std::hash::Hash;

#[cfg(feature = "stats")]
use crate::CacheStats;

/// A thread-safe memoizer that computes outside any lock.
///
/// Lookups and inserts go through a concurrent map, so `call` never blocks one
/// key on another. The trade-off is that two threads missing on the same key
/// at the same time both run the function; the value stored first wins and
/// every caller observes that winner from then on. Duplicate computation is
/// wasted work, never an error.
///
/// When the wrapped function is expensive enough that duplicates matter, use
/// [`LazyMemo`](crate::LazyMemo), which blocks concurrent callers on a per-key
/// cell instead.
///
/// # Examples
///
/// ```
/// use memito_core::SharedMemo;
///
/// let memo = SharedMemo::new(|name: String| name.len());
/// assert_eq!(memo.call("memoization".to_string()), 11);
/// assert_eq!(memo.call("memoization".to_string()), 11);
/// assert_eq!(memo.len(), 1);
/// ```
pub struct SharedMemo<K, V, F> {
    slots: DashMap<K, V>,
    func: F,
    #[cfg(feature = "stats")]
    stats: CacheStats,
}

impl<K, V, F> SharedMemo<K, V, F>
where
    K: Eq + Hash + Clone,
    V: Clone,
    F: Fn(K) -> V,
{
    /// Wraps `func` in a fresh memoizer.
    pub fn new(func: F) -> Self {
        Self {
            slots: DashMap::new(),
            func,
            #[cfg(feature = "stats")]
            stats: CacheStats::new(),
        }
    }

    /// Returns the memoized result for `key`.
    ///
    /// On a miss the function runs with no lock held; the result is then
    /// published unless another thread got there first, in which case the
    /// earlier value is returned and this thread's result is discarded.
    pub fn call(&self, key: K) -> V {
        if let Some(hit) = self.slots.get(&key) {
            #[cfg(feature = "stats")]
            self.stats.record_hit();
            return hit.value().clone();
        }
        #[cfg(feature = "stats")]
        self.stats.record_miss();
        let value = (self.func)(key.clone());
        self.slots.entry(key).or_insert(value).value().clone()
    }
}

impl<K, V, E, F> SharedMemo<K, V, F>
where
    K: Eq + Hash + Clone,
    V: Clone,
    F: Fn(K) -> Result<V, E>,
{
    /// Wraps a fallible function; only `Ok` values are ever cached.
    pub fn new_result(func: F) -> Self {
        Self {
            slots: DashMap::new(),
            func,
            #[cfg(feature = "stats")]
            stats: CacheStats::new(),
        }
    }

    /// Like [`call`](Self::call), but an `Err` propagates unchanged and is
    /// never stored, so the key stays a miss until some call succeeds.
    pub fn call_result(&self, key: K) -> Result<V, E> {
        if let Some(hit) = self.slots.get(&key) {
            #[cfg(feature = "stats")]
            self.stats.record_hit();
            return Ok(hit.value().clone());
        }
        #[cfg(feature = "stats")]
        self.stats.record_miss();
        let value = (self.func)(key.clone())?;
        Ok(self.slots.entry(key).or_insert(value).value().clone())
    }
}

impl<K, V, F> SharedMemo<K, V, F>
where
    K: Eq + Hash,
{
    /// Number of cached results.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns this memoizer's statistics.
    ///
    /// A hit is recorded when a call found a published value; a miss means the
    /// function was invoked, so under concurrent first calls the miss count
    /// can exceed the number of distinct keys.
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

/// Memoizes `func` for concurrent callers, favoring throughput over
/// deduplication.
///
/// The returned closure can be shared across threads (it is `Sync` whenever
/// the wrapped function is). Concurrent first calls for one key may each run
/// the function, but all of them return the single value that was published
/// first.
///
/// # Examples
///
/// ```
/// use memito_core::memoize_thread_safe;
/// use std::thread;
///
/// let double = memoize_thread_safe(|n: u64| n * 2);
///
/// thread::scope(|s| {
///     for _ in 0..4 {
///         s.spawn(|| assert_eq!(double(21), 42));
///     }
/// });
/// assert_eq!(double(21), 42);
/// ```
pub fn memoize_thread_safe<K, V, F>(func: F) -> impl Fn(K) -> V
where
    K: Eq + Hash + Clone,
    V: Clone,
    F: Fn(K) -> V,
{
    let memo = SharedMemo::new(func);
    move |key| memo.call(key)
}
