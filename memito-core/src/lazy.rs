use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::hash::Hash;
use std::sync::Arc;

#[cfg(feature = "stats")]
use crate::CacheStats;

/// A thread-safe memoizer with one lazy cell per key.
///
/// Each key maps to a `OnceCell`. The first caller for a key runs the wrapped
/// function inside the cell's initialization; any thread arriving while that
/// initialization is in flight blocks on the cell and then reads the finished
/// value. A key is therefore computed at most once, at the price of callers
/// for that key waiting on each other. Callers for other keys are unaffected,
/// since each key has its own cell.
///
/// Entries live for the lifetime of the memoizer.
///
/// # Examples
///
/// ```
/// use memito_core::LazyMemo;
///
/// let memo = LazyMemo::new(|n: u64| n + 1);
/// assert_eq!(memo.call(1), 2);
/// assert_eq!(memo.call(1), 2);
/// ```
pub struct LazyMemo<K, V, F> {
    cells: DashMap<K, Arc<OnceCell<V>>>,
    func: F,
    #[cfg(feature = "stats")]
    stats: CacheStats,
}

impl<K, V, F> LazyMemo<K, V, F>
where
    K: Eq + Hash + Clone,
    V: Clone,
    F: Fn(K) -> V,
{
    /// Wraps `func` in a fresh memoizer.
    pub fn new(func: F) -> Self {
        Self {
            cells: DashMap::new(),
            func,
            #[cfg(feature = "stats")]
            stats: CacheStats::new(),
        }
    }

    /// Returns the memoized result for `key`, computing it exactly once.
    ///
    /// Blocks if another thread is currently computing this key.
    pub fn call(&self, key: K) -> V {
        let cell = match self.cells.entry(key.clone()) {
            Entry::Occupied(entry) => {
                #[cfg(feature = "stats")]
                self.stats.record_hit();
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                #[cfg(feature = "stats")]
                self.stats.record_miss();
                entry.insert(Arc::new(OnceCell::new())).value().clone()
            }
        };
        // The map shard is unlocked here; only callers of this key block.
        cell.get_or_init(|| (self.func)(key)).clone()
    }
}

impl<K, V, E, F> LazyMemo<K, V, F>
where
    K: Eq + Hash + Clone,
    V: Clone,
    F: Fn(K) -> Result<V, E>,
{
    /// Wraps a fallible function; only `Ok` values are ever cached.
    pub fn new_result(func: F) -> Self {
        Self {
            cells: DashMap::new(),
            func,
            #[cfg(feature = "stats")]
            stats: CacheStats::new(),
        }
    }

    /// Like [`call`](Self::call), but an `Err` leaves the cell empty and
    /// propagates unchanged, so the key is retried by the next caller.
    ///
    /// # Examples
    ///
    /// ```
    /// use memito_core::LazyMemo;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    ///
    /// let attempts = AtomicUsize::new(0);
    /// let memo = LazyMemo::new_result(|n: u32| {
    ///     if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
    ///         Err("warming up")
    ///     } else {
    ///         Ok(n * 10)
    ///     }
    /// });
    ///
    /// assert_eq!(memo.call_result(7), Err("warming up"));
    /// assert_eq!(memo.call_result(7), Ok(70));
    /// assert_eq!(memo.call_result(7), Ok(70));
    /// assert_eq!(attempts.load(Ordering::SeqCst), 2);
    /// ```
    pub fn call_result(&self, key: K) -> Result<V, E> {
        let cell = match self.cells.entry(key.clone()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => entry.insert(Arc::new(OnceCell::new())).value().clone(),
        };
        let mut computed = false;
        let outcome = cell
            .get_or_try_init(|| {
                computed = true;
                (self.func)(key)
            })
            .cloned();
        // A returned error always came from this call's own attempt;
        // a concurrent failing initializer never surfaces here.
        #[cfg(feature = "stats")]
        {
            if computed {
                self.stats.record_miss();
            } else {
                self.stats.record_hit();
            }
        }
        #[cfg(not(feature = "stats"))]
        let _ = computed;
        outcome
    }
}

impl<K, V, F> LazyMemo<K, V, F>
where
    K: Eq + Hash,
{
    /// Number of keys with a cell, counting cells still empty after a failed
    /// or in-flight computation.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if no key has been requested yet.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns this memoizer's statistics.
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

/// Memoizes `func` with at-most-once computation per key.
///
/// Concurrent callers for the same key block until the single in-flight
/// computation finishes, then all observe its result. Use this over
/// [`memoize_thread_safe`](crate::memoize_thread_safe) when the function is
/// too expensive to ever run twice.
///
/// # Examples
///
/// ```
/// use memito_core::memoize_lazy_thread_safe;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let calls = Arc::new(AtomicUsize::new(0));
/// let seen = Arc::clone(&calls);
/// let triple = memoize_lazy_thread_safe(move |n: u64| {
///     seen.fetch_add(1, Ordering::SeqCst);
///     n * 3
/// });
///
/// assert_eq!(triple(5), 15);
/// assert_eq!(triple(5), 15);
/// assert_eq!(calls.load(Ordering::SeqCst), 1);
/// ```
pub fn memoize_lazy_thread_safe<K, V, F>(func: F) -> impl Fn(K) -> V
where
    K: Eq + Hash + Clone,
    V: Clone,
    F: Fn(K) -> V,
{
    let memo = LazyMemo::new(func);
    move |key| memo.call(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_call_initializes_once() {
        let calls = AtomicUsize::new(0);
        let memo = LazyMemo::new(|n: u32| {
            calls.fetch_add(1, Ordering::SeqCst);
            n + 1
        });

        assert_eq!(memo.call(1), 2);
        assert_eq!(memo.call(1), 2);
        assert_eq!(memo.call(2), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    /// Even under contention the cell guarantees a single initialization.
    #[test]
    fn test_contending_callers_share_one_initialization() {
        let calls = AtomicUsize::new(0);
        let memo = LazyMemo::new(|n: u64| {
            calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(30));
            n * 2
        });
        let threads = 8;
        let barrier = Barrier::new(threads);

        let results: Vec<u64> = thread::scope(|s| {
            let joins: Vec<_> = (0..threads)
                .map(|_| {
                    let memo = &memo;
                    let barrier = &barrier;
                    s.spawn(move || {
                        barrier.wait();
                        memo.call(9)
                    })
                })
                .collect();
            joins.into_iter().map(|j| j.join().unwrap()).collect()
        });

        assert!(results.iter().all(|v| *v == 18));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_distinct_keys_get_distinct_cells() {
        let memo = LazyMemo::new(|n: u32| n * n);
        assert_eq!(memo.call(2), 4);
        assert_eq!(memo.call(3), 9);
        assert_eq!(memo.len(), 2);
    }

    #[test]
    fn test_call_result_err_leaves_cell_empty() {
        let calls = AtomicUsize::new(0);
        let memo = LazyMemo::new_result(|n: u32| {
            let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt < 3 {
                Err(format!("attempt {attempt} failed"))
            } else {
                Ok(n + 1)
            }
        });

        assert_eq!(memo.call_result(1), Err("attempt 1 failed".to_string()));
        assert_eq!(memo.call_result(1), Err("attempt 2 failed".to_string()));
        assert_eq!(memo.call_result(1), Ok(2));
        // Cached from here on.
        assert_eq!(memo.call_result(1), Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // The failed attempts left the cell registered but empty.
        assert_eq!(memo.len(), 1);
    }

    #[test]
    #[cfg(feature = "stats")]
    fn test_stats_count_invocations_as_misses() {
        let memo = LazyMemo::new_result(|n: u32| {
            if n == 0 {
                Err("zero")
            } else {
                Ok(n)
            }
        });

        let _ = memo.call_result(0); // miss (failed attempt)
        let _ = memo.call_result(1); // miss
        let _ = memo.call_result(1); // hit

        assert_eq!(memo.stats().misses(), 2);
        assert_eq!(memo.stats().hits(), 1);
    }
}
