use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;

#[cfg(feature = "stats")]
use crate::CacheStats;

/// A single-threaded memoizer with no locking at all.
///
/// Results are kept in a `RefCell<HashMap>`, which makes the type `!Sync`:
/// sharing it between threads is rejected at compile time rather than being a
/// documented footgun. Entries live for the lifetime of the memoizer.
///
/// For concurrent callers use [`SharedMemo`](crate::SharedMemo) or
/// [`LazyMemo`](crate::LazyMemo) instead.
///
/// # Examples
///
/// ```
/// use memito_core::EagerMemo;
///
/// let memo = EagerMemo::new(|n: u64| n * n);
/// assert_eq!(memo.call(4), 16);
/// assert_eq!(memo.call(4), 16);
/// assert_eq!(memo.len(), 1);
/// ```
pub struct EagerMemo<K, V, F> {
    slots: RefCell<HashMap<K, V>>,
    func: F,
    #[cfg(feature = "stats")]
    stats: CacheStats,
}

impl<K, V, F> EagerMemo<K, V, F>
where
    K: Eq + Hash + Clone,
    V: Clone,
    F: Fn(K) -> V,
{
    /// Wraps `func` in a fresh memoizer.
    pub fn new(func: F) -> Self {
        Self {
            slots: RefCell::new(HashMap::new()),
            func,
            #[cfg(feature = "stats")]
            stats: CacheStats::new(),
        }
    }

    /// Returns the memoized result for `key`, invoking the wrapped function
    /// only on the first call for that key.
    pub fn call(&self, key: K) -> V {
        if let Some(value) = self.slots.borrow().get(&key) {
            #[cfg(feature = "stats")]
            self.stats.record_hit();
            return value.clone();
        }
        #[cfg(feature = "stats")]
        self.stats.record_miss();
        let value = (self.func)(key.clone());
        self.slots.borrow_mut().insert(key, value.clone());
        value
    }
}

impl<K, V, E, F> EagerMemo<K, V, F>
where
    K: Eq + Hash + Clone,
    V: Clone,
    F: Fn(K) -> Result<V, E>,
{
    /// Wraps a fallible function; only `Ok` values are ever cached.
    pub fn new_result(func: F) -> Self {
        Self {
            slots: RefCell::new(HashMap::new()),
            func,
            #[cfg(feature = "stats")]
            stats: CacheStats::new(),
        }
    }

    /// Like [`call`](Self::call), but an `Err` is passed through unchanged and
    /// leaves no trace in the cache, so the next call for the same key retries.
    ///
    /// # Examples
    ///
    /// ```
    /// use memito_core::EagerMemo;
    ///
    /// let memo = EagerMemo::new_result(|n: i32| {
    ///     if n < 0 {
    ///         Err("negative input".to_string())
    ///     } else {
    ///         Ok(n * 2)
    ///     }
    /// });
    ///
    /// assert_eq!(memo.call_result(21), Ok(42));
    /// assert!(memo.call_result(-1).is_err());
    /// // The failure was not cached; this runs the function again.
    /// assert!(memo.call_result(-1).is_err());
    /// ```
    pub fn call_result(&self, key: K) -> Result<V, E> {
        if let Some(value) = self.slots.borrow().get(&key) {
            #[cfg(feature = "stats")]
            self.stats.record_hit();
            return Ok(value.clone());
        }
        #[cfg(feature = "stats")]
        self.stats.record_miss();
        let value = (self.func)(key.clone())?;
        self.slots.borrow_mut().insert(key, value.clone());
        Ok(value)
    }
}

impl<K, V, F> EagerMemo<K, V, F> {
    /// Number of cached results.
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Returns `true` if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }

    /// Returns this memoizer's statistics.
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

/// Memoizes `func` for use from a single thread.
///
/// The returned closure computes each distinct key once and afterwards answers
/// from its private cache. Entries are never evicted.
///
/// # Examples
///
/// ```
/// use memito_core::memoize;
/// use std::cell::Cell;
///
/// let calls = Cell::new(0);
/// let square = memoize(|n: u64| {
///     calls.set(calls.get() + 1);
///     n * n
/// });
///
/// assert_eq!(square(3), 9);
/// assert_eq!(square(3), 9);
/// assert_eq!(square(4), 16);
/// assert_eq!(calls.get(), 2);
/// ```
pub fn memoize<K, V, F>(func: F) -> impl Fn(K) -> V
where
    K: Eq + Hash + Clone,
    V: Clone,
    F: Fn(K) -> V,
{
    let memo = EagerMemo::new(func);
    move |key| memo.call(key)
}
