use std::hash::Hash;

use crate::lock_registry::LockRegistry;
use crate::weak_store::{Cached, WeakStore};

#[cfg(feature = "stats")]
use crate::CacheStats;

/// A thread-safe memoizer that holds results only weakly and computes each
/// live key exactly once.
///
/// Two mechanisms compose here:
///
/// - a [`WeakStore`] keeps weak references, so a result stays cached only
///   while at least one returned [`Cached`] handle is alive. Dropping the
///   last handle reclaims the slot and the next call recomputes.
/// - a [`LockRegistry`] serializes first computations per key: a caller that
///   misses acquires the key's token, re-checks the store under it and only
///   then computes. Callers for the same key wait on that token; callers for
///   other keys proceed untouched.
///
/// The fast path is a plain concurrent-map read; the per-key token is only
/// ever taken on a miss.
///
/// # Examples
///
/// ```
/// use memito_core::WeakMemo;
///
/// let memo = WeakMemo::new(|n: u32| vec![n; n as usize]);
///
/// let handle = memo.call(3);
/// assert_eq!(*handle, vec![3, 3, 3]);
/// assert_eq!(memo.len(), 1);
///
/// // Dropping the last handle reclaims the slot.
/// drop(handle);
/// assert_eq!(memo.len(), 0);
/// ```
pub struct WeakMemo<K, V, F> {
    store: WeakStore<K, V>,
    registry: LockRegistry<K>,
    func: F,
}

impl<K, V, F> WeakMemo<K, V, F>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
    F: Fn(K) -> V,
{
    /// Wraps `func` in a fresh memoizer.
    pub fn new(func: F) -> Self {
        Self {
            store: WeakStore::new(),
            registry: LockRegistry::new(),
            func,
        }
    }

    /// Returns a strong handle to the result for `key`.
    ///
    /// If the value is alive this is a lock-free hit. Otherwise the caller
    /// acquires the key's token, re-checks the store (another caller may have
    /// finished meanwhile) and computes only on a confirmed miss. The handle
    /// keeps the result cached; hold it as long as sharing is wanted.
    ///
    /// A panic in the wrapped function unwinds straight through: nothing is
    /// cached, and the key's token entry stays registered until the next call
    /// for that key prunes it.
    pub fn call(&self, key: K) -> Cached<V> {
        if let Some(hit) = self.store.try_get(&key) {
            #[cfg(feature = "stats")]
            self.store.stats().record_hit();
            return hit;
        }

        let token = self.registry.acquire(key.clone());
        let handle = {
            let _guard = token.lock();
            match self.store.try_get(&key) {
                Some(hit) => {
                    #[cfg(feature = "stats")]
                    self.store.stats().record_hit();
                    hit
                }
                None => {
                    #[cfg(feature = "stats")]
                    self.store.stats().record_miss();
                    self.store.get_or_add(key.clone(), |k| (self.func)(k))
                }
            }
        };
        self.registry.release(&key, token);
        handle
    }
}

impl<K, V, E, F> WeakMemo<K, V, F>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
    F: Fn(K) -> Result<V, E>,
{
    /// Wraps a fallible function; only `Ok` values are ever cached.
    pub fn new_result(func: F) -> Self {
        Self {
            store: WeakStore::new(),
            registry: LockRegistry::new(),
            func,
        }
    }

    /// Like [`call`](Self::call), but an `Err` propagates unchanged and
    /// stores nothing.
    ///
    /// The key's token is released before the error is returned, so a waiting
    /// caller immediately gets its own attempt.
    pub fn call_result(&self, key: K) -> Result<Cached<V>, E> {
        if let Some(hit) = self.store.try_get(&key) {
            #[cfg(feature = "stats")]
            self.store.stats().record_hit();
            return Ok(hit);
        }

        let token = self.registry.acquire(key.clone());
        let outcome = {
            let _guard = token.lock();
            match self.store.try_get(&key) {
                Some(hit) => {
                    #[cfg(feature = "stats")]
                    self.store.stats().record_hit();
                    Ok(hit)
                }
                None => {
                    #[cfg(feature = "stats")]
                    self.store.stats().record_miss();
                    self.store.get_or_try_add(key.clone(), |k| (self.func)(k))
                }
            }
        };
        self.registry.release(&key, token);
        outcome
    }
}

impl<K, V, F> WeakMemo<K, V, F>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// The underlying store, for explicit removal or direct lookups.
    pub fn store(&self) -> &WeakStore<K, V> {
        &self.store
    }

    /// Number of entries currently tracked (see [`WeakStore::len`]).
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if no live entry is tracked.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns this memoizer's statistics, including slot evictions.
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &CacheStats {
        self.store.stats()
    }
}

/// Memoizes `func` behind weak references with single-flight computation.
///
/// The returned closure yields [`Cached`] handles. A result is shared among
/// all callers while any handle for its key is alive and is reclaimed as soon
/// as the last one drops; the next call then recomputes. Concurrent callers
/// for a missing key collapse into one computation.
///
/// # Examples
///
/// ```
/// use memito_core::memoize_weak;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let calls = Arc::new(AtomicUsize::new(0));
/// let seen = Arc::clone(&calls);
/// let load = memoize_weak(move |n: u64| {
///     seen.fetch_add(1, Ordering::SeqCst);
///     n + 100
/// });
///
/// let first = load(1);
/// let again = load(1);
/// assert_eq!(calls.load(Ordering::SeqCst), 1); // shared while alive
///
/// drop(first);
/// drop(again);
/// let fresh = load(1); // the slot was reclaimed, so this recomputes
/// assert_eq!(*fresh, 101);
/// assert_eq!(calls.load(Ordering::SeqCst), 2);
/// ```
pub fn memoize_weak<K, V, F>(func: F) -> impl Fn(K) -> Cached<V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
    F: Fn(K) -> V,
{
    let memo = WeakMemo::new(func);
    move |key| memo.call(key)
}
