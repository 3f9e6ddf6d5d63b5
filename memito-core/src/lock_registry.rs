use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};
use std::hash::Hash;
use std::sync::Arc;

/// A reference-counted handle to the per-key mutex handed out by
/// [`LockRegistry::acquire`].
///
/// Every caller that acquired the same key holds a clone of the same token, so
/// locking any of them contends on the same underlying mutex. The token keeps
/// the mutex alive independently of the registry: even if the registry entry
/// is pruned, outstanding tokens still provide mutual exclusion among
/// themselves.
///
/// # Examples
///
/// ```
/// use memito_core::LockRegistry;
///
/// let registry: LockRegistry<u32> = LockRegistry::new();
/// let first = registry.acquire(7);
/// let second = registry.acquire(7);
///
/// // Both tokens wrap the same mutex.
/// let guard = first.lock();
/// assert!(second.try_lock().is_none());
/// drop(guard);
/// assert!(second.try_lock().is_some());
/// ```
#[derive(Clone)]
pub struct LockToken {
    mutex: Arc<Mutex<()>>,
}

impl LockToken {
    fn new() -> Self {
        Self {
            mutex: Arc::new(Mutex::new(())),
        }
    }

    /// Blocks until this key's mutex is acquired and returns the guard.
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.mutex.lock()
    }

    /// Attempts to acquire this key's mutex without blocking.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, ()>> {
        self.mutex.try_lock()
    }

    /// Number of live clones of this token, including the registry's own copy
    /// while the entry is still registered.
    fn holders(&self) -> usize {
        Arc::strong_count(&self.mutex)
    }
}

/// A registry of transient per-key mutexes.
///
/// `acquire` returns the token registered for a key, creating it atomically if
/// no caller currently holds one. `release` drops the caller's token and prunes
/// the registry entry once no other caller still holds a clone, so the map only
/// grows with the number of keys under *active* contention, not with the number
/// of keys ever seen.
///
/// Pruning is deliberately relaxed: a caller that acquires a token in the same
/// instant another caller releases it may briefly keep an entry alive, or may
/// receive a fresh token for the same key. Exclusion is provided by the token
/// a caller actually holds, never by the registry entry, so this race is
/// harmless.
///
/// # Examples
///
/// ```
/// use memito_core::LockRegistry;
///
/// let registry: LockRegistry<String> = LockRegistry::new();
///
/// let token = registry.acquire("job-42".to_string());
/// {
///     let _guard = token.lock();
///     // critical section for "job-42"
/// }
/// registry.release(&"job-42".to_string(), token);
///
/// // No contention left, so the entry is gone.
/// assert!(registry.is_empty());
/// ```
pub struct LockRegistry<K> {
    tokens: DashMap<K, LockToken>,
}

impl<K> LockRegistry<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            tokens: DashMap::new(),
        }
    }

    /// Returns the token for `key`, registering a fresh one if absent.
    ///
    /// The lookup and the insert happen as one atomic step, so concurrent
    /// callers for the same key always end up sharing a single token.
    pub fn acquire(&self, key: K) -> LockToken {
        self.tokens
            .entry(key)
            .or_insert_with(LockToken::new)
            .value()
            .clone()
    }

    /// Gives back a token obtained from [`acquire`](Self::acquire) and prunes
    /// the registry entry if no other caller still holds one.
    ///
    /// The caller's clone is dropped first; the entry is then removed only if
    /// the registry's own copy is the last one standing.
    pub fn release(&self, key: &K, token: LockToken) {
        drop(token);
        self.tokens.remove_if(key, |_, slot| slot.holders() == 1);
    }

    /// Number of keys currently registered (keys under active contention,
    /// plus any whose release raced with a concurrent acquire).
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if no key is currently registered.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<K> Default for LockRegistry<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
