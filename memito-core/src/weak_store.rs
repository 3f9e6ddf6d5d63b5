use dashmap::DashMap;
use std::fmt;
use std::hash::Hash;
use std::ops::Deref;
use std::sync::{Arc, Weak};

#[cfg(feature = "stats")]
use crate::CacheStats;

/// A computed value plus the cleanup that runs when the last strong handle
/// goes away.
struct Slot<V> {
    value: V,
    reclaim: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl<V> Drop for Slot<V> {
    fn drop(&mut self) {
        if let Some(reclaim) = self.reclaim.take() {
            reclaim();
        }
    }
}

/// A strong handle to a value held in a [`WeakStore`].
///
/// The store itself only keeps a weak reference, so the value lives exactly as
/// long as at least one `Cached` handle does. Handles are cheap to clone
/// (reference counted) and dereference to the value. Dropping the last handle
/// runs the slot's reclamation hook, which prunes the store entry so the next
/// lookup recomputes.
///
/// A handle stays fully usable even after its entry has been removed from the
/// store; the handle owns the value, the store never does.
///
/// # Examples
///
/// ```
/// use memito_core::WeakStore;
///
/// let store: WeakStore<u8, Vec<u8>> = WeakStore::new();
/// let first = store.get_or_add(3, |n| vec![n; 3]);
/// let second = first.clone();
///
/// drop(first);
/// // `second` still pins the slot.
/// assert_eq!(store.len(), 1);
/// assert_eq!(*second, vec![3, 3, 3]);
///
/// drop(second);
/// assert_eq!(store.len(), 0);
/// ```
pub struct Cached<V> {
    slot: Arc<Slot<V>>,
}

impl<V> Cached<V> {
    /// Returns a reference to the cached value.
    pub fn value(&self) -> &V {
        &self.slot.value
    }
}

impl<V> Clone for Cached<V> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<V> Deref for Cached<V> {
    type Target = V;

    fn deref(&self) -> &V {
        &self.slot.value
    }
}

impl<V: fmt::Debug> fmt::Debug for Cached<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cached").field(&self.slot.value).finish()
    }
}

struct StoreInner<K, V> {
    slots: DashMap<K, Weak<Slot<V>>>,
    #[cfg(feature = "stats")]
    stats: CacheStats,
}

/// A concurrent map from keys to weakly held values.
///
/// The store keeps `Weak` references only; callers hold the strong side as
/// [`Cached`] handles. When the last handle for a key is dropped, the slot's
/// reclamation hook removes the map entry, so memory for a value is released
/// the moment nobody uses it and the key transparently recomputes on its next
/// lookup.
///
/// The hook removes an entry only while it still points at the dead slot
/// (`Weak::strong_count == 0`). If the key was repopulated in the meantime,
/// the stale hook leaves the fresh entry untouched.
///
/// `WeakStore` itself performs no locking around computation; callers that
/// need one-computation-per-key semantics serialize through a
/// [`LockRegistry`](crate::LockRegistry) and double-check with
/// [`try_get`](Self::try_get) before calling
/// [`get_or_add`](Self::get_or_add).
///
/// # Examples
///
/// ```
/// use memito_core::WeakStore;
///
/// let store: WeakStore<u32, String> = WeakStore::new();
///
/// let handle = store.get_or_add(1, |n| format!("value-{n}"));
/// assert_eq!(*handle, "value-1");
/// assert_eq!(store.len(), 1);
///
/// // The entry disappears as soon as the last handle is gone.
/// drop(handle);
/// assert_eq!(store.len(), 0);
/// assert!(store.try_get(&1).is_none());
/// ```
pub struct WeakStore<K, V> {
    inner: Arc<StoreInner<K, V>>,
}

impl<K, V> WeakStore<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                slots: DashMap::new(),
                #[cfg(feature = "stats")]
                stats: CacheStats::new(),
            }),
        }
    }

    /// Returns a strong handle for `key` if its value is still alive.
    ///
    /// Returns `None` when the key was never computed, was explicitly
    /// removed, or its last handle has been dropped.
    pub fn try_get(&self, key: &K) -> Option<Cached<V>> {
        let slot = self
            .inner
            .slots
            .get(key)
            .and_then(|entry| entry.value().upgrade())?;
        Some(Cached { slot })
    }

    /// Computes a value for `key`, stores a weak reference to it and returns
    /// the strong handle.
    ///
    /// The computation runs without any store lock held. The insert overwrites
    /// whatever the entry held before, which is how a dead (but not yet
    /// pruned) slot gets replaced. Callers wanting to avoid duplicate
    /// computation check [`try_get`](Self::try_get) first, under a per-key
    /// lock.
    pub fn get_or_add(&self, key: K, compute: impl FnOnce(K) -> V) -> Cached<V> {
        let value = compute(key.clone());
        self.install(key, value)
    }

    /// Fallible counterpart of [`get_or_add`](Self::get_or_add).
    ///
    /// On `Err` nothing is stored and the error is returned unchanged, so the
    /// next lookup for the key starts from scratch.
    pub fn get_or_try_add<E>(
        &self,
        key: K,
        compute: impl FnOnce(K) -> Result<V, E>,
    ) -> Result<Cached<V>, E> {
        let value = compute(key.clone())?;
        Ok(self.install(key, value))
    }

    /// Explicitly removes the entry for `key`, returning `true` if one was
    /// present.
    ///
    /// Outstanding [`Cached`] handles for the removed entry remain valid; only
    /// the store forgets the value. This is not counted as an eviction.
    pub fn remove(&self, key: &K) -> bool {
        self.inner.slots.remove(key).is_some()
    }

    /// Number of entries currently tracked.
    ///
    /// This includes an entry whose value died in the last instants and whose
    /// reclamation hook has not finished yet, so the count can transiently
    /// overshoot the number of live values.
    pub fn len(&self) -> usize {
        self.inner.slots.len()
    }

    /// Returns `true` if the store tracks no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.slots.is_empty()
    }

    /// Returns this store's statistics.
    ///
    /// Hits and misses are recorded by the memoizer driving the store;
    /// evictions are recorded here when a reclamation hook prunes a dead
    /// slot.
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &CacheStats {
        &self.inner.stats
    }

    /// Wraps `value` in a slot whose drop hook prunes the entry, and
    /// (over)writes the weak reference for `key`.
    fn install(&self, key: K, value: V) -> Cached<V> {
        let store = Arc::downgrade(&self.inner);
        let hook_key = key.clone();
        let slot = Arc::new(Slot {
            value,
            reclaim: Some(Box::new(move || {
                if let Some(inner) = store.upgrade() {
                    // Prune only if the entry still points at a dead slot; a
                    // concurrently repopulated entry must survive.
                    if inner
                        .slots
                        .remove_if(&hook_key, |_, slot| slot.strong_count() == 0)
                        .is_some()
                    {
                        #[cfg(feature = "stats")]
                        inner.stats.record_eviction();
                    }
                }
            })),
        });
        self.inner.slots.insert(key, Arc::downgrade(&slot));
        Cached { slot }
    }
}

impl<K, V> Default for WeakStore<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
