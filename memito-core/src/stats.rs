use std::sync::atomic::{AtomicU64, Ordering};

/// Per-memoizer statistics: hits, misses and weak-slot evictions.
///
/// Every memoizer owns one `CacheStats` instance; there is no global registry,
/// so two memoizers never share counters. All counters are atomic with
/// `Relaxed` ordering, which keeps recording cheap on the hot path while the
/// totals stay exact.
///
/// A *hit* means the call was answered from a live entry without invoking the
/// wrapped function. A *miss* means the wrapped function ran (or, for the
/// fallible variants, was at least attempted). An *eviction* is recorded when
/// a weak slot whose value has been dropped is pruned from the store.
///
/// # Examples
///
/// ```
/// use memito_core::CacheStats;
///
/// let stats = CacheStats::new();
///
/// stats.record_miss();
/// stats.record_hit();
/// stats.record_hit();
///
/// assert_eq!(stats.hits(), 2);
/// assert_eq!(stats.misses(), 1);
/// assert_eq!(stats.total_accesses(), 3);
/// assert!((stats.hit_rate() - 0.6666).abs() < 0.001);
/// ```
#[derive(Debug)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl CacheStats {
    /// Creates a new `CacheStats` instance with all counters at zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use memito_core::CacheStats;
    ///
    /// let stats = CacheStats::new();
    /// assert_eq!(stats.hits(), 0);
    /// assert_eq!(stats.misses(), 0);
    /// assert_eq!(stats.evictions(), 0);
    /// ```
    pub fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Records a hit (the call was served without invoking the function).
    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a miss (the wrapped function was invoked for this call).
    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the eviction of a dead weak slot.
    #[inline]
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the total number of hits.
    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Returns the total number of misses.
    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Returns the number of dead weak slots pruned so far.
    ///
    /// Only the weak-reference memoizer evicts; for every other variant this
    /// counter stays at zero.
    #[inline]
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Returns the total number of accesses (hits + misses).
    ///
    /// # Examples
    ///
    /// ```
    /// use memito_core::CacheStats;
    ///
    /// let stats = CacheStats::new();
    /// stats.record_hit();
    /// stats.record_miss();
    /// stats.record_hit();
    /// assert_eq!(stats.total_accesses(), 3);
    /// ```
    #[inline]
    pub fn total_accesses(&self) -> u64 {
        self.hits() + self.misses()
    }

    /// Returns the hit rate as a fraction between 0.0 and 1.0.
    ///
    /// Returns 0.0 if nothing has been recorded yet.
    ///
    /// # Examples
    ///
    /// ```
    /// use memito_core::CacheStats;
    ///
    /// let stats = CacheStats::new();
    /// stats.record_hit();
    /// stats.record_hit();
    /// stats.record_miss();
    ///
    /// // 2 hits out of 3 accesses
    /// assert!((stats.hit_rate() - 0.6666).abs() < 0.001);
    /// ```
    #[inline]
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_accesses();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }

    /// Returns the miss rate as a fraction between 0.0 and 1.0.
    #[inline]
    pub fn miss_rate(&self) -> f64 {
        1.0 - self.hit_rate()
    }

    /// Resets all counters to zero.
    ///
    /// Useful for measuring a specific phase of a workload.
    ///
    /// # Examples
    ///
    /// ```
    /// use memito_core::CacheStats;
    ///
    /// let stats = CacheStats::new();
    /// stats.record_hit();
    /// stats.record_miss();
    /// stats.reset();
    /// assert_eq!(stats.total_accesses(), 0);
    /// ```
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
    }
}

impl Default for CacheStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CacheStats {
    fn clone(&self) -> Self {
        Self {
            hits: AtomicU64::new(self.hits()),
            misses: AtomicU64::new(self.misses()),
            evictions: AtomicU64::new(self.evictions()),
        }
    }
}
