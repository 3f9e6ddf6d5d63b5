//! # Memito Async
//!
//! Async single-flight memoization built on shared futures.
//!
//! The synchronous memoizers in [`memito-core`](memito_core) make contending
//! callers block on a per-key lock while one of them computes. Blocking is not
//! an option inside an async task, so this crate takes a different route: every
//! key owns a single [`SharedFuture`], and any number of tasks can await clones
//! of it. The first task to poll the future drives the computation; the others
//! are woken when the result lands. Once resolved, the same future keeps
//! serving the cached output to later callers without re-running anything.
//!
//! ## Features
//!
//! - **One flight per key**: concurrent tasks coalesce onto a single
//!   computation instead of racing it
//! - **Lock-free map**: flights live in a [DashMap](https://docs.rs/dashmap),
//!   so looking up or registering a flight never blocks the runtime
//! - **Lazy execution**: a flight starts running when it is first polled, not
//!   when it is registered
//! - **Error transparency**: with [`AsyncMemo::call_result`], `Err` outcomes
//!   are handed to every waiting task but never cached - the next call retries
//! - **Runtime agnostic**: nothing here spawns or sleeps; any executor that
//!   can poll a future works
//! - **Statistics**: hit/miss/eviction counters via the `stats` feature
//!   (enabled by default)
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! memito-async = "0.1.0"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! ## Examples
//!
//! Basic memoization of an async function:
//!
//! ```
//! use memito_async::AsyncMemo;
//!
//! # futures::executor::block_on(async {
//! let memo = AsyncMemo::new(|n: u32| async move { n * n });
//!
//! assert_eq!(memo.call(4).await, 16); // computed
//! assert_eq!(memo.call(4).await, 16); // served by the resolved flight
//! assert_eq!(memo.len(), 1);
//! # });
//! ```
//!
//! Sharing one computation across tasks:
//!
//! ```
//! use memito_async::AsyncMemo;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let memo = Arc::new(AsyncMemo::new(|city: String| async move {
//!     // imagine a network round-trip here
//!     format!("forecast for {city}")
//! }));
//!
//! let mut tasks = Vec::new();
//! for _ in 0..4 {
//!     let memo = Arc::clone(&memo);
//!     tasks.push(tokio::spawn(async move { memo.call("oslo".to_string()).await }));
//! }
//!
//! for task in tasks {
//!     assert_eq!(task.await.unwrap(), "forecast for oslo");
//! }
//! # }
//! ```

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::future::Future;
use std::hash::Hash;

#[cfg(feature = "stats")]
pub use memito_core::CacheStats;

/// A cloneable future representing one in-flight or finished computation.
///
/// Every clone polls the same underlying [`BoxFuture`]; the first poll drives
/// the computation and later polls (or polls of other clones) observe the
/// cached output. Awaiting a `SharedFuture` yields an owned copy of the
/// output, which is why the output type must be `Clone`.
pub type SharedFuture<O> = Shared<BoxFuture<'static, O>>;

/// An async memoizer that runs each key's computation at most once at a time.
///
/// `AsyncMemo` keeps a [`SharedFuture`] per key. When a key is requested for
/// the first time the wrapped function is invoked to build the flight; every
/// request after that - concurrent or later - receives a clone of the same
/// future. Resolved flights stay in the map, so completed outputs behave like
/// ordinary cached values.
///
/// # Type Parameters
///
/// * `K` - Key type. Must be hashable, cloneable and shareable across tasks.
/// * `O` - Output type. Must be `Clone` because every waiter gets its own copy.
/// * `F` - The wrapped function. Takes an owned key and returns a future.
///
/// # Thread Safety
///
/// The memoizer can be shared freely across tasks and threads, typically
/// behind an [`Arc`](std::sync::Arc). Registering a flight takes a short
/// internal map lock; the computation itself always runs outside it.
///
/// # Examples
///
/// ```
/// use memito_async::AsyncMemo;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// # futures::executor::block_on(async {
/// let calls = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&calls);
///
/// let memo = AsyncMemo::new(move |n: u64| {
///     let counter = Arc::clone(&counter);
///     async move {
///         counter.fetch_add(1, Ordering::SeqCst);
///         n + 100
///     }
/// });
///
/// assert_eq!(memo.call(1).await, 101);
/// assert_eq!(memo.call(1).await, 101);
/// assert_eq!(memo.call(2).await, 102);
/// assert_eq!(calls.load(Ordering::SeqCst), 2);
/// # });
/// ```
pub struct AsyncMemo<K, O, F> {
    /// One shared flight per key, pending or resolved
    flights: DashMap<K, SharedFuture<O>>,

    /// The wrapped async function
    func: F,

    /// Cache statistics (when stats feature is enabled)
    #[cfg(feature = "stats")]
    stats: CacheStats,
}

impl<K, O, F, Fut> AsyncMemo<K, O, F>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    O: Clone + Send + Sync + 'static,
    F: Fn(K) -> Fut,
    Fut: Future<Output = O> + Send + 'static,
{
    /// Creates a new `AsyncMemo` wrapping `func`.
    ///
    /// `func` is only asked to *build* futures; it should return quickly and
    /// leave the real work to the future it produces. An `async move` block or
    /// a call to an `async fn` both fit naturally.
    ///
    /// # Examples
    ///
    /// ```
    /// use memito_async::AsyncMemo;
    ///
    /// let memo = AsyncMemo::new(|name: String| async move { name.len() });
    /// # let _ = memo;
    /// ```
    pub fn new(func: F) -> Self {
        Self {
            flights: DashMap::new(),
            func,
            #[cfg(feature = "stats")]
            stats: CacheStats::new(),
        }
    }

    /// Returns the shared flight for `key`, registering one if needed.
    ///
    /// If a flight already exists - still pending or long since resolved - a
    /// clone of it is returned and counts as a hit. Otherwise the wrapped
    /// function builds a new future, which is boxed, made shareable and
    /// stored before being returned; that counts as a miss.
    ///
    /// The returned future is lazy: the computation starts when some task
    /// first polls it, never inside this method. Dropping every clone of a
    /// still-unpolled flight means the computation simply never runs, though
    /// the flight stays registered and will run when the key is next awaited.
    ///
    /// # Examples
    ///
    /// ```
    /// use memito_async::AsyncMemo;
    ///
    /// # futures::executor::block_on(async {
    /// let memo = AsyncMemo::new(|n: u64| async move { n + 1 });
    ///
    /// let first = memo.flight(7);
    /// let second = memo.flight(7); // clone of the same flight
    ///
    /// assert_eq!(first.await, 8);
    /// assert_eq!(second.await, 8);
    /// # });
    /// ```
    pub fn flight(&self, key: K) -> SharedFuture<O> {
        match self.flights.entry(key) {
            Entry::Occupied(entry) => {
                #[cfg(feature = "stats")]
                self.stats.record_hit();

                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                #[cfg(feature = "stats")]
                self.stats.record_miss();

                // Building the future is cheap and non-blocking; it is not
                // polled until after the map guard is gone.
                let flight = (self.func)(entry.key().clone()).boxed().shared();
                entry.insert(flight).value().clone()
            }
        }
    }

    /// Computes or retrieves the output for `key`.
    ///
    /// Equivalent to awaiting [`flight`](Self::flight). Concurrent callers on
    /// the same key share a single execution of the wrapped function; callers
    /// arriving after it resolved get the cached output immediately.
    ///
    /// # Examples
    ///
    /// ```
    /// use memito_async::AsyncMemo;
    ///
    /// # futures::executor::block_on(async {
    /// let memo = AsyncMemo::new(|s: String| async move { s.to_uppercase() });
    ///
    /// assert_eq!(memo.call("tokio".to_string()).await, "TOKIO");
    /// # });
    /// ```
    pub async fn call(&self, key: K) -> O {
        self.flight(key).await
    }
}

impl<K, V, E, F, Fut> AsyncMemo<K, Result<V, E>, F>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    F: Fn(K) -> Fut,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
{
    /// Computes or retrieves a fallible output, caching only `Ok` values.
    ///
    /// Tasks that were awaiting a flight when it failed all receive the same
    /// `Err`, but the failed flight is then dropped from the map so the next
    /// call rebuilds and retries the computation. Successful flights are kept
    /// exactly like with [`call`](Self::call).
    ///
    /// A flight is only removed while it still holds an error, so a pending or
    /// successful retry registered in the meantime is never discarded.
    ///
    /// # Examples
    ///
    /// ```
    /// use memito_async::AsyncMemo;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use std::sync::Arc;
    ///
    /// # futures::executor::block_on(async {
    /// let attempts = Arc::new(AtomicUsize::new(0));
    /// let tries = Arc::clone(&attempts);
    ///
    /// let memo = AsyncMemo::new(move |n: i32| {
    ///     let tries = Arc::clone(&tries);
    ///     async move {
    ///         tries.fetch_add(1, Ordering::SeqCst);
    ///         if n < 0 {
    ///             Err("negative input")
    ///         } else {
    ///             Ok(n * 2)
    ///         }
    ///     }
    /// });
    ///
    /// // Failures are returned but never cached
    /// assert_eq!(memo.call_result(-1).await, Err("negative input"));
    /// assert_eq!(memo.call_result(-1).await, Err("negative input"));
    /// assert_eq!(attempts.load(Ordering::SeqCst), 2);
    ///
    /// // Successes are cached as usual
    /// assert_eq!(memo.call_result(21).await, Ok(42));
    /// assert_eq!(memo.call_result(21).await, Ok(42));
    /// assert_eq!(attempts.load(Ordering::SeqCst), 3);
    /// # });
    /// ```
    pub async fn call_result(&self, key: K) -> Result<V, E> {
        let outcome = self.flight(key.clone()).await;

        if outcome.is_err()
            && self
                .flights
                .remove_if(&key, |_, flight| matches!(flight.peek(), Some(Err(_))))
                .is_some()
        {
            #[cfg(feature = "stats")]
            self.stats.record_eviction();
        }

        outcome
    }
}

impl<K: Eq + Hash, O, F> AsyncMemo<K, O, F> {
    /// Returns the number of registered flights, pending and resolved alike.
    pub fn len(&self) -> usize {
        self.flights.len()
    }

    /// Returns `true` if no flight has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// Returns a reference to the cache statistics.
    ///
    /// A hit is recorded whenever a caller joins an existing flight, even one
    /// that has not resolved yet; a miss is recorded when a flight is first
    /// registered. Evictions count failed flights discarded by
    /// [`call_result`](Self::call_result).
    ///
    /// This method is only available when the `stats` feature is enabled.
    ///
    /// # Examples
    ///
    /// ```
    /// use memito_async::AsyncMemo;
    ///
    /// # futures::executor::block_on(async {
    /// let memo = AsyncMemo::new(|n: u32| async move { n });
    ///
    /// memo.call(1).await;
    /// memo.call(1).await;
    ///
    /// assert_eq!(memo.stats().misses(), 1);
    /// assert_eq!(memo.stats().hits(), 1);
    /// # });
    /// ```
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

/// Wraps an async function so that each key is computed at most once at a
/// time, with concurrent callers awaiting the same flight.
///
/// The returned closure hands back the key's [`SharedFuture`]; awaiting it
/// yields the output. This is the function-shaped spelling of [`AsyncMemo`]
/// for callers that do not need the struct API.
///
/// # Examples
///
/// ```
/// use memito_async::memoize_lazy_async;
///
/// # futures::executor::block_on(async {
/// let cached = memoize_lazy_async(|n: u32| async move { n * 10 });
///
/// assert_eq!(cached(3).await, 30);
/// assert_eq!(cached(3).await, 30);
/// # });
/// ```
pub fn memoize_lazy_async<K, O, F, Fut>(func: F) -> impl Fn(K) -> SharedFuture<O>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    O: Clone + Send + Sync + 'static,
    F: Fn(K) -> Fut,
    Fut: Future<Output = O> + Send + 'static,
{
    let memo = AsyncMemo::new(func);
    move |key| memo.flight(key)
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::memoize_lazy_async;
    pub use crate::AsyncMemo;
    pub use crate::SharedFuture;
    #[cfg(feature = "stats")]
    pub use crate::CacheStats;
}
