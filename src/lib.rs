//! # Memito
//!
//! A lightweight memoization library for Rust with single-flight concurrency
//! and weak-reference eviction.
//!
//! Every memoizer wraps a function and caches its outputs per input key. The
//! variants differ in how they behave when several callers want the same key
//! at once, and in how long cached values live:
//!
//! - **Eager** ([`EagerMemo`] / [`memoize`]): single-threaded, zero locking.
//! - **Thread-safe** ([`SharedMemo`] / [`memoize_thread_safe`]): lock-free
//!   concurrent map; racing computations are tolerated, the first finished
//!   value wins.
//! - **Lazy** ([`LazyMemo`] / [`memoize_lazy_thread_safe`]): per-key
//!   once-cells; contending threads block until the one computation finishes.
//! - **Weak** ([`WeakMemo`] / [`memoize_weak`]): callers receive [`Cached`]
//!   handles; when the last handle for a key is dropped, the entry is
//!   reclaimed and the next call recomputes.
//! - **Once** ([`memoize_once`]): a single keyless value, computed on first
//!   call.
//!
//! ## Features
//!
//! - **Single-flight**: the lazy and weak variants run one computation per
//!   key no matter how many threads ask for it
//! - **Error transparency**: `Err` outcomes propagate to the caller unchanged
//!   and are never cached, so the next call retries
//! - **Lifetime-driven eviction**: the weak variant frees entries exactly
//!   when the last user lets go, no sizes or timers to tune
//! - **Statistics**: hit/miss/eviction counters behind the `stats` feature
//!   (enabled by default)
//!
//! ## Quick Start
//!
//! ```rust
//! use memito::memoize;
//!
//! let square = memoize(|n: i32| n * n);
//!
//! assert_eq!(square(4), 16); // computed
//! assert_eq!(square(4), 16); // served from the cache
//! ```
//!
//! ## Thread-Safe Memoization
//!
//! [`memoize_thread_safe`] returns a closure that can be shared across
//! threads:
//!
//! ```rust
//! use memito::memoize_thread_safe;
//! use std::thread;
//!
//! let word_len = memoize_thread_safe(|s: String| s.len());
//!
//! thread::scope(|scope| {
//!     for _ in 0..4 {
//!         scope.spawn(|| assert_eq!(word_len("memoize".to_string()), 7));
//!     }
//! });
//! ```
//!
//! ## One Computation Per Key
//!
//! The lazy variant guarantees that contending threads share a single
//! execution instead of racing:
//!
//! ```rust
//! use memito::memoize_lazy_thread_safe;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let calls = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&calls);
//! let slow_double = memoize_lazy_thread_safe(move |n: u64| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//!     n * 2
//! });
//!
//! thread::scope(|scope| {
//!     for _ in 0..8 {
//!         scope.spawn(|| assert_eq!(slow_double(21), 42));
//!     }
//! });
//!
//! // All eight threads shared one computation
//! assert_eq!(calls.load(Ordering::SeqCst), 1);
//! ```
//!
//! ## Weak-Handle Caching
//!
//! [`memoize_weak`] hands out strong [`Cached`] handles while the cache
//! itself only keeps weak references. An entry lives exactly as long as
//! someone holds a handle to it:
//!
//! ```rust
//! use memito::memoize_weak;
//!
//! let load = memoize_weak(|id: u32| format!("record #{id}"));
//!
//! let first = load(7);
//! let again = load(7); // same entry, not recomputed
//! assert_eq!(*first, *again);
//!
//! drop(first);
//! drop(again); // last handle gone, entry reclaimed
//!
//! let fresh = load(7); // recomputed from scratch
//! assert_eq!(*fresh, "record #7");
//! ```
//!
//! ## Error Handling
//!
//! Fallible functions cache only `Ok` values; failures are returned to the
//! caller and forgotten:
//!
//! ```rust
//! use memito::SharedMemo;
//!
//! let parse = SharedMemo::new_result(|text: String| {
//!     text.parse::<i32>().map_err(|e| e.to_string())
//! });
//!
//! assert!(parse.call_result("oops".to_string()).is_err());
//! assert_eq!(parse.call_result("42".to_string()), Ok(42));
//! // The failure was not cached; only the parsed value is retained
//! assert_eq!(parse.len(), 1);
//! ```
//!
//! ## Building Blocks
//!
//! The pieces the weak variant is assembled from are exported as well:
//! [`WeakStore`] maps keys to weakly-held values and reclaims slots when the
//! last [`Cached`] handle drops, and [`LockRegistry`] hands out transient
//! per-key [`LockToken`]s for mutual exclusion during computation.
//!
//! ## Async
//!
//! Async single-flight memoization lives in the companion `memito-async`
//! crate, where concurrent tasks await clones of one shared future per key:
//!
//! ```ignore
//! use memito_async::AsyncMemo;
//!
//! let memo = AsyncMemo::new(|id: u64| async move { fetch_user(id).await });
//! let user = memo.call(42).await; // concurrent calls share one fetch
//! ```

pub use memito_core::*;
