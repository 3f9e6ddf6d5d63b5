//! # Memito Core
//!
//! Building blocks for function memoization with explicit concurrency
//! semantics.
//!
//! Every memoizer here wraps a function and answers repeated calls for the
//! same key from a cache. They differ in how they behave under concurrency
//! and in how long entries live:
//!
//! - [`EagerMemo`] / [`memoize`] - single-threaded, zero synchronization,
//!   entries live forever. `!Sync` by construction.
//! - [`SharedMemo`] / [`memoize_thread_safe`] - thread-safe, computes outside
//!   any lock; concurrent first calls may duplicate work, the first published
//!   value wins.
//! - [`LazyMemo`] / [`memoize_lazy_thread_safe`] - thread-safe, one lazy cell
//!   per key; a key is computed at most once and concurrent callers block on
//!   it.
//! - [`WeakMemo`] / [`memoize_weak`] - thread-safe single-flight memoization
//!   behind weak references: results live exactly as long as some caller
//!   holds a [`Cached`] handle, then the slot is reclaimed and the key
//!   recomputes on next use.
//! - [`memoize_once`] - the zero-argument special case.
//!
//! Fallible functions get `new_result`/`call_result` twins on each memoizer:
//! errors propagate unchanged and are never cached, so a failed key stays a
//! miss until a call succeeds.
//!
//! ## Module Organization
//!
//! - [`lock_registry`](LockRegistry) - transient per-key mutexes for
//!   single-flight coordination
//! - [`weak_store`](WeakStore) - concurrent weak-value map with drop-driven
//!   reclamation
//! - memoizer front-ends (`eager`, `shared`, `lazy`, `weak`, `once`)
//! - `stats` - per-memoizer hit/miss/eviction counters (`stats` feature,
//!   enabled by default)

mod eager;
mod lazy;
mod lock_registry;
mod once;
mod shared;
mod weak;
mod weak_store;

#[cfg(feature = "stats")]
mod stats;

pub use eager::{memoize, EagerMemo};
pub use lazy::{memoize_lazy_thread_safe, LazyMemo};
pub use lock_registry::{LockRegistry, LockToken};
pub use once::memoize_once;
pub use shared::{memoize_thread_safe, SharedMemo};
pub use weak::{memoize_weak, WeakMemo};
pub use weak_store::{Cached, WeakStore};

#[cfg(feature = "stats")]
pub use stats::CacheStats;
