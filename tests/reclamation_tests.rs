// Entry lifetime in the weak variant: values live while handles exist and
// are recomputed after the last handle is dropped.

use memito::{WeakMemo, WeakStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_entry_survives_while_any_handle_lives() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let memo = WeakMemo::new(move |n: u32| {
        counter.fetch_add(1, Ordering::SeqCst);
        vec![n; 3]
    });

    let first = memo.call(1);
    let second = memo.call(1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    drop(first);

    // One handle is still alive, so the entry must survive
    let third = memo.call(1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(*third, vec![1, 1, 1]);

    drop(second);
    drop(third);
    assert!(memo.is_empty());
}

#[test]
fn test_last_drop_triggers_recomputation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let memo = WeakMemo::new(move |n: u32| {
        counter.fetch_add(1, Ordering::SeqCst);
        n * 10
    });

    let handle = memo.call(4);
    assert_eq!(*handle, 40);
    drop(handle);

    let handle = memo.call(4);
    assert_eq!(*handle, 40);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_weak_store_tracks_live_entries() {
    let store: WeakStore<String, u64> = WeakStore::new();
    assert!(store.try_get(&"a".to_string()).is_none());

    let a = store.get_or_add("a".to_string(), |_| 1);
    let b = store.get_or_add("b".to_string(), |_| 2);
    assert_eq!(store.len(), 2);
    assert_eq!(*store.try_get(&"a".to_string()).unwrap(), 1);

    drop(a);
    assert!(store.try_get(&"a".to_string()).is_none());

    assert_eq!(*b, 2);
    drop(b);
    assert!(store.is_empty());
}

#[test]
fn test_removed_entry_recomputes_but_old_handles_survive() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let memo = WeakMemo::new(move |n: u32| {
        counter.fetch_add(1, Ordering::SeqCst);
        n + 100
    });

    let old = memo.call(1);
    assert!(memo.store().remove(&1));

    let fresh = memo.call(1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(*old, 101);
    assert_eq!(*fresh, 101);

    // Dropping the stale handle must not disturb the fresh entry
    drop(old);
    assert_eq!(memo.len(), 1);

    drop(fresh);
    assert!(memo.is_empty());
}

#[test]
fn test_handle_outlives_memoizer() {
    let memo = WeakMemo::new(|n: u32| n * n);
    let handle = memo.call(4);

    drop(memo);

    // The handle owns the value; the memoizer only tracked it.
    assert_eq!(*handle, 16);

    // Dropping the last handle after the memoizer is gone finds no store
    // left to prune and must do nothing.
    drop(handle);
}

#[cfg(feature = "stats")]
#[test]
fn test_reclaims_show_up_in_eviction_stats() {
    let memo = WeakMemo::new(|n: i32| n);

    let h1 = memo.call(1);
    let h2 = memo.call(2);
    drop(h1);
    drop(h2);

    let h3 = memo.call(1);
    assert_eq!(memo.stats().evictions(), 2);
    assert_eq!(memo.stats().misses(), 3);
    assert_eq!(memo.stats().hits(), 0);

    drop(h3);
    assert_eq!(memo.stats().evictions(), 3);
}
