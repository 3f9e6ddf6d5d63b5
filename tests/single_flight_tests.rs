// Single-flight guarantees: when several threads request the same key at
// once, one computation runs and every caller shares its result.

use memito::{memoize_weak, LazyMemo, WeakMemo};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_lazy_contenders_share_one_computation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let memo = LazyMemo::new(move |n: u64| {
        counter.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        n + 1
    });
    let barrier = Barrier::new(8);

    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                barrier.wait();
                assert_eq!(memo.call(10), 11);
            });
        }
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_weak_contenders_share_one_computation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let expensive = memoize_weak(move |n: u64| {
        counter.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        n * 7
    });
    let barrier = Barrier::new(8);

    thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let expensive = &expensive;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    expensive(6)
                })
            })
            .collect();

        // Collect every handle before dropping any, so the entry cannot be
        // reclaimed while a late thread is still looking it up
        let handles: Vec<_> = workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .collect();

        for handle in &handles {
            assert_eq!(**handle, 42);
        }
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_threads_with_duplicate_keys_compute_each_key_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let square = memoize_weak(move |n: i32| {
        counter.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(40));
        n * n
    });
    let barrier = Barrier::new(3);

    let results: Vec<i32> = thread::scope(|scope| {
        let workers: Vec<_> = [3, 3, 4]
            .into_iter()
            .map(|key| {
                let square = &square;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    square(key)
                })
            })
            .collect();

        let handles: Vec<_> = workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .collect();

        handles.iter().map(|handle| **handle).collect()
    });

    // Two distinct keys were requested by three threads
    assert_eq!(results, vec![9, 9, 16]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_distinct_keys_never_block_each_other() {
    let memo = LazyMemo::new(|n: u64| {
        if n == 0 {
            // One key is deliberately slow
            thread::sleep(Duration::from_millis(200));
        }
        n * 2
    });

    thread::scope(|scope| {
        // Start the slow computation first
        let slow = scope.spawn(|| memo.call(0));

        // Give it time to claim its cell
        thread::sleep(Duration::from_millis(20));

        // An unrelated key must complete well before the slow one finishes
        let start = Instant::now();
        assert_eq!(memo.call(1), 2);
        let fast_elapsed = start.elapsed();

        assert_eq!(slow.join().unwrap(), 0);
        assert!(
            fast_elapsed < Duration::from_millis(100),
            "independent key waited {fast_elapsed:?} behind an unrelated computation"
        );
    });
}

#[test]
fn test_weak_distinct_keys_never_block_each_other() {
    let memo = WeakMemo::new(|n: u64| {
        if n == 0 {
            // One key is deliberately slow
            thread::sleep(Duration::from_millis(200));
        }
        n * 2
    });

    thread::scope(|scope| {
        // Start the slow computation first; returning the handle keeps the
        // entry alive until the join
        let slow = scope.spawn(|| memo.call(0));

        // Give it time to take its token
        thread::sleep(Duration::from_millis(20));

        // An unrelated key gets its own token and must not queue behind
        // the slow one
        let start = Instant::now();
        let fast = memo.call(1);
        let fast_elapsed = start.elapsed();

        assert_eq!(*fast, 2);
        assert_eq!(*slow.join().unwrap(), 0);
        assert!(
            fast_elapsed < Duration::from_millis(100),
            "independent key waited {fast_elapsed:?} behind an unrelated computation"
        );
    });
}
