// Error handling for fallible async computations: Err outcomes reach every
// waiter unchanged but are never cached.
use memito_async::AsyncMemo;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_errors_are_returned_but_not_cached() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let memo = AsyncMemo::new(move |n: i32| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            if n < 0 {
                Err(format!("cannot process {n}"))
            } else {
                Ok(n * 2)
            }
        }
    });

    assert_eq!(
        memo.call_result(-3).await,
        Err("cannot process -3".to_string())
    );
    assert_eq!(
        memo.call_result(-3).await,
        Err("cannot process -3".to_string())
    );
    // Each failure re-ran the function
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    // Nothing was retained for the failing key
    assert!(memo.is_empty());

    assert_eq!(memo.call_result(4).await, Ok(8));
    assert_eq!(memo.call_result(4).await, Ok(8));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert_eq!(memo.len(), 1);
}

#[tokio::test]
async fn test_success_after_failure_is_cached() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    // Fails on the first attempt, succeeds afterwards
    let memo = AsyncMemo::new(move |n: u32| {
        let counter = Arc::clone(&counter);
        async move {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err("transient outage")
            } else {
                Ok(n + 1)
            }
        }
    });

    assert_eq!(memo.call_result(10).await, Err("transient outage"));
    assert_eq!(memo.call_result(10).await, Ok(11));
    assert_eq!(memo.call_result(10).await, Ok(11));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_concurrent_waiters_observe_the_same_failure() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let memo = Arc::new(AsyncMemo::new(move |n: u32| {
        let counter = Arc::clone(&counter);
        async move {
            let attempt = counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(40)).await;
            if attempt == 0 {
                Err(format!("attempt {attempt} failed"))
            } else {
                Ok(n * 100)
            }
        }
    }));

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let memo = Arc::clone(&memo);
            tokio::spawn(async move { memo.call_result(7).await })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap(), Err("attempt 0 failed".to_string()));
    }
    // All four waiters shared a single failing execution
    assert_eq!(attempts.load(Ordering::SeqCst), 1);

    // A later call retries with a fresh flight
    assert_eq!(memo.call_result(7).await, Ok(700));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_key_does_not_pin_map_entries() {
    let memo = AsyncMemo::new(|n: i64| async move {
        if n % 2 == 0 {
            Ok(n / 2)
        } else {
            Err("odd input")
        }
    });

    assert_eq!(memo.call_result(8).await, Ok(4));
    assert_eq!(memo.call_result(9).await, Err("odd input"));

    // Only the successful flight is retained
    assert_eq!(memo.len(), 1);
}

#[cfg(feature = "stats")]
#[tokio::test]
async fn test_stats_count_discarded_failures_as_evictions() {
    let memo = AsyncMemo::new(|n: i32| async move {
        if n < 0 {
            Err("negative")
        } else {
            Ok(n)
        }
    });

    memo.call_result(-1).await.unwrap_err();
    memo.call_result(-1).await.unwrap_err();
    memo.call_result(3).await.unwrap();

    assert_eq!(memo.stats().misses(), 3);
    assert_eq!(memo.stats().hits(), 0);
    assert_eq!(memo.stats().evictions(), 2);
}
