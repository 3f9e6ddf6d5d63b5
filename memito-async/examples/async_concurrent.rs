//! # Concurrent Async Memoization Example
//!
//! Many tasks request the same keys at once. Each key gets a single shared
//! flight, so the expensive function runs exactly once per key no matter how
//! many tasks pile onto it - no thundering herd.

use memito_async::AsyncMemo;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

#[tokio::main]
async fn main() {
    println!("=== Concurrent Async Memoization Example ===\n");

    let executions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&executions);

    let memo = Arc::new(AsyncMemo::new(move |n: u32| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            println!(
                "Computing fibonacci({}) on thread {:?}",
                n,
                std::thread::current().id()
            );

            // Simulate expensive async work
            tokio::time::sleep(Duration::from_millis(100)).await;

            let mut a = 0u64;
            let mut b = 1u64;
            for _ in 0..n {
                let next = a + b;
                a = b;
                b = next;
            }
            b
        }
    }));

    println!("Spawning 10 tasks (each asking for fib(20) and fib(25))...\n");

    let mut tasks = JoinSet::new();
    for i in 0..10 {
        let memo = Arc::clone(&memo);
        tasks.spawn(async move {
            let fib20 = memo.call(20).await;
            let fib25 = memo.call(25).await;
            println!("Task {} finished: fib(20)={}, fib(25)={}", i, fib20, fib25);
            (fib20, fib25)
        });
    }

    let mut results = Vec::new();
    while let Some(result) = tasks.join_next().await {
        results.push(result.unwrap());
    }

    let executed = executions.load(Ordering::SeqCst);

    println!("\n--- Results ---");
    println!("Total tasks: 10");
    println!("Requests issued: 20");
    println!("Function executions: {}", executed);

    let first = results[0];
    for result in &results {
        assert_eq!(*result, first);
    }
    assert_eq!(
        executed, 2,
        "shared flights should collapse 20 requests into 2 executions"
    );

    println!("\n✅ Concurrent async memoization PASSED");
    println!("   20 requests collapsed into {} executions", executed);
}
