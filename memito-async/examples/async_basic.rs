//! # Basic Async Memoization Example
//!
//! Demonstrates memoizing an async function: the first call per key runs the
//! computation, later calls are answered by the resolved flight.

use memito_async::AsyncMemo;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() {
    println!("=== Basic Async Memoization Example ===\n");

    let executions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&executions);

    let memo = AsyncMemo::new(move |(a, b): (u32, u32)| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            println!("Computing {} + {} (async)", a, b);
            tokio::time::sleep(Duration::from_millis(100)).await;
            a + b
        }
    });

    // Call 1: miss, runs the computation
    let start = Instant::now();
    let result = memo.call((1, 1)).await;
    println!("Call 1: (1, 1) -> {} (took {:?})", result, start.elapsed());

    // Call 2: hit, the resolved flight answers instantly
    let start = Instant::now();
    let result = memo.call((1, 1)).await;
    println!(
        "Call 2: (1, 1) -> {} (took {:?}) [should be instant]",
        result,
        start.elapsed()
    );

    // Call 3: miss, different key
    let start = Instant::now();
    let result = memo.call((2, 3)).await;
    println!("Call 3: (2, 3) -> {} (took {:?})", result, start.elapsed());

    // Call 4: hit
    let start = Instant::now();
    let result = memo.call((2, 3)).await;
    println!(
        "Call 4: (2, 3) -> {} (took {:?}) [should be instant]",
        result,
        start.elapsed()
    );

    let executed = executions.load(Ordering::SeqCst);
    println!("\n--- Results ---");
    println!("Total executions: {}", executed);
    println!("Expected: 2 executions (cached calls returned instantly)");

    assert_eq!(
        executed, 2,
        "Expected 2 function executions but got {}",
        executed
    );

    println!("\n✅ Basic async memoization PASSED");
    println!("   Function executed {} times instead of 4", executed);
}
