//! Demonstrates the synchronous memoization variants on one running example:
//! caching integer squares.

use memito::{memoize, memoize_thread_safe, EagerMemo};
use std::cell::Cell;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

fn main() {
    println!("=== Square Cache Example ===\n");

    // Example 1: the closure API
    println!("--- memoize: closure API ---");
    let calls = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&calls);
    let square = memoize(move |n: i64| {
        counter.set(counter.get() + 1);
        println!("  computing {}^2", n);
        thread::sleep(Duration::from_millis(50));
        n * n
    });

    for key in [3, 3, 4, 3, 4] {
        let start = Instant::now();
        let value = square(key);
        println!("square({}) = {} ({:?})", key, value, start.elapsed());
    }
    println!("computed {} times for 5 calls\n", calls.get());

    // Example 2: the struct API with statistics
    println!("--- EagerMemo: struct API ---");
    let memo = EagerMemo::new(|n: i64| n * n);
    for key in [2, 2, 5, 5, 5, 8] {
        memo.call(key);
    }
    println!("distinct keys cached: {}", memo.len());

    #[cfg(feature = "stats")]
    {
        let stats = memo.stats();
        println!("\n📊 Cache statistics:");
        println!("  Total accesses: {}", stats.total_accesses());
        println!("  Hits:           {}", stats.hits());
        println!("  Misses:         {}", stats.misses());
        println!("  Hit rate:       {:.2}%", stats.hit_rate() * 100.0);
    }

    // Example 3: one closure shared by several threads
    println!("\n--- memoize_thread_safe: shared across threads ---");
    let shared_square = memoize_thread_safe(|n: i64| {
        println!("  thread {:?} computing {}^2", thread::current().id(), n);
        n * n
    });

    thread::scope(|scope| {
        for chunk in [[1, 2], [2, 3], [3, 1]] {
            let shared_square = &shared_square;
            scope.spawn(move || {
                for key in chunk {
                    let _ = shared_square(key);
                }
            });
        }
    });

    println!("\nDone.");
}
