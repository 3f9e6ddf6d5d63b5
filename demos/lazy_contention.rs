//! Demonstrates the lazy variant under contention: eight threads request the
//! same key together and wait on one computation instead of racing it.

use memito::LazyMemo;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

fn main() {
    println!("=== Lazy Contention Example ===\n");

    let computations = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&computations);
    let memo = LazyMemo::new(move |n: u64| {
        counter.fetch_add(1, Ordering::SeqCst);
        println!("  thread {:?} computing fib({})", thread::current().id(), n);
        thread::sleep(Duration::from_millis(150));
        let mut a = 0u64;
        let mut b = 1u64;
        for _ in 0..n {
            let next = a + b;
            a = b;
            b = next;
        }
        b
    });

    println!("8 threads requesting fib(30) at once:\n");
    let barrier = Barrier::new(8);

    thread::scope(|scope| {
        for worker in 0..8 {
            let memo = &memo;
            let barrier = &barrier;
            scope.spawn(move || {
                barrier.wait();
                let start = Instant::now();
                let value = memo.call(30);
                println!(
                    "worker {} got fib(30) = {} after {:?}",
                    worker,
                    value,
                    start.elapsed()
                );
            });
        }
    });

    println!(
        "\n8 requests, {} computation(s)",
        computations.load(Ordering::SeqCst)
    );

    // A second round is answered straight from the cache.
    let start = Instant::now();
    let value = memo.call(30);
    println!("one more call: fib(30) = {} in {:?}", value, start.elapsed());

    #[cfg(feature = "stats")]
    {
        let stats = memo.stats();
        println!("\n📊 Cache statistics:");
        println!("  Hits:   {}", stats.hits());
        println!("  Misses: {}", stats.misses());
    }
}
