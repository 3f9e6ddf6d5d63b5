//! Demonstrates the weak-handle variant: concurrent callers share one
//! computation per key, and an entry vanishes when its last handle drops.

use memito::memoize_weak;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn main() {
    println!("=== Weak Single-Flight Example ===\n");

    let computations = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&computations);
    let load_report = memoize_weak(move |day: String| {
        counter.fetch_add(1, Ordering::SeqCst);
        println!("  building report for {day}...");
        thread::sleep(Duration::from_millis(100));
        format!("report[{day}]")
    });

    println!("--- three concurrent requests, two distinct keys ---");
    let barrier = Barrier::new(3);
    let days = ["monday", "monday", "tuesday"];

    thread::scope(|scope| {
        let workers: Vec<_> = days
            .into_iter()
            .map(|day| {
                let load_report = &load_report;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    load_report(day.to_string())
                })
            })
            .collect();

        // Keep every handle alive until all results are printed, so the
        // entries cannot be reclaimed between the joins.
        let handles: Vec<_> = workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .collect();

        for (day, handle) in days.iter().zip(&handles) {
            println!("{} -> {}", day, **handle);
        }

        println!(
            "\n3 requests, {} computations",
            computations.load(Ordering::SeqCst)
        );
    });

    // The scope dropped every handle, so both entries are gone by now.
    println!("\n--- after all handles dropped ---");
    let monday = load_report("monday".to_string());
    println!("monday again -> {}", *monday);
    println!(
        "total computations: {} (the entry was reclaimed and rebuilt)",
        computations.load(Ordering::SeqCst)
    );
}
