//! Expiring LRU cache swept by a background monitor.
//!
//! Run with: cargo run --example expiring_monitor

use std::time::Duration;

use flatlru::clock::ManualClock;
use flatlru::monitor::{MonitorOptions, MonitoredCache};
use flatlru::policy::{ExpiringLruCache, ExpiryOptions};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Expiring Cache Example ===\n");

    // A manual clock keeps the demo deterministic; the default is SystemClock.
    let clock = ManualClock::new(0);
    let options = ExpiryOptions::new(Duration::from_millis(100)).with_clock(clock.clone());
    let mut cache = ExpiringLruCache::with_options(8, options)?;

    cache.set("session-a", 1)?;
    clock.set(60);
    cache.set("session-b", 2)?;
    clock.set(120);
    println!("1. Manual sweep at t=120ms (ttk 100ms)");
    println!("   expired {} entries", cache.expire()?);
    println!("   remaining: {:?}", cache.keys().collect::<Vec<_>>());
    println!();

    println!("2. Background monitor every 50ms");
    let monitored = MonitoredCache::new(cache);
    let options = MonitorOptions::new().on_expire(|cache, report| {
        if report.expired > 0 {
            println!(
                "   swept {} entries in {:?}, {} left",
                report.expired,
                report.elapsed,
                cache.len()
            );
        }
    });
    let handle = monitored.monitor(Duration::from_millis(50), options)?;

    clock.set(200);
    tokio::time::sleep(Duration::from_millis(120)).await;
    println!("   empty? {}", monitored.with(|c| c.is_empty()));

    monitored.stop_monitor();
    handle.join().await?;
    println!("   monitor stopped");

    Ok(())
}
