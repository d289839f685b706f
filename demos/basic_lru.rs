//! Tour of the flat-array caches: LRU, LRU with delete, and SIEVE.
//!
//! Run with: cargo run --example basic_lru

use flatlru::builder::{CacheBuilder, CachePolicy};
use flatlru::index::{DirectIndex, TreeIndex};
use flatlru::policy::{LruCache, LruCacheWithDelete, SieveCache};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== flatlru Examples ===\n");

    println!("1. LRU Cache");
    let mut lru = LruCache::new(3)?;
    lru.set(1, "one");
    lru.set(2, "two");
    lru.set(3, "three");

    // Access key 1 to make it MRU
    lru.get(&1);

    // Insert key 4, evicts LRU (key 2)
    lru.set(4, "four");
    println!("   contains 1? {} (was accessed)", lru.has(&1));
    println!("   contains 2? {} (evicted as LRU)", lru.has(&2));
    println!("   order (MRU first): {:?}", lru.keys().collect::<Vec<_>>());
    println!();

    println!("2. LRU Cache With Delete");
    let mut cache = LruCacheWithDelete::new(3)?;
    cache.set("a", 1);
    cache.set("b", 2);
    cache.set("c", 3);
    cache.delete(&"b");
    println!("   after delete: {:?}", cache);
    if let Some(record) = cache.setpop("d", 4) {
        println!("   unexpected displacement: {:?}", record);
    }
    if let Some(record) = cache.setpop("e", 5) {
        println!(
            "   setpop evicted {:?} -> {:?} (evicted: {})",
            record.key, record.value, record.evicted
        );
    }
    if let Some(record) = cache.setpop("e", 50) {
        println!(
            "   setpop replaced {:?} -> {:?} (evicted: {})",
            record.key, record.value, record.evicted
        );
    }
    println!();

    println!("3. SIEVE Cache");
    let mut sieve = SieveCache::new(3)?;
    sieve.set(1, "one");
    sieve.set(2, "two");
    sieve.set(3, "three");
    // A hit sets the visited bit; the hand skips visited entries once.
    sieve.get(&1);
    sieve.set(4, "four");
    println!("   contains 1? {} (visited, spared)", sieve.has(&1));
    println!("   contains 2? {} (first unvisited from the tail)", sieve.has(&2));
    println!();

    println!("4. Index strategies");
    let mut direct: LruCache<u16, &str, DirectIndex<u8>> =
        LruCache::with_index(4, DirectIndex::with_universe(256))?;
    direct.set(200, "direct");
    let mut tree: LruCache<String, usize, TreeIndex<u8>> = LruCache::indexed(4)?;
    tree.set("tree".to_string(), 1);
    println!("   direct: {:?}", direct);
    println!("   tree:   {:?}", tree);
    println!();

    println!("5. Builder");
    let mut built = CacheBuilder::new(2).build::<u64, String>(CachePolicy::Sieve)?;
    built.insert(1, "one".to_string());
    println!("   {:?} cache with {} entries", built.policy(), built.len());

    match LruCache::<u64, u64>::new(0) {
        Ok(_) => println!("   zero capacity accepted?"),
        Err(err) => println!("   zero capacity rejected: {err}"),
    }

    Ok(())
}
