use flatlru::index::{DirectIndex, HashIndex, TreeIndex};
use flatlru::policy::{LruCache, LruCacheWithDelete};
use flatlru::traits::CoreCache;
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn filled(capacity: u64) -> LruCache<u64, u64> {
    let mut cache = LruCache::new(capacity as usize).unwrap();
    for i in 0..capacity {
        cache.set(i, i);
    }
    cache
}

fn bench_lru_insert_get(c: &mut Criterion) {
    c.bench_function("lru_insert_get", |b| {
        b.iter_batched(
            || filled(1024),
            |mut cache| {
                for i in 0..1024u64 {
                    cache.insert(std::hint::black_box(i + 10_000), i);
                    let _ = std::hint::black_box(cache.get(&std::hint::black_box(i)));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_lru_eviction_churn(c: &mut Criterion) {
    c.bench_function("lru_eviction_churn", |b| {
        b.iter_batched(
            || filled(1024),
            |mut cache| {
                for i in 0..4096u64 {
                    cache.set(std::hint::black_box(10_000 + i), i);
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_lru_touch_hotset(c: &mut Criterion) {
    c.bench_function("lru_touch_hotset", |b| {
        b.iter_batched(
            || filled(4096),
            |mut cache| {
                for i in 0..4096u64 {
                    let _ = std::hint::black_box(cache.touch(&std::hint::black_box(i)));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_lru_delete_refill(c: &mut Criterion) {
    c.bench_function("lru_delete_refill", |b| {
        b.iter_batched(
            || {
                let mut cache = LruCacheWithDelete::new(1024).unwrap();
                for i in 0..1024u64 {
                    cache.set(i, i);
                }
                cache
            },
            |mut cache| {
                for i in 0..1024u64 {
                    cache.delete(&std::hint::black_box(i));
                    cache.set(std::hint::black_box(i + 10_000), i);
                }
            },
            BatchSize::SmallInput,
        )
    });
}

/// Zipf-ish reads over a key space four times the capacity, per index.
fn bench_lru_index_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("lru_index");
    let mut rng = StdRng::seed_from_u64(7);
    let keys: Vec<u32> = (0..8192)
        .map(|_| {
            let r: f64 = rng.r#gen();
            (r * r * 4096.0) as u32
        })
        .collect();

    group.bench_with_input(BenchmarkId::new("hash", keys.len()), &keys, |b, keys| {
        b.iter(|| {
            let mut cache: LruCache<u32, u32, HashIndex<u32, u16>> =
                LruCache::indexed(1024).unwrap();
            for &k in keys {
                if cache.get(&k).is_none() {
                    cache.set(k, k);
                }
            }
            std::hint::black_box(cache.len())
        })
    });
    group.bench_with_input(BenchmarkId::new("direct", keys.len()), &keys, |b, keys| {
        b.iter(|| {
            let mut cache: LruCache<u32, u32, DirectIndex<u16>> =
                LruCache::with_index(1024, DirectIndex::with_universe(4096)).unwrap();
            for &k in keys {
                if cache.get(&k).is_none() {
                    cache.set(k, k);
                }
            }
            std::hint::black_box(cache.len())
        })
    });
    group.bench_with_input(BenchmarkId::new("tree", keys.len()), &keys, |b, keys| {
        b.iter(|| {
            let mut cache: LruCache<u32, u32, TreeIndex<u16>> = LruCache::indexed(1024).unwrap();
            for &k in keys {
                if cache.get(&k).is_none() {
                    cache.set(k, k);
                }
            }
            std::hint::black_box(cache.len())
        })
    });
    group.finish();
}

fn bench_lru_peek_ends(c: &mut Criterion) {
    let cache = filled(1024);
    c.bench_function("lru_peek_ends", |b| {
        b.iter(|| {
            std::hint::black_box(cache.peek_lru());
            std::hint::black_box(cache.peek_mru());
        })
    });
}

criterion_group!(
    benches,
    bench_lru_insert_get,
    bench_lru_eviction_churn,
    bench_lru_touch_hotset,
    bench_lru_delete_refill,
    bench_lru_index_strategies,
    bench_lru_peek_ends
);
criterion_main!(benches);
