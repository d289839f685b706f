use flatlru::policy::{LruCache, SieveCache};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A hot set read repeatedly, interleaved with a one-pass scan.
fn scan_workload(len: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut scan = 1_000_000u64;
    (0..len)
        .map(|_| {
            if rng.gen_bool(0.3) {
                scan += 1;
                scan
            } else {
                rng.gen_range(0..512)
            }
        })
        .collect()
}

fn bench_sieve_vs_lru(c: &mut Criterion) {
    let workload = scan_workload(20_000);
    let mut group = c.benchmark_group("scan_resistance");
    group.throughput(Throughput::Elements(workload.len() as u64));

    group.bench_with_input(BenchmarkId::new("sieve", 1024), &workload, |b, keys| {
        b.iter(|| {
            let mut cache = SieveCache::new(1024).unwrap();
            let mut hits = 0u64;
            for &k in keys {
                if cache.get(&k).is_some() {
                    hits += 1;
                } else {
                    cache.set(k, k);
                }
            }
            std::hint::black_box(hits)
        })
    });
    group.bench_with_input(BenchmarkId::new("lru", 1024), &workload, |b, keys| {
        b.iter(|| {
            let mut cache = LruCache::new(1024).unwrap();
            let mut hits = 0u64;
            for &k in keys {
                if cache.get(&k).is_some() {
                    hits += 1;
                } else {
                    cache.set(k, k);
                }
            }
            std::hint::black_box(hits)
        })
    });
    group.finish();
}

fn bench_sieve_all_visited(c: &mut Criterion) {
    c.bench_function("sieve_full_hand_sweep", |b| {
        b.iter(|| {
            let mut cache = SieveCache::new(1024).unwrap();
            for i in 0..1024u64 {
                cache.set(i, i);
                cache.get(&i);
            }
            // First insert clears every bit before finding a victim.
            cache.set(std::hint::black_box(5_000u64), 0);
            std::hint::black_box(cache.len())
        })
    });
}

criterion_group!(benches, bench_sieve_vs_lru, bench_sieve_all_visited);
criterion_main!(benches);
