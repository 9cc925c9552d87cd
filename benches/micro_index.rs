//! Micro benchmarks for the in-memory ordered index.
#![forbid(unsafe_code)]
#![allow(missing_docs)]

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use larder::{AttrValue, OrderedIndex};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const INSERT_COUNT: u64 = 32_768;
const SEARCH_SAMPLES: usize = 1_024;

fn build(branching_factor: usize, keys: &[f64]) -> OrderedIndex<AttrValue, u64> {
    let mut tree = OrderedIndex::new(branching_factor).expect("valid branching factor");
    for (idx, key) in keys.iter().enumerate() {
        tree.insert(AttrValue(*key), idx as u64);
    }
    tree
}

fn micro_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("micro/index");
    group.sample_size(30);

    let sequential: Vec<f64> = (0..INSERT_COUNT).map(|k| k as f64).collect();
    let mut shuffled = sequential.clone();
    shuffled.shuffle(&mut ChaCha8Rng::seed_from_u64(0xBEEF_F00D));

    for branching_factor in [3usize, 16, 64] {
        group.throughput(Throughput::Elements(INSERT_COUNT));
        group.bench_with_input(
            BenchmarkId::new("sequential_insert", branching_factor),
            &branching_factor,
            |b, &m| {
                b.iter_batched(
                    || sequential.clone(),
                    |keys| black_box(build(m, &keys).height()),
                    BatchSize::LargeInput,
                );
            },
        );
        group.bench_with_input(
            BenchmarkId::new("random_insert", branching_factor),
            &branching_factor,
            |b, &m| {
                b.iter_batched(
                    || shuffled.clone(),
                    |keys| black_box(build(m, &keys).height()),
                    BatchSize::LargeInput,
                );
            },
        );
    }

    let tree = build(16, &shuffled);
    let mut rng = ChaCha8Rng::seed_from_u64(0x5EED);
    let bounds: Vec<AttrValue> = (0..SEARCH_SAMPLES)
        .map(|_| AttrValue(rng.gen_range(0..INSERT_COUNT) as f64))
        .collect();
    group.throughput(Throughput::Elements(SEARCH_SAMPLES as u64));
    for op in ["==", "<=", ">="] {
        group.bench_function(BenchmarkId::new("range_search", op), |b| {
            b.iter(|| {
                let mut total = 0usize;
                for bound in &bounds {
                    total += tree.range_search(bound, op).len();
                }
                black_box(total)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, micro_index);
criterion_main!(benches);
