//! Benchmark: Tree building vs proof generation and verification
//!
//! Building hashes every leaf twice and every internal node once, so it is
//! O(n log n) with the sort. Proofs and verification walk a single path.
//! Run with `--features parallel` to compare rayon level hashing.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use standard_merkle_tree::{
    verify, Address, Keccak256Hasher, LeafEncoding, LeafValue, Record, StandardMerkleTree,
};

fn generate_records(count: usize) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    (0..count)
        .map(|_| vec![LeafValue::from(Address::from(rng.gen::<[u8; 20]>()))])
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for count in [1_000, 10_000, 100_000] {
        let records = generate_records(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &records, |b, records| {
            b.iter_batched(
                || records.clone(),
                |records| {
                    black_box(
                        StandardMerkleTree::of(records, LeafEncoding::address())
                            .unwrap()
                            .root(),
                    )
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

fn bench_prove_and_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("proof");

    for count in [1_000, 100_000] {
        let tree = StandardMerkleTree::of(generate_records(count), LeafEncoding::address()).unwrap();
        let target = tree.value(count / 2).unwrap().clone();
        let proof = tree.proof_by_value(&target).unwrap();
        let root = tree.root();

        group.bench_with_input(BenchmarkId::new("prove_by_value", count), &tree, |b, tree| {
            b.iter(|| black_box(tree.proof_by_value(&target).unwrap()))
        });

        group.bench_with_input(BenchmarkId::new("verify", count), &proof, |b, proof| {
            b.iter(|| {
                black_box(verify(
                    &Keccak256Hasher,
                    &LeafEncoding::address(),
                    &target,
                    proof,
                    &root,
                ))
            })
        });

        group.bench_with_input(BenchmarkId::new("load", count), &tree.dump(), |b, document| {
            b.iter(|| black_box(StandardMerkleTree::load(document).unwrap().root()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_prove_and_verify);
criterion_main!(benches);
