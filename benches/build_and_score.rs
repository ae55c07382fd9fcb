use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rrcf::rng::RrcfRng;
use rrcf::RcTree;

fn random_points(n: usize, d: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = RrcfRng::new(seed);
    (0..n).map(|_| (0..d).map(|_| rng.uniform(-10.0, 10.0)).collect()).collect()
}

fn bench_build(c: &mut Criterion) {
    let data = random_points(1000, 6, 1);
    c.bench_function("rctree_build_1000x6", |b| {
        b.iter(|| black_box(RcTree::build(black_box(&data), None, 9, 1)))
    });
}

fn bench_insert_forget(c: &mut Criterion) {
    let data = random_points(500, 6, 2);
    let tree = RcTree::build(&data, None, 9, 3);

    c.bench_function("rctree_insert_forget_cycle", |b| {
        b.iter_batched(
            || tree.clone(),
            |mut tree| {
                tree.insert(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 500, 0.0).unwrap();
                tree.forget(500).unwrap();
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_codisp(c: &mut Criterion) {
    let data = random_points(800, 4, 4);
    let tree = RcTree::build(&data, None, 9, 5);
    c.bench_function("rctree_codisp_all", |b| {
        b.iter(|| {
            for index in 0..800 {
                black_box(tree.codisp(index).unwrap());
            }
        })
    });
}

criterion_group!(benches, bench_build, bench_insert_forget, bench_codisp);
criterion_main!(benches);
