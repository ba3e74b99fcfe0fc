use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use cake_cutter_core::prelude::*;

fn generate_images(count: usize, min_size: u32, max_size: u32) -> Vec<(String, Shape)> {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| {
            let w = rng.gen_range(min_size..=max_size);
            let h = rng.gen_range(min_size..=max_size);
            (format!("img_{}", i), Shape::new(w, h))
        })
        .collect()
}

fn bench_arrange(c: &mut Criterion) {
    let mut group = c.benchmark_group("arrange");

    for count in [10usize, 100, 1000] {
        let images = generate_images(count, 200, 1200);
        group.throughput(Throughput::Elements(count as u64));

        for (name, cfg) in [
            (
                "c256_p0",
                CutterConfig::builder().container(256, 256).build(),
            ),
            (
                "c256_p16",
                CutterConfig::builder().container(256, 256).padding(16, 16).build(),
            ),
            (
                "c512x384_p8",
                CutterConfig::builder().container(512, 384).padding(8, 8).build(),
            ),
        ] {
            group.bench_with_input(BenchmarkId::new(name, count), &images, |b, images| {
                b.iter(|| {
                    let out = arrange(images.iter().map(|(k, s)| (k, *s)), &cfg);
                    black_box(out)
                });
            });
        }
    }
    group.finish();
}

fn bench_pop_at_most(c: &mut Criterion) {
    let strips: Vec<(usize, Rect)> = (0..10_000)
        .map(|i| (i, Rect::new(0, 0, 512, 1 + (i as u32 * 37) % 500)))
        .collect();
    c.bench_function("sorted_pool_drain", |b| {
        b.iter(|| {
            let mut pool = SortedPool::new(strips.clone(), |r| r.height);
            let mut n = 0usize;
            while !pool.is_empty() {
                let mut room = 512u32;
                while let Some((_, r)) = pool.pop_at_most(room) {
                    room -= r.height;
                    n += 1;
                }
            }
            black_box(n)
        });
    });
}

criterion_group!(benches, bench_arrange, bench_pop_at_most);
criterion_main!(benches);
