//! Benchmarks for noise sampling and the particle step.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use prismfield::noise::NoiseField;
use prismfield::simulation::{initialize, ParticleField, StepParams};

fn bench_noise_sample(c: &mut Criterion) {
    let field = NoiseField::new(42);

    c.bench_function("noise_sample_1000", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            for i in 0..1000 {
                let t = i as f32 * 0.013;
                sum += field.sample(black_box(t), t * 0.7, -t);
            }
            black_box(sum)
        });
    });
}

fn bench_initialize(c: &mut Criterion) {
    c.bench_function("initialize_3000", |b| {
        b.iter(|| black_box(initialize(black_box(3000), 7.5, 0.01, 7)));
    });
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("Particle Step");

    for count in [1000usize, 3000, 10000] {
        let mut field = ParticleField::seeded(count, 7.5, 0.01, 7, StepParams::default())
            .expect("valid field");
        let mut frame = 0u32;

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                frame += 1;
                field.step(black_box(frame as f32 / 60.0)).expect("finite step");
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_noise_sample, bench_initialize, bench_step);
criterion_main!(benches);
