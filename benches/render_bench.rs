//! Benchmarks for frame rendering and compositing.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use prismfield::gpu::GpuSceneRenderer;
use prismfield::postprocess::{frame, Compositor, PostProcessConfig};
use prismfield::scene::{SceneOrchestrator, Viewport};
use prismfield::SceneConfig;

fn bench_config() -> SceneConfig {
    SceneConfig {
        seed: Some(1),
        ..Default::default()
    }
}

fn bench_gpu_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("GPU Rendering");

    let viewport = Viewport::new(1920, 1080);
    let config = bench_config();
    let renderer = match pollster::block_on(GpuSceneRenderer::new(viewport, config.post_process())) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Skipping GPU benchmarks: {}", e);
            return;
        }
    };
    let mut scene = SceneOrchestrator::new(config, Box::new(renderer)).expect("valid scene");
    let mut frame = 0u32;

    group.bench_function("tick_1080p", |b| {
        b.iter(|| {
            frame += 1;
            black_box(scene.tick(frame as f32 / 60.0));
        });
    });

    group.finish();
}

fn bench_software_resolutions(c: &mut Criterion) {
    let mut group = c.benchmark_group("Software Resolution Scaling");
    group.sample_size(10);

    let resolutions = [(320, 180, "180p"), (640, 360, "360p"), (1280, 720, "720p")];

    for (width, height, name) in resolutions {
        let mut scene =
            SceneOrchestrator::with_software_renderer(bench_config(), Viewport::new(width, height))
                .expect("valid scene");
        let mut frame = 0u32;

        group.bench_function(BenchmarkId::new("tick", name), |b| {
            b.iter(|| {
                frame += 1;
                black_box(scene.tick(frame as f32 / 60.0));
            });
        });
    }

    group.finish();
}

fn bench_compositor(c: &mut Criterion) {
    let mut group = c.benchmark_group("Compositor");
    group.sample_size(10);

    let input = frame::solid(640, 360, [0.7, 0.5, 1.0]);
    let configs = [
        ("passthrough", PostProcessConfig::passthrough()),
        ("bloom_and_aberration", PostProcessConfig::default()),
    ];

    for (name, config) in configs {
        let compositor = Compositor::new(config);
        group.bench_with_input(BenchmarkId::new("apply_360p", name), &compositor, |b, compositor| {
            b.iter(|| black_box(compositor.apply(&input)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_gpu_tick, bench_software_resolutions, bench_compositor);
criterion_main!(benches);
