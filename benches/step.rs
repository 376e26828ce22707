//! Benchmarks for the CPU step, curl evaluation and kernel generation.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec4;

use embers::curl::CurlField;
use embers::noise::Simplex4;
use embers::shader::{init_shader, update_shader};
use embers::{EmitterState, ParticleSystem, Preset, SimParams};

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_step");
    let emitter = EmitterState::default();
    let params = SimParams::default();

    for count in [1_000usize, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::new("magic_wand", count), &count, |b, &count| {
            let mut system = ParticleSystem::with_seed(count, 0);
            let mut time = 0.0f32;
            b.iter(|| {
                time += 1.0 / 60.0;
                black_box(system.step(1.0 / 60.0, time, &emitter, &params))
            })
        });
    }

    // No turbulence: isolates integration and attribute derivation
    let beam = Preset::BeamMeUp.config();
    group.bench_function("beam_me_up_10000", |b| {
        let mut system = ParticleSystem::with_seed(10_000, 0);
        b.iter(|| black_box(system.step(1.0 / 60.0, 0.0, &beam.emitter, &beam.params)))
    });

    group.finish();
}

fn bench_curl(c: &mut Criterion) {
    let mut group = c.benchmark_group("curl");
    let field = CurlField::new(Simplex4);

    group.bench_function("simplex4_sample", |b| {
        let p = Vec4::new(0.3, -1.2, 2.5, 0.7);
        b.iter(|| black_box(Simplex4::sample(black_box(p))))
    });

    group.bench_function("curl", |b| {
        let p = Vec4::new(0.3, -1.2, 2.5, 0.7);
        b.iter(|| black_box(field.curl(black_box(p))))
    });

    group.finish();
}

fn bench_shader_gen(c: &mut Criterion) {
    let mut group = c.benchmark_group("shader_gen");

    group.bench_function("init", |b| b.iter(|| black_box(init_shader())));
    group.bench_function("update", |b| b.iter(|| black_box(update_shader())));

    group.finish();
}

criterion_group!(benches, bench_step, bench_curl, bench_shader_gen);
criterion_main!(benches);
