//! Benchmarks for full-frame deck ticks and the wave grid.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;

use fxdeck::deck::Deck;
use fxdeck::effects::EffectId;
use fxdeck::spawn::SpawnContext;
use fxdeck::time::Time;
use fxdeck::wave::WaveGrid;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 360;

fn bench_deck_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("deck_tick");
    group.sample_size(20);

    let ids = [
        EffectId::Snow,
        EffectId::Rain,
        EffectId::Smoke,
        EffectId::Starfield,
        EffectId::WaterRipple,
    ];
    for id in ids {
        group.bench_with_input(BenchmarkId::from_parameter(id), &id, |b, &id| {
            let mut deck = Deck::new(WIDTH, HEIGHT).with_seed(7);
            let mut time = Time::fixed(1.0 / 60.0);
            deck.select_effect(id);
            // Let emitters reach their steady population first
            for _ in 0..120 {
                deck.tick(&time.tick());
            }
            b.iter(|| black_box(deck.tick(&time.tick()).width()))
        });
    }

    group.bench_function("idle", |b| {
        let mut deck = Deck::new(WIDTH, HEIGHT);
        let mut time = Time::fixed(1.0 / 60.0);
        b.iter(|| black_box(deck.tick(&time.tick()).width()))
    });

    group.finish();
}

fn bench_wave_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("wave_step");

    for (w, h) in [(320.0, 180.0), (1280.0, 720.0), (1920.0, 1080.0)] {
        let size = Vec2::new(w, h);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{w}x{h}")), &size, |b, &size| {
            let mut ctx = SpawnContext::seeded(size, 3);
            let mut grid = WaveGrid::new(size);
            for _ in 0..8 {
                let at = ctx.random_point();
                grid.ripple(at, 0.8, &mut ctx);
            }
            b.iter(|| {
                grid.step();
                black_box(grid.ripples().len())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_deck_tick, bench_wave_step);
criterion_main!(benches);
