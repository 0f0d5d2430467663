//! Property tests for the particle engine and the wave grid.
//!
//! Verifies:
//! 1. Lifecycle envelope stays in `[0, max_opacity]`
//! 2. Envelope rises through fade-in and falls through fade-out
//! 3. Pulsed opacity never leaves `[0, max_opacity]`
//! 4. Continuous emission never exceeds its cap, whatever the frame count,
//!    both in a bare pool and in the smoke and dust effects
//! 5. Wave heights stay in `[-2, 2]` under arbitrary impulses
//! 6. Bounce reflects and clamps at the wall

use fxdeck::effects::dust::{Dust, DustConfig, MAX_DUST};
use fxdeck::effects::smoke::{Smoke, SmokeConfig, MAX_PUFFS};
use fxdeck::effects::{Effect, Frame};
use fxdeck::emitter::{Emitter, SpawnSite};
use fxdeck::lifecycle::Lifecycle;
use fxdeck::particle::Particle;
use fxdeck::rules::{Boundary, Physics};
use fxdeck::scheduler::Scheduler;
use fxdeck::spawn::SpawnContext;
use fxdeck::system::ParticleSystem;
use fxdeck::wave::WaveGrid;
use glam::Vec2;
use proptest::prelude::*;

/// Step `effect` for `frames` frames, checking its population after each.
fn population_stays_under(
    effect: &mut dyn Effect,
    ctx: &mut SpawnContext,
    frames: u64,
    cap: usize,
) -> bool {
    let mut scheduler = Scheduler::new();
    for n in 0..frames {
        let mut frame = Frame {
            frame: n,
            now: n as f32 / 60.0,
            ctx: &mut *ctx,
            scheduler: &mut scheduler,
        };
        effect.update(&mut frame);
        if effect.population() > cap {
            return false;
        }
    }
    true
}

// ============================================================================
// Strategies
// ============================================================================

fn arb_lifecycle() -> impl Strategy<Value = Lifecycle> {
    prop_oneof![
        Just(Lifecycle::standard()),
        Just(Lifecycle::ripple()),
        (0.0f32..0.5, 0.5f32..1.0).prop_map(|(fade_in, fade_out)| {
            Lifecycle::standard().fade_in(fade_in).fade_out(fade_out)
        }),
    ]
}

fn arb_impulse() -> impl Strategy<Value = (Vec2, f32)> {
    ((-20.0f32..340.0, -20.0f32..260.0), -50.0f32..50.0)
        .prop_map(|((x, y), s)| (Vec2::new(x, y), s))
}

// ============================================================================
// Lifecycle
// ============================================================================

proptest! {
    #[test]
    fn envelope_is_bounded(
        lifecycle in arb_lifecycle(),
        life in 0.0f32..2000.0,
        max_life in 1.0f32..1000.0,
        max_opacity in 0.0f32..1.0,
    ) {
        let v = lifecycle.envelope(life, max_life, max_opacity);
        prop_assert!(v >= 0.0);
        prop_assert!(v <= max_opacity);
    }

    #[test]
    fn envelope_rises_then_falls(
        lifecycle in arb_lifecycle(),
        a in 0.0f32..1.0,
        b in 0.0f32..1.0,
        max_life in 10.0f32..1000.0,
        max_opacity in 0.1f32..1.0,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let at = |r: f32| lifecycle.envelope(r * max_life, max_life, max_opacity);
        let tolerance = 1e-4;
        if hi <= lifecycle.fade_out_threshold() {
            prop_assert!(at(lo) <= at(hi) + tolerance);
        }
        if lo >= lifecycle.fade_out_threshold() {
            prop_assert!(at(lo) + tolerance >= at(hi));
        }
    }

    #[test]
    fn pulsed_opacity_is_bounded(
        floor in 0.0f32..1.0,
        speed in 0.001f32..0.5,
        life in 0.0f32..500.0,
        time in 0.0f32..100_000.0,
        phase in 0.0f32..std::f32::consts::TAU,
        max_opacity in 0.0f32..1.0,
    ) {
        let lifecycle = Lifecycle::standard().pulse(floor, speed);
        let mut p = Particle::new(Vec2::ZERO).with_max_life(500.0).with_max_opacity(max_opacity);
        p.life = life;
        p.phase = phase;
        let v = lifecycle.opacity(&p, time);
        prop_assert!((0.0..=max_opacity).contains(&v));
    }
}

// ============================================================================
// Emission
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn continuous_emission_respects_cap(
        cap in 0usize..60,
        probability in 0.0f32..1.0,
        frames in 0u32..600,
        seed in any::<u64>(),
    ) {
        let mut system = ParticleSystem::new("capped")
            .with_emitter(Emitter::Continuous { probability, cap, site: SpawnSite::Anywhere })
            .with_spawner(|ctx, e| {
                Particle::new(e.position).with_max_life(ctx.random_range(20.0, 200.0))
            });
        let mut ctx = SpawnContext::seeded(Vec2::new(320.0, 240.0), seed);
        for t in 0..frames {
            system.update(t as f32, &mut ctx);
            prop_assert!(system.len() <= cap);
        }
    }

    #[test]
    fn smoke_population_respects_cap(
        probability in 0.0f32..1.0,
        frames in 0u64..600,
        seed in any::<u64>(),
    ) {
        let mut ctx = SpawnContext::seeded(Vec2::new(640.0, 480.0), seed);
        let mut smoke = Smoke::new(SmokeConfig::default().with_spawn_chance(probability), &mut ctx);
        prop_assert!(population_stays_under(&mut smoke, &mut ctx, frames, MAX_PUFFS));
    }

    #[test]
    fn dust_population_respects_cap(
        probability in 0.0f32..1.0,
        frames in 0u64..600,
        seed in any::<u64>(),
    ) {
        let mut ctx = SpawnContext::seeded(Vec2::new(640.0, 480.0), seed);
        let mut dust = Dust::new(DustConfig::default().with_spawn_chance(probability), &mut ctx);
        prop_assert!(population_stays_under(&mut dust, &mut ctx, frames, MAX_DUST));
    }
}

// ============================================================================
// Wave grid
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn wave_heights_stay_clamped(
        impulses in prop::collection::vec(arb_impulse(), 1..12),
        frames in 1usize..200,
        seed in any::<u64>(),
    ) {
        let mut ctx = SpawnContext::seeded(Vec2::new(320.0, 240.0), seed);
        let mut grid = WaveGrid::new(ctx.bounds);
        for (position, strength) in &impulses {
            grid.ripple(*position, *strength, &mut ctx);
        }
        for _ in 0..frames {
            grid.step();
            prop_assert!(grid.max_abs_height() <= 2.0);
        }
    }
}

// ============================================================================
// Boundaries
// ============================================================================

#[test]
fn test_bounce_at_left_wall() {
    let restitution = 0.8;
    let size = 20.0;
    let physics = Physics::new().with_boundary(Boundary::Bounce { restitution });
    let mut ctx = SpawnContext::seeded(Vec2::new(800.0, 600.0), 1);
    let mut p = Particle::new(Vec2::new(size - 1.0, 300.0))
        .with_size(size)
        .with_velocity(Vec2::new(-5.0, 0.0));
    physics.step(&mut p, 0.0, &mut ctx);
    assert_eq!(p.position.x, size);
    assert_eq!(p.velocity.x, 5.0 * restitution);
}
