//! Soft smoke puffs rising from below, growing as they climb.

use super::{Effect, EffectId, Frame};
use crate::canvas::Canvas;
use crate::emitter::{Emitter, SpawnSite};
use crate::lifecycle::{Ceiling, Lifecycle};
use crate::particle::Particle;
use crate::renderer::Sprite;
use crate::rules::{Physics, Rule};
use crate::spawn::SpawnContext;
use crate::system::ParticleSystem;
use crate::visuals::Palette;
use glam::Vec2;
use image::RgbaImage;

pub const INITIAL_PUFFS: usize = 15;
pub const SPAWN_CHANCE: f32 = 0.03;
/// Steady state is about `SPAWN_CHANCE * 250` puffs on top of the opening burst.
pub const MAX_PUFFS: usize = 40;
/// New puffs start this far below the bottom edge.
pub const SPAWN_OFFSET: f32 = 20.0;
/// Puffs are dropped once their centre is this far above the top edge.
pub const CEILING: f32 = 100.0;
pub const GROWTH: f32 = 0.2;
pub const DRAG: f32 = 0.995;

#[derive(Debug, Clone, PartialEq)]
pub struct SmokeConfig {
    pub initial: usize,
    pub spawn_chance: f32,
    pub cap: usize,
    pub size: (f32, f32),
    pub opacity: (f32, f32),
    pub life: (f32, f32),
    pub growth: f32,
    pub wind: Vec2,
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            initial: INITIAL_PUFFS,
            spawn_chance: SPAWN_CHANCE,
            cap: MAX_PUFFS,
            size: (20.0, 50.0),
            opacity: (0.3, 0.9),
            life: (150.0, 350.0),
            growth: GROWTH,
            wind: Vec2::new(0.02, 0.01),
        }
    }
}

impl SmokeConfig {
    pub fn with_spawn_chance(mut self, chance: f32) -> Self {
        self.spawn_chance = chance;
        self
    }

    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_growth(mut self, growth: f32) -> Self {
        self.growth = growth;
        self
    }

    pub fn with_initial(mut self, initial: usize) -> Self {
        self.initial = initial;
        self
    }
}

pub struct Smoke {
    puffs: ParticleSystem,
}

impl Smoke {
    pub fn new(config: SmokeConfig, ctx: &mut SpawnContext) -> Self {
        let c = config.clone();
        let physics = Physics::new()
            .with_rule(Rule::Grow(config.growth))
            .with_rule(Rule::Wind {
                strength: config.wind,
                time_scale: Vec2::new(0.01, 0.008),
                space_scale: 0.001,
            })
            .with_rule(Rule::Drag(DRAG));
        let mut puffs = ParticleSystem::new("smoke")
            .with_emitter(Emitter::Burst { count: config.initial, site: SpawnSite::Anywhere })
            .with_emitter(Emitter::Continuous {
                probability: config.spawn_chance,
                cap: config.cap,
                site: SpawnSite::Beneath { offset: SPAWN_OFFSET },
            })
            .with_physics(physics)
            .with_lifecycle(Lifecycle::standard().ceiling(Ceiling::Fixed(CEILING)))
            .with_spawner(move |ctx, e| {
                Particle::new(e.position)
                    .with_velocity(Vec2::new(ctx.signed(1.0), -ctx.random_range(1.0, 3.0)))
                    .with_size(ctx.random_range(c.size.0, c.size.1))
                    .with_max_opacity(ctx.random_range(c.opacity.0, c.opacity.1))
                    .with_max_life(ctx.random_range(c.life.0, c.life.1))
                    .with_rotation(ctx.signed(0.01), ctx.signed(0.01))
                    .with_color(ctx.pick(Palette::Smoke))
            });
        puffs.activate(ctx);
        Self { puffs }
    }

    pub fn puffs(&self) -> &[Particle] {
        self.puffs.particles()
    }
}

impl Effect for Smoke {
    fn id(&self) -> EffectId {
        EffectId::Smoke
    }

    fn update(&mut self, frame: &mut Frame<'_>) {
        self.puffs.update(frame.time(), frame.ctx);
    }

    fn render(&self, canvas: &mut Canvas, _background: Option<&RgbaImage>) {
        Sprite::Smoke.draw_all(canvas, self.puffs.particles(), 0.0);
    }

    fn population(&self) -> usize {
        self.puffs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing;

    #[test]
    fn test_puffs_rise_and_grow() {
        let mut ctx = testing::ctx();
        let mut smoke = Smoke::new(SmokeConfig::default().with_spawn_chance(0.0), &mut ctx);
        let before: Vec<(f32, f32)> =
            smoke.puffs().iter().map(|p| (p.position.y, p.size)).collect();
        testing::run(&mut smoke, &mut ctx, 10);
        assert_eq!(smoke.puffs().len(), before.len());
        for (p, (y, size)) in smoke.puffs().iter().zip(before) {
            assert!(p.position.y < y);
            assert!((p.size - (size + 10.0 * GROWTH)).abs() < 1e-3);
        }
    }

    #[test]
    fn test_growth_override() {
        let mut ctx = testing::ctx();
        let config = SmokeConfig::default().with_spawn_chance(0.0).with_growth(0.0);
        let mut smoke = Smoke::new(config, &mut ctx);
        let before: Vec<f32> = smoke.puffs().iter().map(|p| p.size).collect();
        testing::run(&mut smoke, &mut ctx, 5);
        let after: Vec<f32> = smoke.puffs().iter().map(|p| p.size).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_custom_cap_bounds_population() {
        let mut ctx = testing::ctx();
        let config = SmokeConfig::default().with_spawn_chance(1.0).with_cap(20);
        let mut smoke = Smoke::new(config, &mut ctx);
        for _ in 0..40 {
            testing::run(&mut smoke, &mut ctx, 5);
            assert!(smoke.population() <= 20);
        }
    }

    #[test]
    fn test_puffs_eventually_clear() {
        let mut ctx = testing::ctx();
        let mut smoke = Smoke::new(SmokeConfig::default().with_spawn_chance(0.0), &mut ctx);
        testing::run(&mut smoke, &mut ctx, 400);
        assert_eq!(smoke.population(), 0);
    }

    #[test]
    fn test_new_puffs_start_below_the_canvas() {
        let mut ctx = testing::ctx();
        let config = SmokeConfig::default().with_initial(0).with_spawn_chance(1.0);
        let mut smoke = Smoke::new(config, &mut ctx);
        testing::run(&mut smoke, &mut ctx, 1);
        let p = &smoke.puffs()[0];
        // one step of at most 3 px up from the spawn line
        assert!(p.position.y >= 240.0 + SPAWN_OFFSET - 3.5);
        assert!(p.opacity < 0.1);
    }
}
