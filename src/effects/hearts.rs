//! Hearts bouncing around the screen under light gravity.

use super::{Effect, EffectId, Frame};
use crate::canvas::Canvas;
use crate::emitter::{Emitter, SpawnSite};
use crate::lifecycle::Lifecycle;
use crate::particle::Particle;
use crate::renderer::Sprite;
use crate::rules::{Boundary, Physics, Rule};
use crate::spawn::SpawnContext;
use crate::system::ParticleSystem;
use crate::visuals::Palette;
use glam::Vec2;
use image::RgbaImage;

pub const INITIAL_HEARTS: usize = 50;
pub const MAX_HEARTS: usize = 30;
pub const SPAWN_CHANCE: f32 = 0.02;
pub const RESTITUTION: f32 = 0.8;
pub const GRAVITY: f32 = 0.1;
pub const SPARKLE_CHANCE: f32 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct HeartsConfig {
    pub initial: usize,
    pub cap: usize,
    pub spawn_chance: f32,
    pub speed: f32,
    pub size: (f32, f32),
    pub life: (f32, f32),
    pub sparkle_chance: f32,
}

impl Default for HeartsConfig {
    fn default() -> Self {
        Self {
            initial: INITIAL_HEARTS,
            cap: MAX_HEARTS,
            spawn_chance: SPAWN_CHANCE,
            speed: 4.0,
            size: (15.0, 40.0),
            life: (300.0, 700.0),
            sparkle_chance: SPARKLE_CHANCE,
        }
    }
}

impl HeartsConfig {
    pub fn with_initial(mut self, initial: usize) -> Self {
        self.initial = initial;
        self
    }

    pub fn with_sparkle_chance(mut self, chance: f32) -> Self {
        self.sparkle_chance = chance;
        self
    }
}

pub struct Hearts {
    config: HeartsConfig,
    hearts: ParticleSystem,
}

impl Hearts {
    pub fn new(config: HeartsConfig, ctx: &mut SpawnContext) -> Self {
        let c = config.clone();
        let physics = Physics::new()
            .with_rule(Rule::Gravity(GRAVITY))
            .with_rule(Rule::Drag(0.999))
            .with_boundary(Boundary::Bounce { restitution: RESTITUTION });
        let mut hearts = ParticleSystem::new("hearts")
            .with_emitter(Emitter::Burst { count: config.initial, site: SpawnSite::Anywhere })
            .with_emitter(Emitter::Continuous {
                probability: config.spawn_chance,
                cap: config.cap,
                site: SpawnSite::Anywhere,
            })
            .with_physics(physics)
            .with_lifecycle(Lifecycle::standard().pulse(0.9, 0.05))
            .with_spawner(move |ctx, e| {
                Particle::new(e.position)
                    .with_velocity(Vec2::new(ctx.signed(c.speed), ctx.signed(c.speed)))
                    .with_size(ctx.random_range(c.size.0, c.size.1))
                    .with_max_opacity(ctx.random_range(0.8, 1.1))
                    .with_max_life(ctx.random_range(c.life.0, c.life.1))
                    .with_rotation(ctx.random_angle(), ctx.signed(0.025))
                    .with_color(ctx.pick(Palette::Hearts))
            });
        hearts.activate(ctx);
        Self { config, hearts }
    }

    pub fn hearts(&self) -> &[Particle] {
        self.hearts.particles()
    }
}

impl Effect for Hearts {
    fn id(&self) -> EffectId {
        EffectId::Hearts
    }

    fn update(&mut self, frame: &mut Frame<'_>) {
        self.hearts.update(frame.time(), frame.ctx);
        // sparkles are chosen here so rendering stays deterministic
        let chance = self.config.sparkle_chance;
        for p in self.hearts.particles_mut() {
            p.flair = if frame.ctx.chance(chance) {
                let half = p.size * 0.5;
                Some(Vec2::new(frame.ctx.signed(half), frame.ctx.signed(half)))
            } else {
                None
            };
        }
    }

    fn render(&self, canvas: &mut Canvas, _background: Option<&RgbaImage>) {
        Sprite::Heart.draw_all(canvas, self.hearts.particles(), 0.0);
    }

    fn population(&self) -> usize {
        self.hearts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing;

    #[test]
    fn test_hearts_stay_inside_walls() {
        let mut ctx = testing::ctx();
        let mut hearts = Hearts::new(HeartsConfig::default(), &mut ctx);
        assert_eq!(hearts.population(), INITIAL_HEARTS);
        for _ in 0..10 {
            testing::run(&mut hearts, &mut ctx, 20);
            for p in hearts.hearts() {
                assert!(p.position.x >= 0.0 && p.position.x <= 320.0);
                assert!(p.position.y >= 0.0 && p.position.y <= 240.0);
            }
        }
        assert!(hearts.hearts().iter().any(|p| p.bounce_count > 0));
    }

    #[test]
    fn test_top_up_only_below_cap() {
        let mut ctx = testing::ctx();
        let mut hearts = Hearts::new(HeartsConfig::default(), &mut ctx);
        testing::run(&mut hearts, &mut ctx, 100);
        // the initial burst is above the cap and nothing has expired yet
        assert_eq!(hearts.population(), INITIAL_HEARTS);
    }

    #[test]
    fn test_sparkles_sit_on_the_heart() {
        let mut ctx = testing::ctx();
        let mut hearts = Hearts::new(HeartsConfig::default().with_sparkle_chance(1.0), &mut ctx);
        testing::run(&mut hearts, &mut ctx, 1);
        for p in hearts.hearts() {
            let flair = p.flair.expect("every heart sparkles");
            assert!(flair.x.abs() <= p.size * 0.5 && flair.y.abs() <= p.size * 0.5);
        }
    }
}
