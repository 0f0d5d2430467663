//! Iridescent soap bubbles drifting up from the bottom edge.

use super::{Effect, EffectId, Frame};
use crate::canvas::Canvas;
use crate::emitter::{Emitter, SpawnSite};
use crate::lifecycle::{Ceiling, Lifecycle};
use crate::particle::Particle;
use crate::renderer::Sprite;
use crate::rules::{Axes, Boundary, Physics, Rule};
use crate::spawn::SpawnContext;
use crate::system::ParticleSystem;
use glam::Vec2;
use image::RgbaImage;

pub const INITIAL_BUBBLES: usize = 25;
pub const MAX_BUBBLES: usize = 30;
pub const SPAWN_CHANCE: f32 = 0.02;
pub const SPAWN_DEPTH: f32 = 100.0;
/// Bubbles are dropped once this far above their own top edge.
pub const EXIT_MARGIN: f32 = 50.0;
pub const MAX_OPACITY: f32 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub struct BubblesConfig {
    pub initial: usize,
    pub cap: usize,
    pub spawn_chance: f32,
    pub size: (f32, f32),
    pub rise: (f32, f32),
    pub drift: f32,
    pub wobble: f32,
    pub wobble_speed: (f32, f32),
    /// Base hue range in degrees.
    pub hue: (f32, f32),
    pub life: (f32, f32),
}

impl Default for BubblesConfig {
    fn default() -> Self {
        Self {
            initial: INITIAL_BUBBLES,
            cap: MAX_BUBBLES,
            spawn_chance: SPAWN_CHANCE,
            size: (20.0, 60.0),
            rise: (0.5, 2.0),
            drift: 1.0,
            wobble: 0.5,
            wobble_speed: (0.01, 0.03),
            hue: (180.0, 240.0),
            life: (200.0, 500.0),
        }
    }
}

impl BubblesConfig {
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_spawn_chance(mut self, chance: f32) -> Self {
        self.spawn_chance = chance;
        self
    }

    pub fn with_life(mut self, min: f32, max: f32) -> Self {
        self.life = (min, max);
        self
    }
}

pub struct Bubbles {
    bubbles: ParticleSystem,
    time: f32,
}

impl Bubbles {
    pub fn new(config: BubblesConfig, ctx: &mut SpawnContext) -> Self {
        let site = SpawnSite::BelowBottom { depth: SPAWN_DEPTH };
        let trickle = Emitter::Continuous {
            probability: config.spawn_chance,
            cap: config.cap,
            site,
        };
        let c = config.clone();
        let mut bubbles = ParticleSystem::new("bubbles")
            .with_emitter(Emitter::Burst { count: config.initial, site })
            .with_emitter(trickle)
            .with_physics(
                Physics::new()
                    .with_rule(Rule::Wobble { amplitude: config.wobble })
                    .with_boundary(Boundary::Wrap { axes: Axes::Horizontal, padded: true }),
            )
            .with_lifecycle(Lifecycle::standard().ceiling(Ceiling::PastSize(EXIT_MARGIN)))
            .with_spawner(move |ctx, e| {
                let rise = ctx.random_range(c.rise.0, c.rise.1);
                let velocity = Vec2::new(ctx.signed(c.drift), -rise);
                let mut p = Particle::new(e.position)
                    .with_size(ctx.random_range(c.size.0, c.size.1))
                    .with_velocity(velocity)
                    .with_max_opacity(MAX_OPACITY)
                    .with_max_life(ctx.random_range(c.life.0, c.life.1));
                p.phase_speed = ctx.random_range(c.wobble_speed.0, c.wobble_speed.1);
                p.hue = ctx.random_range(c.hue.0, c.hue.1);
                p
            });
        bubbles.activate(ctx);
        Self { bubbles, time: 0.0 }
    }

    pub fn bubbles(&self) -> &[Particle] {
        self.bubbles.particles()
    }
}

impl Effect for Bubbles {
    fn id(&self) -> EffectId {
        EffectId::Bubbles
    }

    fn update(&mut self, frame: &mut Frame<'_>) {
        self.time = frame.time();
        self.bubbles.update(self.time, frame.ctx);
    }

    fn render(&self, canvas: &mut Canvas, _background: Option<&RgbaImage>) {
        Sprite::Bubble.draw_all(canvas, self.bubbles.particles(), self.time);
    }

    fn population(&self) -> usize {
        self.bubbles.len()
    }
}
