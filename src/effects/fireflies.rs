//! Fireflies wandering between random spots and pulsing softly.

use super::{Effect, EffectId, Frame};
use crate::canvas::Canvas;
use crate::emitter::{Emitter, SpawnSite};
use crate::lifecycle::Lifecycle;
use crate::particle::Particle;
use crate::renderer::Sprite;
use crate::rules::{Axes, Boundary, Physics, Rule};
use crate::spawn::SpawnContext;
use crate::system::ParticleSystem;
use crate::visuals::Palette;
use glam::Vec2;
use image::RgbaImage;

pub const FIREFLY_COUNT: usize = 20;
pub const TRAIL_LENGTH: usize = 8;
pub const SEEK_RATE: f32 = 0.01;
pub const RETARGET_CHANCE: f32 = 0.005;
/// Pulse floor: opacity swings between 0 and `max_opacity` around this midpoint.
pub const PULSE_FLOOR: f32 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct FirefliesConfig {
    pub count: usize,
    pub size: (f32, f32),
    pub max_opacity: (f32, f32),
    pub pulse_speed: (f32, f32),
    pub move_speed: (f32, f32),
    pub retarget: f32,
    pub trail: usize,
}

impl Default for FirefliesConfig {
    fn default() -> Self {
        Self {
            count: FIREFLY_COUNT,
            size: (2.0, 5.0),
            max_opacity: (0.4, 1.2),
            pulse_speed: (0.01, 0.03),
            move_speed: (0.2, 0.7),
            retarget: RETARGET_CHANCE,
            trail: TRAIL_LENGTH,
        }
    }
}

impl FirefliesConfig {
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_trail(mut self, trail: usize) -> Self {
        self.trail = trail;
        self
    }
}

pub struct Fireflies {
    swarm: ParticleSystem,
}

impl Fireflies {
    pub fn new(config: FirefliesConfig, ctx: &mut SpawnContext) -> Self {
        let c = config.clone();
        let physics = Physics::new()
            .with_rule(Rule::Seek { rate: SEEK_RATE, retarget: config.retarget })
            .with_rule(Rule::Float {
                amplitude: Vec2::new(0.5, 0.3),
                frequency: Vec2::new(0.01, 0.008),
                space_scale: 0.001,
                by_drift: false,
            })
            .with_boundary(Boundary::Wrap { axes: Axes::Both, padded: false });
        let mut swarm = ParticleSystem::new("fireflies")
            .with_emitter(Emitter::Burst { count: config.count, site: SpawnSite::Anywhere })
            .with_physics(physics)
            .with_lifecycle(Lifecycle::immortal().pulse(PULSE_FLOOR, 0.0))
            .with_spawner(move |ctx, e| {
                // max_opacity is clamped to 1 by the builder
                let mut p = Particle::new(e.position)
                    .with_size(ctx.random_range(c.size.0, c.size.1))
                    .with_max_opacity(ctx.random_range(c.max_opacity.0, c.max_opacity.1))
                    .with_color(ctx.pick(Palette::Fireflies))
                    .with_trail(c.trail);
                p.phase_speed = ctx.random_range(c.pulse_speed.0, c.pulse_speed.1);
                p.speed = ctx.random_range(c.move_speed.0, c.move_speed.1);
                p.target = Some(e.position);
                p
            });
        swarm.activate(ctx);
        Self { swarm }
    }

    pub fn fireflies(&self) -> &[Particle] {
        self.swarm.particles()
    }
}

impl Effect for Fireflies {
    fn id(&self) -> EffectId {
        EffectId::Fireflies
    }

    fn update(&mut self, frame: &mut Frame<'_>) {
        self.swarm.update(frame.time(), frame.ctx);
    }

    fn render(&self, canvas: &mut Canvas, _background: Option<&RgbaImage>) {
        Sprite::Firefly.draw_all(canvas, self.swarm.particles(), 0.0);
    }

    fn population(&self) -> usize {
        self.swarm.len()
    }
}
