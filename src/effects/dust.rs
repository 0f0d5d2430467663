//! Warm dust motes hanging in the air, stirred in from the edges.

use super::{Effect, EffectId, Frame};
use crate::canvas::Canvas;
use crate::emitter::{Emitter, SpawnSite};
use crate::lifecycle::Lifecycle;
use crate::particle::Particle;
use crate::renderer::Sprite;
use crate::rules::{Physics, Rule};
use crate::spawn::SpawnContext;
use crate::system::ParticleSystem;
use crate::visuals::Palette;
use glam::Vec2;
use image::RgbaImage;

pub const INITIAL_MOTES: usize = 120;
pub const EDGE_SPAWN_CHANCE: f32 = 0.05;
/// The opening burst plus a steady trickle of about `EDGE_SPAWN_CHANCE * 350`.
pub const MAX_DUST: usize = 160;
pub const EDGE_MARGIN: f32 = 10.0;
pub const REMOVAL_MARGIN: f32 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DustConfig {
    pub initial: usize,
    pub spawn_chance: f32,
    pub cap: usize,
    pub size: (f32, f32),
    pub life: (f32, f32),
    pub drift: (f32, f32),
    pub gravity: f32,
}

impl Default for DustConfig {
    fn default() -> Self {
        Self {
            initial: INITIAL_MOTES,
            spawn_chance: EDGE_SPAWN_CHANCE,
            cap: MAX_DUST,
            size: (1.0, 4.0),
            life: (200.0, 500.0),
            drift: (0.1, 0.3),
            gravity: 0.001,
        }
    }
}

impl DustConfig {
    pub fn with_initial(mut self, initial: usize) -> Self {
        self.initial = initial;
        self
    }

    pub fn with_spawn_chance(mut self, chance: f32) -> Self {
        self.spawn_chance = chance;
        self
    }

    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }
}

pub struct Dust {
    motes: ParticleSystem,
}

impl Dust {
    pub fn new(config: DustConfig, ctx: &mut SpawnContext) -> Self {
        let c = config.clone();
        let physics = Physics::new()
            .with_rule(Rule::Float {
                amplitude: Vec2::new(1.0, 0.5),
                frequency: Vec2::new(0.01, 0.008),
                space_scale: 0.001,
                by_drift: true,
            })
            .with_rule(Rule::Gravity(config.gravity))
            .with_rule(Rule::Drag(0.999));
        let mut motes = ParticleSystem::new("dust")
            .with_emitter(Emitter::Burst { count: config.initial, site: SpawnSite::Anywhere })
            .with_emitter(Emitter::Edge {
                probability: config.spawn_chance,
                cap: config.cap,
                margin: EDGE_MARGIN,
            })
            .with_physics(physics)
            .with_lifecycle(Lifecycle::standard().margin(REMOVAL_MARGIN))
            .with_spawner(move |ctx, e| {
                let mut p = Particle::new(e.position)
                    .with_velocity(Vec2::new(ctx.signed(0.25), ctx.signed(0.15)))
                    .with_size(ctx.random_range(c.size.0, c.size.1))
                    .with_max_opacity(ctx.random_range(0.4, 1.2))
                    .with_max_life(ctx.random_range(c.life.0, c.life.1))
                    .with_color(ctx.pick(Palette::Dust));
                p.drift = ctx.random_range(c.drift.0, c.drift.1);
                p
            });
        motes.activate(ctx);
        Self { motes }
    }

    pub fn motes(&self) -> &[Particle] {
        self.motes.particles()
    }
}

impl Effect for Dust {
    fn id(&self) -> EffectId {
        EffectId::Dust
    }

    fn update(&mut self, frame: &mut Frame<'_>) {
        self.motes.update(frame.time(), frame.ctx);
    }

    fn render(&self, canvas: &mut Canvas, _background: Option<&RgbaImage>) {
        Sprite::Mote.draw_all(canvas, self.motes.particles(), 0.0);
    }

    fn population(&self) -> usize {
        self.motes.len()
    }
}
