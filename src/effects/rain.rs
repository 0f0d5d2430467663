//! Slanted rain with splashes where drops hit the bottom edge.
//!
//! Three pools: the drops themselves (recycled at the top once they land),
//! splash droplets thrown up on impact, and the expanding splash rings.

use super::{Effect, EffectId, Frame};
use crate::canvas::Canvas;
use crate::emitter::{Emission, Emitter, SpawnSite};
use crate::lifecycle::Lifecycle;
use crate::particle::Particle;
use crate::renderer::Sprite;
use crate::rules::{Physics, Rule};
use crate::spawn::SpawnContext;
use crate::system::ParticleSystem;
use glam::Vec2;
use image::RgbaImage;

pub const INITIAL_DROPS: usize = 150;
pub const MAX_DROPS: usize = 200;
pub const SPAWN_CHANCE: f32 = 0.1;
pub const SPLASH_CHANCE: f32 = 0.3;
/// Drops may start this far past either side edge.
pub const SIDE_MARGIN: f32 = 100.0;
pub const SPLASH_GRAVITY: f32 = 0.3;
pub const SPLASH_DRAG: f32 = 0.98;
pub const DROPLET_LIFE: f32 = 20.0;
pub const RING_LIFE: f32 = 30.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RainConfig {
    pub initial: usize,
    pub cap: usize,
    pub spawn_chance: f32,
    pub splash_chance: f32,
    pub length: (f32, f32),
    pub speed: (f32, f32),
    pub opacity: (f32, f32),
    pub slant: f32,
    pub width: (f32, f32),
    /// Droplets per splash, `[min, max)`.
    pub droplets: (i32, i32),
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            initial: INITIAL_DROPS,
            cap: MAX_DROPS,
            spawn_chance: SPAWN_CHANCE,
            splash_chance: SPLASH_CHANCE,
            length: (10.0, 30.0),
            speed: (12.0, 20.0),
            opacity: (0.4, 1.0),
            slant: 0.1,
            width: (0.5, 2.0),
            droplets: (4, 10),
        }
    }
}

impl RainConfig {
    pub fn with_splash_chance(mut self, chance: f32) -> Self {
        self.splash_chance = chance;
        self
    }

    pub fn with_spawn_chance(mut self, chance: f32) -> Self {
        self.spawn_chance = chance;
        self
    }
}

/// Linear fade from full opacity at birth to zero at `max_life`.
fn linear_fade() -> Lifecycle {
    Lifecycle::standard().fade_in(0.0).fade_out(0.0)
}

pub struct Rain {
    config: RainConfig,
    drops: ParticleSystem,
    droplets: ParticleSystem,
    rings: ParticleSystem,
}

impl Rain {
    pub fn new(config: RainConfig, ctx: &mut SpawnContext) -> Self {
        let c = config.clone();
        let site = SpawnSite::AboveTop { depth: ctx.bounds.y };
        let trickle = Emitter::Continuous {
            probability: config.spawn_chance,
            cap: config.cap,
            site,
        };
        let mut drops = ParticleSystem::new("raindrops")
            .with_emitter(Emitter::Burst { count: config.initial, site })
            .with_emitter(trickle)
            .with_lifecycle(Lifecycle::immortal())
            .with_spawner(move |ctx, e| {
                let x = ctx.random_range(-SIDE_MARGIN, ctx.bounds.x + SIDE_MARGIN);
                let slant = ctx.signed(c.slant);
                let speed = ctx.random_range(c.speed.0, c.speed.1);
                let mut p = Particle::new(Vec2::new(x, e.position.y))
                    .with_size(ctx.random_range(c.width.0, c.width.1))
                    .with_velocity(Vec2::new(slant * speed, speed))
                    .with_max_opacity(ctx.random_range(c.opacity.0, c.opacity.1));
                p.drift = slant;
                p.length = ctx.random_range(c.length.0, c.length.1);
                p
            });
        drops.activate(ctx);

        let droplets = ParticleSystem::new("splash-droplets")
            .with_physics(
                Physics::new()
                    .with_rule(Rule::Gravity(SPLASH_GRAVITY))
                    .with_rule(Rule::Drag(SPLASH_DRAG)),
            )
            .with_lifecycle(linear_fade())
            .with_spawner(|ctx, e| {
                Particle::new(e.position + Vec2::new(ctx.signed(2.0), ctx.signed(1.0)))
                    .with_velocity(Vec2::new(ctx.signed(4.0), -ctx.random_range(2.0, 6.0)))
                    .with_max_life(DROPLET_LIFE)
            });

        let rings = ParticleSystem::new("splash-rings")
            .with_lifecycle(linear_fade())
            .with_spawner(|ctx, e| {
                Particle::new(e.position)
                    .with_size(ctx.random_range(4.0, 12.0))
                    .with_max_life(RING_LIFE)
            });

        Self { config, drops, droplets, rings }
    }

    pub fn drops(&self) -> &[Particle] {
        self.drops.particles()
    }

    pub fn splash_count(&self) -> usize {
        self.rings.len()
    }

    fn splash(&mut self, at: Vec2, ctx: &mut SpawnContext) {
        let n = ctx.random_int(self.config.droplets.0, self.config.droplets.1);
        for _ in 0..n {
            self.droplets.spawn(Emission::at(at), ctx);
        }
        self.rings.spawn(Emission::at(at), ctx);
    }

    fn recycle(&mut self, ctx: &mut SpawnContext) {
        let bounds = ctx.bounds;
        let mut impacts = Vec::new();
        for p in self.drops.particles_mut() {
            let landed = p.position.y > bounds.y;
            let strayed = p.position.x < -SIDE_MARGIN || p.position.x > bounds.x + SIDE_MARGIN;
            if !landed && !strayed {
                continue;
            }
            if landed && ctx.chance(self.config.splash_chance) {
                impacts.push(Vec2::new(p.position.x, bounds.y));
            }
            let (lo, hi) = self.config.speed;
            let speed = if landed { ctx.random_range(lo, hi) } else { p.velocity.y };
            let x = ctx.random_range(-SIDE_MARGIN, bounds.x + SIDE_MARGIN);
            p.position = Vec2::new(x, -p.length);
            p.velocity = Vec2::new(p.drift * speed, speed);
        }
        for at in impacts {
            self.splash(at, ctx);
        }
    }
}

impl Effect for Rain {
    fn id(&self) -> EffectId {
        EffectId::Rain
    }

    fn update(&mut self, frame: &mut Frame<'_>) {
        let t = frame.time();
        self.drops.update(t, frame.ctx);
        self.recycle(frame.ctx);
        self.droplets.update(t, frame.ctx);
        self.rings.update(t, frame.ctx);
    }

    fn render(&self, canvas: &mut Canvas, _background: Option<&RgbaImage>) {
        Sprite::Raindrop.draw_all(canvas, self.drops.particles(), 0.0);
        Sprite::Droplet.draw_all(canvas, self.droplets.particles(), 0.0);
        Sprite::SplashRing.draw_all(canvas, self.rings.particles(), 0.0);
    }

    fn population(&self) -> usize {
        self.drops.len() + self.droplets.len() + self.rings.len()
    }
}
