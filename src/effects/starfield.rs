//! Flying through a field of stars.
//!
//! Stars live in a `2000 × 2000 × 1000` volume in front of the viewer and
//! move toward it at a speed that slowly swells and eases. Each frame they
//! are projected with `screen = xy / z * FOCAL + centre`; a star that
//! reaches `z <= 0` is sent back to the far plane at a new random spot.
//!
//! The layer is never cleared. A 10% black veil painted at the start of
//! every frame turns old positions into fading streaks.

use super::{Effect, EffectId, Frame};
use crate::canvas::Canvas;
use crate::emitter::{Emitter, SpawnSite};
use crate::lifecycle::Lifecycle;
use crate::particle::Particle;
use crate::spawn::SpawnContext;
use crate::system::ParticleSystem;
use crate::visuals::{BlendMode, Color, Gradient, Paint, Palette};
use glam::Vec2;
use image::RgbaImage;
use std::f32::consts::TAU;

pub const STAR_COUNT: usize = 200;
pub const FOCAL: f32 = 500.0;
/// Half-extent of the star volume on x and y.
pub const SPREAD: f32 = 1000.0;
pub const FAR_PLANE: f32 = 1000.0;
pub const TIME_STEP: f32 = 0.01;
/// Stars projected further than this off-canvas are not drawn.
const CULL_MARGIN: f32 = 50.0;
const VEIL_ALPHA: f32 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct StarfieldConfig {
    pub count: usize,
    pub base_speed: f32,
    pub speed_swing: f32,
    pub size: (f32, f32),
    pub opacity: (f32, f32),
    pub twinkle_speed: (f32, f32),
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            count: STAR_COUNT,
            base_speed: 2.0,
            speed_swing: 1.0,
            size: (0.5, 2.5),
            opacity: (0.2, 1.0),
            twinkle_speed: (0.01, 0.03),
        }
    }
}

impl StarfieldConfig {
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_speed(mut self, base: f32, swing: f32) -> Self {
        self.base_speed = base;
        self.speed_swing = swing;
        self
    }
}

pub struct Starfield {
    config: StarfieldConfig,
    stars: ParticleSystem,
    t: f32,
    speed: f32,
    center: Vec2,
}

fn random_xy(ctx: &mut SpawnContext) -> Vec2 {
    Vec2::new(ctx.signed(SPREAD), ctx.signed(SPREAD))
}

impl Starfield {
    pub fn new(config: StarfieldConfig, ctx: &mut SpawnContext) -> Self {
        let c = config.clone();
        let mut stars = ParticleSystem::new("stars")
            .with_emitter(Emitter::Burst { count: config.count, site: SpawnSite::At(Vec2::ZERO) })
            .with_lifecycle(Lifecycle::immortal())
            .with_spawner(move |ctx, _| {
                let mut p = Particle::new(random_xy(ctx))
                    .with_size(ctx.random_range(c.size.0, c.size.1))
                    .with_max_opacity(ctx.random_range(c.opacity.0, c.opacity.1))
                    .with_color(ctx.pick(Palette::Stars))
                    .with_trail(2);
                p.depth = ctx.random_range(1.0, FAR_PLANE + 1.0);
                p.phase = ctx.random() * TAU;
                p.phase_speed = ctx.random_range(c.twinkle_speed.0, c.twinkle_speed.1);
                p
            });
        stars.activate(ctx);
        Self { config, stars, t: 0.0, speed: 0.0, center: ctx.bounds * 0.5 }
    }

    pub fn stars(&self) -> &[Particle] {
        self.stars.particles()
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn project(&self, p: &Particle) -> Vec2 {
        p.position / p.depth * FOCAL + self.center
    }

    fn draw_star(&self, c: &mut Canvas, p: &Particle) {
        let at = self.project(p);
        let bounds = c.size();
        let margin = Vec2::splat(CULL_MARGIN);
        let visible = at.cmpge(-margin).all() && at.cmple(bounds + margin).all();
        if !visible {
            return;
        }
        let nearness = 1.0 - p.depth / FAR_PLANE;
        let size = p.size * nearness * 3.0;
        let twinkle = (self.t * 60.0 * p.phase_speed + p.phase).sin();
        let opacity = p.max_opacity * nearness * (0.8 + twinkle * 0.2);
        if opacity <= 0.0 || size <= 0.0 {
            return;
        }

        c.scoped(|c| {
            if nearness > 0.3 && self.speed > self.config.base_speed {
                if let Some(prev) = p.trail.iter().nth(1) {
                    c.set_alpha(opacity * 0.3);
                    c.stroke_line(prev, at, size * 0.5, &p.color.into());
                }
            }

            c.set_alpha(opacity);
            let glow = Gradient::new()
                .stop(0.0, p.color)
                .stop(0.3, p.color.with_alpha(0.5))
                .stop(1.0, p.color.with_alpha(0.0));
            c.fill_circle(at, size * 3.0, &Paint::radial(at, 0.0, size * 3.0, glow));

            c.set_alpha((opacity * 1.2).min(1.0));
            c.fill_circle(at, size, &p.color.into());

            c.set_alpha((opacity * 1.5).min(1.0));
            c.fill_circle(at, size * 0.3, &Color::WHITE.into());
        });
    }
}

impl Effect for Starfield {
    fn id(&self) -> EffectId {
        EffectId::Starfield
    }

    fn layer_blend(&self) -> BlendMode {
        BlendMode::Screen
    }

    fn update(&mut self, frame: &mut Frame<'_>) {
        self.t += TIME_STEP;
        self.speed = self.config.base_speed + (self.t * 0.5).sin() * self.config.speed_swing;
        self.center = frame.bounds() * 0.5;

        let speed = self.speed;
        let center = self.center;
        let ctx = &mut *frame.ctx;
        for p in self.stars.particles_mut() {
            p.trail.push(p.position / p.depth * FOCAL + center);
            p.depth -= speed;
            if p.depth <= 0.0 {
                p.position = random_xy(ctx);
                p.depth = FAR_PLANE;
                p.trail.clear();
            }
            p.trail.push(p.position / p.depth * FOCAL + center);
        }
    }

    fn render(&self, canvas: &mut Canvas, _background: Option<&RgbaImage>) {
        canvas.fill_all(&Color::BLACK.with_alpha(VEIL_ALPHA).into());
        for p in self.stars.particles() {
            self.draw_star(canvas, p);
        }
    }

    fn resize(&mut self, size: Vec2, _ctx: &mut SpawnContext) {
        self.center = size * 0.5;
    }

    fn population(&self) -> usize {
        self.stars.len()
    }

    fn persistent(&self) -> bool {
        true
    }
}
