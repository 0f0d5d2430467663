//! Falling snow that piles up along the bottom edge.
//!
//! Flakes fall at their own speed with a constant sideways drift and wrap
//! horizontally. The floor is split into 20 px columns; a flake that
//! reaches the top of its column's pile sticks with 80% probability, growing
//! that pile, and is recycled above the screen either way.

use super::{Effect, EffectId, Frame};
use crate::canvas::{Canvas, Path};
use crate::emitter::{Emitter, SpawnSite};
use crate::lifecycle::Lifecycle;
use crate::particle::Particle;
use crate::renderer::Sprite;
use crate::rules::{Axes, Boundary, Physics};
use crate::spawn::SpawnContext;
use crate::system::ParticleSystem;
use crate::visuals::{BlendMode, Color, Gradient, Paint};
use glam::Vec2;
use image::RgbaImage;
use tracing::debug;

pub const FLAKE_COUNT: usize = 100;
pub const PILE_WIDTH: f32 = 20.0;
pub const PILE_OPACITY: f32 = 0.8;
pub const STICK_CHANCE: f32 = 0.8;
/// Pile growth per stuck flake, as a fraction of the flake size.
pub const PILE_GROWTH: f32 = 0.5;
/// Tallest pile as a fraction of the canvas height.
pub const PILE_CAP: f32 = 0.7;
pub const RESPAWN_Y: f32 = -10.0;
pub const SPARKLE_CHANCE: f32 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct SnowConfig {
    pub flakes: usize,
    pub size: (f32, f32),
    pub speed: (f32, f32),
    pub opacity: (f32, f32),
    pub drift: f32,
    pub pile_width: f32,
    pub stick_chance: f32,
}

impl Default for SnowConfig {
    fn default() -> Self {
        Self {
            flakes: FLAKE_COUNT,
            size: (2.0, 6.0),
            speed: (1.0, 3.0),
            opacity: (0.2, 1.0),
            drift: 1.0,
            pile_width: PILE_WIDTH,
            stick_chance: STICK_CHANCE,
        }
    }
}

impl SnowConfig {
    pub fn with_flakes(mut self, flakes: usize) -> Self {
        self.flakes = flakes;
        self
    }

    pub fn with_stick_chance(mut self, chance: f32) -> Self {
        self.stick_chance = chance;
        self
    }

    pub fn with_pile_width(mut self, width: f32) -> Self {
        self.pile_width = width.max(1.0);
        self
    }
}

/// One column of accumulated snow.
#[derive(Debug, Clone, PartialEq)]
pub struct Pile {
    pub x: f32,
    pub width: f32,
    pub height: f32,
    /// Glint chosen during update, drawn during render.
    pub sparkle: Option<Vec2>,
}

pub struct Snow {
    config: SnowConfig,
    flakes: ParticleSystem,
    piles: Vec<Pile>,
    bounds: Vec2,
}

impl Snow {
    pub fn new(config: SnowConfig, ctx: &mut SpawnContext) -> Self {
        let (size, speed) = (config.size, config.speed);
        let (opacity, drift) = (config.opacity, config.drift);
        let mut flakes = ParticleSystem::new("snow")
            .with_emitter(Emitter::Burst { count: config.flakes, site: SpawnSite::Anywhere })
            .with_physics(Physics::new().with_boundary(Boundary::Wrap {
                axes: Axes::Horizontal,
                padded: false,
            }))
            .with_lifecycle(Lifecycle::immortal())
            .with_spawner(move |ctx, e| {
                Particle::new(e.position)
                    .with_size(ctx.random_range(size.0, size.1))
                    .with_velocity(Vec2::new(ctx.signed(drift), ctx.random_range(speed.0, speed.1)))
                    .with_max_opacity(ctx.random_range(opacity.0, opacity.1))
            });
        flakes.activate(ctx);
        let mut snow = Self { config, flakes, piles: Vec::new(), bounds: ctx.bounds };
        snow.reset_piles(ctx.bounds);
        snow
    }

    fn reset_piles(&mut self, bounds: Vec2) {
        let width = self.config.pile_width;
        let count = (bounds.x.max(0.0) / width).ceil() as usize;
        self.piles = (0..count)
            .map(|i| Pile { x: i as f32 * width, width, height: 0.0, sparkle: None })
            .collect();
        self.bounds = bounds;
    }

    pub fn piles(&self) -> &[Pile] {
        &self.piles
    }

    /// Total accumulated height across all piles.
    pub fn pile_total(&self) -> f32 {
        self.piles.iter().map(|p| p.height).sum()
    }

    pub fn flakes(&self) -> &[Particle] {
        self.flakes.particles()
    }

    fn pile_index(&self, x: f32) -> Option<usize> {
        if x < 0.0 {
            return None;
        }
        let i = (x / self.config.pile_width) as usize;
        (i < self.piles.len()).then_some(i)
    }

    fn land(&mut self, ctx: &mut SpawnContext) {
        let bounds = ctx.bounds;
        let cap = bounds.y * PILE_CAP;
        for i in 0..self.flakes.len() {
            let p = &self.flakes.particles()[i];
            let (x, y, size) = (p.position.x, p.position.y, p.size);
            let pile = self.pile_index(x);
            let ground = bounds.y - pile.map_or(0.0, |j| self.piles[j].height);
            if y <= ground - size {
                continue;
            }
            if let Some(j) = pile {
                if ctx.chance(self.config.stick_chance) {
                    let pile = &mut self.piles[j];
                    pile.height = (pile.height + size * PILE_GROWTH).min(cap);
                }
            }
            let respawn = Vec2::new(ctx.random() * bounds.x, RESPAWN_Y);
            self.flakes.particles_mut()[i].position = respawn;
        }
    }
}

impl Effect for Snow {
    fn id(&self) -> EffectId {
        EffectId::Snow
    }

    fn layer_blend(&self) -> BlendMode {
        BlendMode::Screen
    }

    fn update(&mut self, frame: &mut Frame<'_>) {
        self.flakes.update(frame.time(), frame.ctx);
        self.land(frame.ctx);

        let h = frame.bounds().y;
        for pile in &mut self.piles {
            pile.sparkle = (pile.height > 0.0 && frame.ctx.chance(SPARKLE_CHANCE)).then(|| {
                Vec2::new(
                    pile.x + frame.ctx.random() * pile.width,
                    h - pile.height + frame.ctx.random() * pile.height * 0.5,
                )
            });
        }
    }

    fn render(&self, canvas: &mut Canvas, _background: Option<&RgbaImage>) {
        Sprite::Flake.draw_all(canvas, self.flakes.particles(), 0.0);

        let floor = self.bounds.y;
        for pile in self.piles.iter().filter(|p| p.height > 0.0) {
            canvas.scoped(|c| {
                c.set_alpha(PILE_OPACITY);
                let top = floor - pile.height;
                let body = Gradient::new()
                    .stop(0.0, Color::WHITE.with_alpha(0.9))
                    .stop(0.5, Color::rgb8a(240, 240, 255, 0.8))
                    .stop(1.0, Color::rgb8a(220, 220, 240, 0.7));
                let (left, right) = (pile.x, pile.x + pile.width);
                let mound = Path::new()
                    .move_to(Vec2::new(left, floor))
                    .quad_to(Vec2::new(left + pile.width * 0.5, top - 5.0), Vec2::new(right, floor))
                    .line_to(Vec2::new(left, floor));
                let shade = Paint::linear(Vec2::new(left, top), Vec2::new(left, floor), body);
                c.fill_path(&mound, &shade);

                c.set_alpha(PILE_OPACITY * 0.3);
                let glint = Color::rgb8a(200, 200, 220, 0.5);
                let line = Vec2::new(pile.width, 2.0);
                c.fill_rect(Vec2::new(pile.x, floor - 2.0), line, &glint.into());

                if let Some(sparkle) = pile.sparkle {
                    c.set_alpha(PILE_OPACITY);
                    c.fill_circle(sparkle, 1.0, &Color::WHITE.with_alpha(0.8).into());
                }
            });
        }
    }

    fn resize(&mut self, size: Vec2, _ctx: &mut SpawnContext) {
        debug!(width = size.x, height = size.y, "snow piles reset");
        self.reset_piles(size);
    }

    fn population(&self) -> usize {
        self.flakes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing;

    #[test]
    fn test_piles_cover_the_floor() {
        let mut ctx = testing::ctx();
        let snow = Snow::new(SnowConfig::default(), &mut ctx);
        assert_eq!(snow.piles().len(), 16);
        assert_eq!(snow.population(), FLAKE_COUNT);
    }

    #[test]
    fn test_wider_piles() {
        let mut ctx = testing::ctx();
        let snow = Snow::new(SnowConfig::default().with_pile_width(40.0), &mut ctx);
        assert_eq!(snow.piles().len(), 8);
        let last = &snow.piles()[7];
        assert_eq!(last.x + last.width, 320.0);
    }

    #[test]
    fn test_flakes_recycle_and_piles_grow() {
        let mut ctx = testing::ctx();
        let mut snow = Snow::new(SnowConfig::default().with_stick_chance(1.0), &mut ctx);
        testing::run(&mut snow, &mut ctx, 400);
        assert!(snow.pile_total() > 0.0);
        assert_eq!(snow.population(), FLAKE_COUNT);
        assert!(snow.flakes().iter().all(|p| p.position.y <= 240.0));
    }

    #[test]
    fn test_piles_are_capped() {
        let mut ctx = testing::ctx();
        let mut snow = Snow::new(SnowConfig::default().with_stick_chance(1.0), &mut ctx);
        testing::run(&mut snow, &mut ctx, 5000);
        assert!(snow.piles().iter().all(|p| p.height <= 240.0 * PILE_CAP + 1e-3));
    }

    #[test]
    fn test_never_sticking_leaves_floor_bare() {
        let mut ctx = testing::ctx();
        let mut snow = Snow::new(SnowConfig::default().with_stick_chance(0.0), &mut ctx);
        testing::run(&mut snow, &mut ctx, 300);
        assert_eq!(snow.pile_total(), 0.0);
    }

    #[test]
    fn test_resize_resets_piles() {
        let mut ctx = testing::ctx();
        let mut snow = Snow::new(SnowConfig::default().with_stick_chance(1.0), &mut ctx);
        testing::run(&mut snow, &mut ctx, 200);
        ctx.bounds = Vec2::new(100.0, 100.0);
        snow.resize(ctx.bounds, &mut ctx);
        assert_eq!(snow.piles().len(), 5);
        assert_eq!(snow.pile_total(), 0.0);
    }
}
