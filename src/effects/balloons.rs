//! Party balloons rising from below the screen.

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

pub const BALLOON_COUNT: usize = 15;
/// Balloons start (and restart) up to this far below the bottom edge.
pub const SPAWN_DEPTH: f32 = 200.0;
pub const SWAY: f32 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct BalloonsConfig {
    pub balloons: usize,
    pub size: (f32, f32),
    pub rise: (f32, f32),
    pub opacity: (f32, f32),
    pub drift: f32,
    pub string: (f32, f32),
    pub sway: f32,
}

impl Default for BalloonsConfig {
    fn default() -> Self {
        Self {
            balloons: BALLOON_COUNT,
            size: (20.0, 50.0),
            rise: (0.5, 2.0),
            opacity: (0.7, 1.0),
            drift: 0.5,
            string: (30.0, 80.0),
            sway: SWAY,
        }
    }
}

impl BalloonsConfig {
    pub fn with_balloons(mut self, balloons: usize) -> Self {
        self.balloons = balloons;
        self
    }

    pub fn with_rise(mut self, min: f32, max: f32) -> Self {
        self.rise = (min, max);
        self
    }
}

pub struct Balloons {
    balloons: ParticleSystem,
}

impl Balloons {
    pub fn new(config: BalloonsConfig, ctx: &mut SpawnContext) -> Self {
        let c = config.clone();
        let mut balloons = ParticleSystem::new("balloons")
            .with_emitter(Emitter::Burst {
                count: config.balloons,
                site: SpawnSite::BelowBottom { depth: SPAWN_DEPTH },
            })
            .with_physics(
                Physics::new()
                    .with_rule(Rule::Wobble { amplitude: config.sway })
                    .with_boundary(Boundary::Wrap { axes: Axes::Horizontal, padded: true }),
            )
            .with_lifecycle(Lifecycle::immortal())
            .with_spawner(move |ctx, e| {
                let rise = ctx.random_range(c.rise.0, c.rise.1);
                let velocity = Vec2::new(ctx.signed(c.drift), -rise);
                let mut p = Particle::new(e.position)
                    .with_size(ctx.random_range(c.size.0, c.size.1))
                    .with_velocity(velocity)
                    .with_color(ctx.pick(Palette::Balloons))
                    .with_max_opacity(ctx.random_range(c.opacity.0, c.opacity.1));
                p.length = ctx.random_range(c.string.0, c.string.1);
                p.phase = ctx.random_angle();
                p.phase_speed = ctx.random_range(0.01, 0.03);
                p
            });
        balloons.activate(ctx);
        Self { balloons }
    }

    pub fn balloons(&self) -> &[Particle] {
        self.balloons.particles()
    }
}

impl Effect for Balloons {
    fn id(&self) -> EffectId {
        EffectId::Balloons
    }

    fn update(&mut self, frame: &mut Frame<'_>) {
        self.balloons.update(frame.time(), frame.ctx);
        let bounds = frame.bounds();
        for p in self.balloons.particles_mut() {
            if p.position.y < -p.size - p.length {
                p.position = Vec2::new(
                    frame.ctx.random() * bounds.x,
                    bounds.y + frame.ctx.random() * SPAWN_DEPTH,
                );
            }
        }
    }

    fn render(&self, canvas: &mut Canvas, _background: Option<&RgbaImage>) {
        Sprite::Balloon.draw_all(canvas, self.balloons.particles(), 0.0);
    }

    fn population(&self) -> usize {
        self.balloons.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing;

    #[test]
    fn test_balloons_start_below_and_rise() {
        let mut ctx = testing::ctx();
        let mut balloons = Balloons::new(BalloonsConfig::default(), &mut ctx);
        assert!(balloons.balloons().iter().all(|p| p.position.y >= 240.0));
        let before: f32 = balloons.balloons().iter().map(|p| p.position.y).sum();
        testing::run(&mut balloons, &mut ctx, 10);
        let after: f32 = balloons.balloons().iter().map(|p| p.position.y).sum();
        assert!(after < before);
    }

    #[test]
    fn test_balloons_recycle_forever() {
        let mut ctx = testing::ctx();
        let mut balloons = Balloons::new(BalloonsConfig::default().with_rise(5.0, 6.0), &mut ctx);
        testing::run(&mut balloons, &mut ctx, 500);
        assert_eq!(balloons.population(), BALLOON_COUNT);
        for p in balloons.balloons() {
            assert!(p.position.y >= -p.size - p.length - 6.0);
            assert!(p.position.x >= -p.size - 1.0 && p.position.x <= 320.0 + p.size + 1.0);
        }
    }

    #[test]
    fn test_balloon_count_override() {
        let mut ctx = testing::ctx();
        let mut balloons = Balloons::new(BalloonsConfig::default().with_balloons(3), &mut ctx);
        testing::run(&mut balloons, &mut ctx, 50);
        assert_eq!(balloons.population(), 3);
    }

    #[test]
    fn test_colors_come_from_palette() {
        let mut ctx = testing::ctx();
        let balloons = Balloons::new(BalloonsConfig::default(), &mut ctx);
        let palette: Vec<_> =
            (0..Palette::Balloons.len()).map(|i| Palette::Balloons.color(i)).collect();
        assert!(balloons.balloons().iter().all(|p| palette.contains(&p.color)));
    }
}
