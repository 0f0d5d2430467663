//! Lightning storm: occasional forked bolts with a screen flash.

use super::{Effect, EffectId, Frame};
use crate::canvas::Canvas;
use crate::spawn::SpawnContext;
use crate::visuals::{Color, Palette};
use glam::Vec2;
use image::RgbaImage;
use std::f32::consts::PI;

pub const STRIKE_CHANCE: f32 = 0.008;
pub const BOLT_SEGMENTS: usize = 25;
pub const BRANCH_SEGMENTS: usize = 8;
pub const BRANCHES: usize = 3;
pub const FLASH_OPACITY: f32 = 0.3;
pub const FLASH_DECAY: f32 = 0.02;
/// Alpha of the blue wash shown while any bolt is alive.
pub const TINT_ALPHA: f32 = 0.05;
const TINT: u32 = 0x87CEEB;

#[derive(Debug, Clone, PartialEq)]
pub struct LightningConfig {
    pub strike_chance: f32,
    pub segments: usize,
    pub branches: usize,
    /// Horizontal wander of the bolt's foot relative to its top.
    pub lean: f32,
    /// Jitter applied to interior points, `(±x, ±y)`.
    pub jaggedness: Vec2,
    pub life: (f32, f32),
    pub thickness: (f32, f32),
}

impl Default for LightningConfig {
    fn default() -> Self {
        Self {
            strike_chance: STRIKE_CHANCE,
            segments: BOLT_SEGMENTS,
            branches: BRANCHES,
            lean: 100.0,
            jaggedness: Vec2::new(30.0, 15.0),
            life: (10.0, 30.0),
            thickness: (2.0, 6.0),
        }
    }
}

impl LightningConfig {
    pub fn with_strike_chance(mut self, chance: f32) -> Self {
        self.strike_chance = chance;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub points: Vec<Vec2>,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bolt {
    pub points: Vec<Vec2>,
    pub branches: Vec<Branch>,
    pub life: f32,
    pub max_life: f32,
    pub thickness: f32,
    pub color: Color,
}

impl Bolt {
    pub fn opacity(&self) -> f32 {
        (1.0 - self.life / self.max_life).max(0.0)
    }
}

/// Straight line from `from` to `to` in `segments` steps, interior points
/// jittered by up to `jitter` on each axis. Endpoints are exact.
pub fn jagged_path(
    from: Vec2,
    to: Vec2,
    segments: usize,
    jitter: Vec2,
    ctx: &mut SpawnContext,
) -> Vec<Vec2> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| {
            let point = from.lerp(to, i as f32 / segments as f32);
            if i > 0 && i < segments {
                point + Vec2::new(ctx.signed(jitter.x), ctx.signed(jitter.y))
            } else {
                point
            }
        })
        .collect()
}

pub struct Lightning {
    config: LightningConfig,
    bolts: Vec<Bolt>,
    flash: f32,
}

impl Lightning {
    pub fn new(config: LightningConfig, _ctx: &mut SpawnContext) -> Self {
        Self { config, bolts: Vec::new(), flash: 0.0 }
    }

    pub fn bolts(&self) -> &[Bolt] {
        &self.bolts
    }

    pub fn flash(&self) -> f32 {
        self.flash
    }

    /// Add a bolt from a random point on the top edge to the bottom edge.
    pub fn strike(&mut self, ctx: &mut SpawnContext) {
        let c = &self.config;
        let bounds = ctx.bounds;
        let top = Vec2::new(ctx.random() * bounds.x, 0.0);
        let foot = Vec2::new(top.x + ctx.signed(c.lean), bounds.y);
        let points = jagged_path(top, foot, c.segments, c.jaggedness, ctx);

        let branches = (0..c.branches)
            .filter_map(|_| {
                if points.len() < 3 {
                    return None;
                }
                let interior = points.len() - 2;
                let start = points[1 + (ctx.random() * interior as f32) as usize % interior];
                let length = ctx.random_range(50.0, 150.0);
                let angle = ctx.signed(PI * 0.4);
                let end = start + Vec2::from_angle(angle) * length;
                Some(Branch {
                    points: jagged_path(start, end, BRANCH_SEGMENTS, c.jaggedness, ctx),
                    opacity: ctx.random_range(0.2, 1.0),
                })
            })
            .collect();

        let color = ctx.pick(Palette::Lightning);
        self.bolts.push(Bolt {
            points,
            branches,
            life: 0.0,
            max_life: ctx.random_range(c.life.0, c.life.1),
            thickness: ctx.random_range(c.thickness.0, c.thickness.1),
            color,
        });
        self.flash = FLASH_OPACITY;
    }

    fn draw_bolt(c: &mut Canvas, bolt: &Bolt) {
        let o = bolt.opacity();
        c.set_alpha(o);
        c.stroke_polyline(&bolt.points, bolt.thickness, &bolt.color.into());
        c.set_alpha((o * 1.5).min(1.0));
        c.stroke_polyline(&bolt.points, bolt.thickness * 0.3, &Color::WHITE.into());

        for branch in &bolt.branches {
            c.set_alpha(o * branch.opacity * 0.7);
            c.stroke_polyline(&branch.points, bolt.thickness * 0.6, &bolt.color.into());
            c.set_alpha(o * branch.opacity);
            c.stroke_polyline(&branch.points, bolt.thickness * 0.2, &Color::WHITE.into());
        }
    }
}

impl Effect for Lightning {
    fn id(&self) -> EffectId {
        EffectId::Lightning
    }

    fn update(&mut self, frame: &mut Frame<'_>) {
        if frame.ctx.chance(self.config.strike_chance) {
            self.strike(frame.ctx);
        }
        for bolt in &mut self.bolts {
            bolt.life += 1.0;
        }
        self.bolts.retain(|b| b.life <= b.max_life);
        if self.flash > 0.0 {
            self.flash = (self.flash - FLASH_DECAY).max(0.0);
        }
    }

    fn render(&self, canvas: &mut Canvas, _background: Option<&RgbaImage>) {
        for bolt in &self.bolts {
            canvas.scoped(|c| Self::draw_bolt(c, bolt));
        }
        if self.flash > 0.0 {
            canvas.fill_all(&Color::WHITE.with_alpha(self.flash).into());
        }
        if !self.bolts.is_empty() {
            canvas.fill_all(&Color::hex(TINT).with_alpha(TINT_ALPHA).into());
        }
    }

    fn population(&self) -> usize {
        self.bolts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing;

    #[test]
    fn test_jagged_path_keeps_endpoints() {
        let mut ctx = testing::ctx();
        let (a, b) = (Vec2::new(10.0, 0.0), Vec2::new(60.0, 240.0));
        let path = jagged_path(a, b, 25, Vec2::new(30.0, 15.0), &mut ctx);
        assert_eq!(path.len(), 26);
        assert_eq!(path[0], a);
        assert_eq!(path[25], b);
        for (i, p) in path.iter().enumerate() {
            let straight = a.lerp(b, i as f32 / 25.0);
            assert!((p.x - straight.x).abs() <= 30.0 && (p.y - straight.y).abs() <= 15.0);
        }
    }

    #[test]
    fn test_strike_builds_bolt_and_flash() {
        let mut ctx = testing::ctx();
        let mut storm = Lightning::new(LightningConfig::default(), &mut ctx);
        storm.strike(&mut ctx);
        let bolt = &storm.bolts()[0];
        assert_eq!(bolt.points.len(), BOLT_SEGMENTS + 1);
        assert_eq!(bolt.branches.len(), BRANCHES);
        assert!(bolt.branches.iter().all(|b| b.points.len() == BRANCH_SEGMENTS + 1));
        assert_eq!(storm.flash(), FLASH_OPACITY);
    }

    #[test]
    fn test_bolts_and_flash_decay() {
        let mut ctx = testing::ctx();
        let config = LightningConfig::default().with_strike_chance(0.0);
        let mut storm = Lightning::new(config, &mut ctx);
        storm.strike(&mut ctx);
        testing::run(&mut storm, &mut ctx, 15);
        assert!(storm.flash() < FLASH_OPACITY && storm.flash() >= 0.0);
        testing::run(&mut storm, &mut ctx, 20);
        assert_eq!(storm.population(), 0);
        assert_eq!(storm.flash(), 0.0);
    }

    #[test]
    fn test_flash_paints_screen() {
        let mut ctx = testing::ctx();
        let mut storm = Lightning::new(LightningConfig::default(), &mut ctx);
        storm.strike(&mut ctx);
        let mut canvas = Canvas::new(320, 240);
        storm.render(&mut canvas, None);
        assert!(canvas.pixel(0, 120).a >= FLASH_OPACITY - 1e-3);
    }
}
