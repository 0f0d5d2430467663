//! The background cut into tiles that shuffle and reassemble.
//!
//! A 300-frame cycle runs through four phases:
//!
//! | Phase | Frames | Tiles |
//! |-------|--------|-------|
//! | Scrambling | 60 | ease toward random targets, bordered |
//! | Scrambled | 120 | keep easing, bordered |
//! | Descrambling | 60 | ease back home |
//! | Normal | 60 | at rest |
//!
//! Targets are drawn once, on entering the scrambling phase. Every frame
//! each tile moves 8% of the way to its target position, rotation, scale
//! and opacity.

use super::{Effect, EffectId, Frame};
use crate::canvas::Canvas;
use crate::spawn::SpawnContext;
use crate::visuals::Color;
use glam::Vec2;
use image::RgbaImage;
use std::f32::consts::PI;
use tracing::debug;

pub const TILE_SIZE: f32 = 80.0;
pub const EASING: f32 = 0.08;
pub const SCRAMBLING_FRAMES: u32 = 60;
pub const SCRAMBLED_FRAMES: u32 = 120;
pub const DESCRAMBLING_FRAMES: u32 = 60;
pub const NORMAL_FRAMES: u32 = 60;
const FALLBACK_FILL: u32 = 0x333333;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Scrambling,
    Scrambled,
    Descrambling,
    Normal,
}

impl Phase {
    fn bordered(self) -> bool {
        matches!(self, Phase::Scrambling | Phase::Scrambled)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrambleConfig {
    pub tile_size: f32,
    pub easing: f32,
    /// Frames spent in each phase, in cycle order.
    pub phases: [u32; 4],
    pub scale: (f32, f32),
    pub opacity: (f32, f32),
}

impl Default for ScrambleConfig {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            easing: EASING,
            phases: [SCRAMBLING_FRAMES, SCRAMBLED_FRAMES, DESCRAMBLING_FRAMES, NORMAL_FRAMES],
            scale: (0.3, 1.0),
            opacity: (0.7, 1.0),
        }
    }
}

impl ScrambleConfig {
    pub fn with_tile_size(mut self, size: f32) -> Self {
        self.tile_size = size.max(1.0);
        self
    }

    pub fn with_phases(mut self, phases: [u32; 4]) -> Self {
        self.phases = phases;
        self
    }

    fn cycle(&self) -> u32 {
        self.phases.iter().sum::<u32>().max(1)
    }

    fn phase_at(&self, t: u32) -> Phase {
        let [a, b, c, _] = self.phases;
        if t < a {
            Phase::Scrambling
        } else if t < a + b {
            Phase::Scrambled
        } else if t < a + b + c {
            Phase::Descrambling
        } else {
            Phase::Normal
        }
    }
}

/// Animated tile state. Both ends of every interpolation are kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    /// Home position (top-left) and source region origin.
    pub home: Vec2,
    pub size: Vec2,
    pub position: Vec2,
    pub target: Vec2,
    pub rotation: f32,
    pub target_rotation: f32,
    pub scale: f32,
    pub target_scale: f32,
    pub opacity: f32,
    pub target_opacity: f32,
}

impl Tile {
    fn at_home(home: Vec2, size: Vec2) -> Self {
        Self {
            home,
            size,
            position: home,
            target: home,
            rotation: 0.0,
            target_rotation: 0.0,
            scale: 1.0,
            target_scale: 1.0,
            opacity: 1.0,
            target_opacity: 1.0,
        }
    }

    fn ease(&mut self, k: f32) {
        self.position += (self.target - self.position) * k;
        self.rotation += (self.target_rotation - self.rotation) * k;
        self.scale += (self.target_scale - self.scale) * k;
        self.opacity += (self.target_opacity - self.opacity) * k;
    }
}

pub struct Scramble {
    config: ScrambleConfig,
    tiles: Vec<Tile>,
    phase: Phase,
    cycle_time: u32,
}

impl Scramble {
    pub fn new(config: ScrambleConfig, ctx: &mut SpawnContext) -> Self {
        let mut scramble = Self { config, tiles: Vec::new(), phase: Phase::Normal, cycle_time: 0 };
        scramble.build_tiles(ctx.bounds);
        scramble
    }

    fn build_tiles(&mut self, bounds: Vec2) {
        let size = self.config.tile_size;
        let cols = (bounds.x.max(0.0) / size).ceil() as usize;
        let rows = (bounds.y.max(0.0) / size).ceil() as usize;
        self.tiles = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| Vec2::new(col as f32, row as f32) * size))
            .map(|home| Tile::at_home(home, Vec2::splat(size)))
            .collect();
        self.phase = Phase::Normal;
        self.cycle_time = 0;
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn scramble(&mut self, ctx: &mut SpawnContext) {
        let bounds = ctx.bounds;
        let (scale, opacity) = (self.config.scale, self.config.opacity);
        for tile in &mut self.tiles {
            let room = (bounds - tile.size).max(Vec2::ZERO);
            tile.target = Vec2::new(ctx.random() * room.x, ctx.random() * room.y);
            tile.target_rotation = ctx.signed(PI);
            tile.target_scale = ctx.random_range(scale.0, scale.1);
            tile.target_opacity = ctx.random_range(opacity.0, opacity.1);
        }
    }

    fn descramble(&mut self) {
        for tile in &mut self.tiles {
            tile.target = tile.home;
            tile.target_rotation = 0.0;
            tile.target_scale = 1.0;
            tile.target_opacity = 1.0;
        }
    }
}

impl Effect for Scramble {
    fn id(&self) -> EffectId {
        EffectId::Scramble
    }

    fn update(&mut self, frame: &mut Frame<'_>) {
        self.cycle_time = (self.cycle_time + 1) % self.config.cycle();
        let next = self.config.phase_at(self.cycle_time);
        if next != self.phase {
            match next {
                Phase::Scrambling => self.scramble(frame.ctx),
                Phase::Descrambling => self.descramble(),
                Phase::Scrambled | Phase::Normal => {}
            }
            self.phase = next;
        }
        let k = self.config.easing;
        for tile in &mut self.tiles {
            tile.ease(k);
        }
    }

    fn render(&self, canvas: &mut Canvas, background: Option<&RgbaImage>) {
        let fallback = Color::hex(FALLBACK_FILL);
        let border = Color::WHITE.with_alpha(0.3);
        for tile in &self.tiles {
            canvas.scoped(|c| {
                c.set_alpha(tile.opacity);
                c.translate(tile.position + tile.size * 0.5);
                c.rotate(tile.rotation);
                c.scale(Vec2::splat(tile.scale));
                let min = -tile.size * 0.5;
                match background {
                    Some(image) => c.draw_image(image, tile.home, tile.size, min, tile.size),
                    None => c.fill_rect(min, tile.size, &fallback.into()),
                }
                if self.phase.bordered() {
                    let max = tile.size * 0.5;
                    let corners = [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)];
                    c.stroke_polygon(&corners, 1.0, &border.into());
                }
            });
        }
    }

    fn resize(&mut self, size: Vec2, _ctx: &mut SpawnContext) {
        self.build_tiles(size);
        debug!(tiles = self.tiles.len(), "scramble tiles rebuilt");
    }

    fn population(&self) -> usize {
        self.tiles.len()
    }
}
