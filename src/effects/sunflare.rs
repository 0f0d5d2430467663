//! A low sun drifting across the sky with lens ghosts and light rays.

use super::lensflare::hexagon;
use super::{Effect, EffectId, Frame};
use crate::canvas::Canvas;
use crate::spawn::SpawnContext;
use crate::visuals::{BlendMode, Color, Gradient, Paint};
use glam::Vec2;
use image::RgbaImage;
use std::f32::consts::TAU;

pub const TIME_STEP: f32 = 0.01;
pub const GLOW_RADIUS: f32 = 150.0;
pub const SUN_RADIUS: f32 = 60.0;
pub const CORE_RADIUS: f32 = 20.0;
pub const LONG_RAYS: usize = 12;
pub const SHORT_RAYS: usize = 8;

/// `(size, opacity, rgb, offset)` of each ghost, sun to centre and beyond.
pub const GHOSTS: [(f32, f32, [u8; 3], f32); 7] = [
    (40.0, 0.6, [255, 200, 100], 0.2),
    (25.0, 0.4, [100, 200, 255], 0.4),
    (60.0, 0.3, [255, 100, 200], 0.6),
    (30.0, 0.5, [200, 255, 100], 0.8),
    (45.0, 0.4, [255, 150, 255], 1.0),
    (20.0, 0.6, [100, 255, 255], 1.2),
    (35.0, 0.3, [255, 255, 100], 1.4),
];

/// Ghost offsets that also get a hexagonal aperture shape.
const HEXAGON_OFFSETS: [f32; 2] = [0.6, 1.0];

#[derive(Debug, Clone, PartialEq)]
pub struct SunflareConfig {
    pub time_step: f32,
    /// Sun path: centre and reach as fractions of the canvas.
    pub path_center: Vec2,
    pub path_reach: Vec2,
    pub path_rate: Vec2,
    pub long_rays: usize,
    pub short_rays: usize,
}

impl Default for SunflareConfig {
    fn default() -> Self {
        Self {
            time_step: TIME_STEP,
            path_center: Vec2::new(0.5, 0.3),
            path_reach: Vec2::new(0.4, 0.2),
            path_rate: Vec2::new(0.3, 0.2),
            long_rays: LONG_RAYS,
            short_rays: SHORT_RAYS,
        }
    }
}

impl SunflareConfig {
    pub fn with_rays(mut self, long: usize, short: usize) -> Self {
        self.long_rays = long;
        self.short_rays = short;
        self
    }
}

pub struct Sunflare {
    config: SunflareConfig,
    t: f32,
    bounds: Vec2,
}

impl Sunflare {
    pub fn new(config: SunflareConfig, ctx: &mut SpawnContext) -> Self {
        Self { config, t: 0.0, bounds: ctx.bounds }
    }

    pub fn sun(&self) -> Vec2 {
        let c = &self.config;
        let swing = Vec2::new((self.t * c.path_rate.x).cos(), (self.t * c.path_rate.y).sin());
        self.bounds * (c.path_center + swing * c.path_reach)
    }

    fn draw_sun(&self, c: &mut Canvas, at: Vec2) {
        let outer = Gradient::new()
            .stop(0.0, Color::WHITE.with_alpha(0.8))
            .stop(0.1, Color::rgb8a(255, 255, 200, 0.6))
            .stop(0.3, Color::rgb8a(255, 200, 100, 0.4))
            .stop(0.6, Color::rgb8a(255, 150, 50, 0.2))
            .stop(1.0, Color::rgb8a(255, 100, 0, 0.0));
        c.fill_circle(at, GLOW_RADIUS, &Paint::radial(at, 0.0, GLOW_RADIUS, outer));

        let inner = Gradient::new()
            .stop(0.0, Color::WHITE)
            .stop(0.3, Color::rgb8a(255, 255, 150, 0.9))
            .stop(0.7, Color::rgb8a(255, 200, 100, 0.7))
            .stop(1.0, Color::rgb8a(255, 150, 50, 0.5));
        c.fill_circle(at, SUN_RADIUS, &Paint::radial(at, 0.0, SUN_RADIUS, inner));

        let core = Gradient::linear(Color::WHITE, Color::WHITE.with_alpha(0.8));
        c.fill_circle(at, CORE_RADIUS, &Paint::radial(at, 0.0, CORE_RADIUS, core));
    }

    fn draw_ghosts(&self, c: &mut Canvas, sun: Vec2) {
        let axis = self.bounds * 0.5 - sun;
        for (size, opacity, [r, g, b], offset) in GHOSTS {
            let wobble = (self.t * 2.0 + offset * 10.0).sin() * 5.0;
            let at = sun + axis * offset + Vec2::splat(wobble);
            let body = Gradient::new()
                .stop(0.0, Color::rgb8a(r, g, b, opacity * 0.8))
                .stop(0.5, Color::rgb8a(r, g, b, opacity * 0.4))
                .stop(1.0, Color::rgb8a(r, g, b, 0.0));
            c.fill_circle(at, size, &Paint::radial(at, 0.0, size, body));

            if HEXAGON_OFFSETS.contains(&offset) {
                let alpha = opacity * 0.6;
                c.scoped(|c| {
                    c.set_alpha(alpha);
                    c.fill_path(&hexagon(at, size * 0.7), &Color::rgb8a(r, g, b, alpha).into());
                });
            }
        }
    }

    fn draw_rays(&self, c: &mut Canvas, sun: Vec2) {
        let t = self.t;
        c.scoped(|c| {
            c.set_blend(BlendMode::Screen);

            let length = self.bounds.max_element();
            let n = self.config.long_rays;
            for i in 0..n {
                let angle = i as f32 / n as f32 * TAU + t * 0.5;
                let width = 3.0 + (t * 3.0 + i as f32).sin() * 2.0;
                let end = sun + Vec2::from_angle(angle) * length;
                let fade = Gradient::new()
                    .stop(0.0, Color::rgb8a(255, 255, 200, 0.8))
                    .stop(0.1, Color::rgb8a(255, 255, 150, 0.6))
                    .stop(0.3, Color::rgb8a(255, 200, 100, 0.3))
                    .stop(0.6, Color::rgb8a(255, 150, 50, 0.1))
                    .stop(1.0, Color::rgb8a(255, 100, 0, 0.0));
                c.stroke_line(sun, end, width, &Paint::linear(sun, end, fade));
            }

            let n = self.config.short_rays;
            for i in 0..n {
                let angle = i as f32 / n as f32 * TAU - t * 0.3;
                let length = 200.0 + (t * 2.0 + i as f32).sin() * 50.0;
                let width = 6.0 + (t * 4.0 + i as f32).cos() * 3.0;
                let end = sun + Vec2::from_angle(angle) * length;
                let fade = Gradient::new()
                    .stop(0.0, Color::WHITE.with_alpha(0.9))
                    .stop(0.2, Color::rgb8a(255, 255, 200, 0.7))
                    .stop(0.5, Color::rgb8a(255, 200, 100, 0.4))
                    .stop(1.0, Color::rgb8a(255, 150, 50, 0.0));
                c.stroke_line(sun, end, width, &Paint::linear(sun, end, fade));
            }
        });
    }
}

impl Effect for Sunflare {
    fn id(&self) -> EffectId {
        EffectId::Sunflare
    }

    fn layer_blend(&self) -> BlendMode {
        BlendMode::Screen
    }

    fn update(&mut self, frame: &mut Frame<'_>) {
        self.t += self.config.time_step;
        self.bounds = frame.bounds();
    }

    fn render(&self, canvas: &mut Canvas, _background: Option<&RgbaImage>) {
        let sun = self.sun();
        self.draw_sun(canvas, sun);
        self.draw_ghosts(canvas, sun);
        self.draw_rays(canvas, sun);
    }

    fn resize(&mut self, size: Vec2, _ctx: &mut SpawnContext) {
        self.bounds = size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing;

    #[test]
    fn test_sun_moves_on_its_arc() {
        let mut ctx = testing::ctx();
        let mut flare = Sunflare::new(SunflareConfig::default(), &mut ctx);
        let start = flare.sun();
        assert!((start - Vec2::new(320.0 * 0.9, 240.0 * 0.3)).length() < 1e-3);
        testing::run(&mut flare, &mut ctx, 500);
        let later = flare.sun();
        assert!(later.x < start.x);
        assert!(later.y >= 240.0 * 0.1 - 1e-3 && later.y <= 240.0 * 0.5 + 1e-3);
    }

    #[test]
    fn test_sun_is_bright() {
        let mut ctx = testing::ctx();
        let flare = Sunflare::new(SunflareConfig::default().with_rays(0, 0), &mut ctx);
        let mut canvas = Canvas::new(320, 240);
        flare.render(&mut canvas, None);
        let sun = flare.sun();
        let px = canvas.pixel(sun.x as u32, sun.y as u32);
        assert!(px.a > 0.95 && px.r > 0.95);
    }
}
