//! Camera lens flare that follows the pointer.
//!
//! A bright light hovers near the pointer and casts a chain of ghost
//! elements along the line through the screen centre. Ghosts fade as the
//! light moves away from the centre; chromatic fringes and anamorphic
//! streaks sit on top of the light. The shape helpers here are shared with
//! the sun flare.

use super::{Effect, EffectId, Frame};
use crate::canvas::{Canvas, Path};
use crate::input::PointerEvent;
use crate::renderer::glow;
use crate::spawn::SpawnContext;
use crate::visuals::{BlendMode, Color, Gradient, Paint};
use glam::Vec2;
use image::RgbaImage;
use std::f32::consts::TAU;

pub const TIME_STEP: f32 = 0.02;

/// Ghost element outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlareShape {
    Circle,
    Hexagon,
    Ring,
    Starburst,
}

/// One ghost on the light-to-centre axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlareElement {
    pub size: f32,
    pub opacity: f32,
    pub rgb: [u8; 3],
    pub shape: FlareShape,
    /// Position along the axis: 0 at the light, 1 at the centre.
    pub offset: f32,
    /// Rotation rate relative to effect time.
    pub spin: f32,
}

const fn element(
    size: f32,
    opacity: f32,
    rgb: [u8; 3],
    shape: FlareShape,
    offset: f32,
    spin: f32,
) -> FlareElement {
    FlareElement { size, opacity, rgb, shape, offset, spin }
}

pub const GHOSTS: [FlareElement; 9] = [
    element(60.0, 0.8, [255, 255, 255], FlareShape::Circle, 0.1, 0.0),
    element(40.0, 0.6, [100, 150, 255], FlareShape::Hexagon, 0.25, 0.5),
    element(80.0, 0.4, [255, 100, 150], FlareShape::Ring, 0.4, 0.0),
    element(35.0, 0.7, [150, 255, 100], FlareShape::Circle, 0.6, 0.0),
    element(120.0, 0.3, [255, 200, 100], FlareShape::Starburst, 0.8, -0.3),
    element(25.0, 0.8, [100, 255, 255], FlareShape::Hexagon, 1.0, 0.7),
    element(90.0, 0.2, [255, 150, 255], FlareShape::Ring, 1.2, 0.0),
    element(45.0, 0.5, [255, 255, 150], FlareShape::Circle, 1.4, 0.0),
    element(30.0, 0.6, [200, 100, 255], FlareShape::Hexagon, 1.6, -0.4),
];

fn tint(rgb: [u8; 3], alpha: f32) -> Color {
    Color::rgb8a(rgb[0], rgb[1], rgb[2], alpha)
}

/// Six-sided outline with a vertex on the +x axis.
pub fn hexagon(center: Vec2, radius: f32) -> Path {
    Path::regular(center, radius, 6, 0.0)
}

/// Draw one ghost element centred on the local origin.
pub fn draw_shape(c: &mut Canvas, shape: FlareShape, size: f32, rgb: [u8; 3]) {
    match shape {
        FlareShape::Circle => {
            let body = Gradient::new()
                .stop(0.0, tint(rgb, 0.8))
                .stop(0.3, tint(rgb, 0.6))
                .stop(0.7, tint(rgb, 0.2))
                .stop(1.0, tint(rgb, 0.0));
            c.fill_circle(Vec2::ZERO, size, &Paint::radial(Vec2::ZERO, 0.0, size, body));
        }
        FlareShape::Hexagon => {
            let outline = hexagon(Vec2::ZERO, size);
            c.fill_path(&outline, &tint(rgb, 0.6).into());
            c.fill_path(&outline, &glow(Vec2::ZERO, size * 0.7, tint(rgb, 0.8)));
        }
        FlareShape::Ring => {
            c.stroke_circle(Vec2::ZERO, size, 8.0, &tint(rgb, 0.6).into());
            c.stroke_circle(Vec2::ZERO, size * 0.6, 4.0, &tint(rgb, 0.8).into());
        }
        FlareShape::Starburst => {
            let spike = tint(rgb, 0.6).into();
            for i in 0..8 {
                let angle = i as f32 * TAU / 8.0;
                c.stroke_line(Vec2::ZERO, Vec2::from_angle(angle) * size, 3.0, &spike);
            }
            c.fill_circle(Vec2::ZERO, size * 0.3, &glow(Vec2::ZERO, size * 0.3, tint(rgb, 0.8)));
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LensflareConfig {
    pub time_step: f32,
    pub ghosts: Vec<FlareElement>,
    /// Light offset from the pointer: `(cos(t * rate.x), sin(t * rate.y)) * reach`.
    pub orbit_rate: Vec2,
    pub orbit_reach: Vec2,
    /// Ghosts vanish once the light is this fraction of the width from centre.
    pub fade_distance: f32,
}

impl Default for LensflareConfig {
    fn default() -> Self {
        Self {
            time_step: TIME_STEP,
            ghosts: GHOSTS.to_vec(),
            orbit_rate: Vec2::new(0.5, 0.3),
            orbit_reach: Vec2::new(100.0, 50.0),
            fade_distance: 0.8,
        }
    }
}

impl LensflareConfig {
    pub fn with_ghosts(mut self, ghosts: Vec<FlareElement>) -> Self {
        self.ghosts = ghosts;
        self
    }
}

pub struct Lensflare {
    config: LensflareConfig,
    t: f32,
    pointer: Vec2,
    bounds: Vec2,
}

impl Lensflare {
    /// The light starts over the centre until the pointer moves.
    pub fn new(config: LensflareConfig, ctx: &mut SpawnContext) -> Self {
        Self { config, t: 0.0, pointer: ctx.bounds * 0.5, bounds: ctx.bounds }
    }

    pub fn light(&self) -> Vec2 {
        let rate = self.config.orbit_rate;
        let wobble = Vec2::new((self.t * rate.x).cos(), (self.t * rate.y).sin());
        self.pointer + wobble * self.config.orbit_reach
    }

    /// Ghost opacity multiplier for the current light position.
    pub fn ghost_strength(&self) -> f32 {
        let distance = (self.bounds * 0.5 - self.light()).length();
        let reach = self.bounds.x * self.config.fade_distance;
        if reach <= 0.0 {
            return 0.0;
        }
        (1.0 - distance / reach).max(0.0)
    }

    fn draw_light(&self, c: &mut Canvas, at: Vec2) {
        let outer = Gradient::new()
            .stop(0.0, Color::WHITE.with_alpha(0.9))
            .stop(0.2, Color::rgb8a(255, 255, 200, 0.6))
            .stop(0.5, Color::rgb8a(255, 200, 100, 0.3))
            .stop(1.0, Color::rgb8a(255, 150, 50, 0.0));
        c.fill_circle(at, 120.0, &Paint::radial(at, 0.0, 120.0, outer));
        let core = Gradient::new()
            .stop(0.0, Color::WHITE)
            .stop(0.5, Color::WHITE.with_alpha(0.8))
            .stop(1.0, Color::WHITE.with_alpha(0.4));
        c.fill_circle(at, 30.0, &Paint::radial(at, 0.0, 30.0, core));
    }

    fn draw_fringes(&self, c: &mut Canvas, at: Vec2) {
        c.scoped(|c| {
            c.set_blend(BlendMode::Screen);
            c.set_alpha(0.3);
            for (dx, rgb) in [(-3.0, [255, 0, 0]), (0.0, [0, 255, 0]), (3.0, [0, 0, 255])] {
                let p = at + Vec2::new(dx, 0.0);
                c.fill_circle(p, 40.0, &glow(p, 40.0, tint(rgb, 0.8)));
            }
        });
    }

    fn draw_streaks(&self, c: &mut Canvas, at: Vec2, distance: f32) {
        let band = |rgb: [u8; 3], peak: f32| {
            Gradient::new()
                .stop(0.0, tint(rgb, 0.0))
                .stop(0.4, tint(rgb, peak))
                .stop(0.6, tint(rgb, peak))
                .stop(1.0, tint(rgb, 0.0))
        };
        c.scoped(|c| {
            c.set_blend(BlendMode::Screen);
            c.set_alpha((distance / 200.0).min(0.6));
            let (dx, dy) = (Vec2::new(200.0, 0.0), Vec2::new(0.0, 200.0));
            let h = Paint::linear(at - dx, at + dx, band([100, 150, 255], 0.6));
            c.fill_rect(at - Vec2::new(200.0, 2.0), Vec2::new(400.0, 4.0), &h);
            let v = Paint::linear(at - dy, at + dy, band([255, 150, 100], 0.4));
            c.fill_rect(at - Vec2::new(2.0, 200.0), Vec2::new(4.0, 400.0), &v);
        });
    }
}

impl Effect for Lensflare {
    fn id(&self) -> EffectId {
        EffectId::Lensflare
    }

    fn layer_blend(&self) -> BlendMode {
        BlendMode::Screen
    }

    fn update(&mut self, frame: &mut Frame<'_>) {
        self.t += self.config.time_step;
        self.bounds = frame.bounds();
    }

    fn render(&self, canvas: &mut Canvas, _background: Option<&RgbaImage>) {
        let light = self.light();
        let axis = self.bounds * 0.5 - light;
        let strength = self.ghost_strength();

        self.draw_light(canvas, light);
        for ghost in &self.config.ghosts {
            let wobble = (self.t * 3.0 + ghost.offset * 10.0).sin() * 3.0;
            let at = light + axis * ghost.offset + Vec2::splat(wobble);
            canvas.scoped(|c| {
                c.set_alpha(ghost.opacity * strength);
                c.translate(at);
                c.rotate(self.t * ghost.spin);
                draw_shape(c, ghost.shape, ghost.size, ghost.rgb);
            });
        }
        self.draw_fringes(canvas, light);
        self.draw_streaks(canvas, light, axis.length());
    }

    fn resize(&mut self, size: Vec2, _ctx: &mut SpawnContext) {
        self.bounds = size;
    }

    fn pointer(&mut self, event: PointerEvent, _frame: &mut Frame<'_>) {
        self.pointer = event.position();
    }
}
