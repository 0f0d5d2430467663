//! A roaming stage spotlight.
//!
//! The whole layer is a dark radial gradient with a clear hole that drifts
//! around the centre on a Lissajous ellipse. The layer is multiplied over
//! the background, so the hole shows the image untouched and the edges
//! darken it. A faint flicker redraws the darkness at 90 to 100% strength.

use super::{Effect, EffectId, Frame};
use crate::canvas::Canvas;
use crate::spawn::SpawnContext;
use crate::visuals::{BlendMode, Color, Gradient, Paint};
use glam::Vec2;
use image::RgbaImage;

pub const TIME_STEP: f32 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct SpotlightConfig {
    /// Effect time advance per frame.
    pub time_step: f32,
    /// Ellipse radii as fractions of the canvas size.
    pub orbit: Vec2,
    /// Vertical orbit frequency relative to the horizontal one.
    pub vertical_rate: f32,
    /// Light radius as a fraction of the smaller canvas side.
    pub radius: f32,
    pub flicker_rate: f32,
    pub flicker_depth: f32,
}

impl Default for SpotlightConfig {
    fn default() -> Self {
        Self {
            time_step: TIME_STEP,
            orbit: Vec2::new(0.3, 0.25),
            vertical_rate: 0.7,
            radius: 0.4,
            flicker_rate: 15.0,
            flicker_depth: 0.05,
        }
    }
}

impl SpotlightConfig {
    pub fn with_radius(mut self, fraction: f32) -> Self {
        self.radius = fraction;
        self
    }
}

pub struct Spotlight {
    config: SpotlightConfig,
    t: f32,
    bounds: Vec2,
}

impl Spotlight {
    pub fn new(config: SpotlightConfig, ctx: &mut SpawnContext) -> Self {
        Self { config, t: 0.0, bounds: ctx.bounds }
    }

    /// Centre of the light at the current time.
    pub fn center(&self) -> Vec2 {
        let mid = self.bounds * 0.5;
        let orbit = self.bounds * self.config.orbit;
        let vertical = (self.t * self.config.vertical_rate).sin();
        mid + Vec2::new(self.t.cos(), vertical) * orbit
    }

    pub fn radius(&self) -> f32 {
        self.bounds.min_element() * self.config.radius
    }

    fn darkness(&self) -> Gradient {
        Gradient::new()
            .stop(0.0, Color::TRANSPARENT)
            .stop(0.3, Color::BLACK.with_alpha(0.1))
            .stop(0.6, Color::BLACK.with_alpha(0.4))
            .stop(0.8, Color::BLACK.with_alpha(0.7))
            .stop(1.0, Color::BLACK.with_alpha(0.85))
    }
}

impl Effect for Spotlight {
    fn id(&self) -> EffectId {
        EffectId::Spotlight
    }

    fn layer_blend(&self) -> BlendMode {
        BlendMode::Multiply
    }

    fn update(&mut self, frame: &mut Frame<'_>) {
        self.t += self.config.time_step;
        self.bounds = frame.bounds();
    }

    fn render(&self, canvas: &mut Canvas, _background: Option<&RgbaImage>) {
        let center = self.center();
        let radius = self.radius();
        if radius <= 0.0 {
            return;
        }
        let dark = Paint::radial(center, 0.0, radius, self.darkness());
        canvas.fill_all(&dark);

        let glow = Gradient::linear(Color::WHITE.with_alpha(0.1), Color::WHITE.with_alpha(0.0));
        canvas.fill_all(&Paint::radial(center, 0.0, radius * 0.2, glow));

        let depth = self.config.flicker_depth;
        let flicker = 1.0 - depth + (self.t * self.config.flicker_rate).sin() * depth;
        canvas.scoped(|c| {
            c.set_alpha(flicker);
            c.fill_all(&dark);
        });
    }

    fn resize(&mut self, size: Vec2, _ctx: &mut SpawnContext) {
        self.bounds = size;
    }
}
