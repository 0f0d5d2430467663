//! The effect catalogue.
//!
//! Sixteen effects share one engine: most are a handful of
//! [`ParticleSystem`](crate::system::ParticleSystem)s with a sprite, a few
//! are procedural (spotlight, flares, glitch, lightning, scramble) and one
//! drives the [`WaveGrid`](crate::wave::WaveGrid). Each effect module has a
//! `*Config` record built from named constants, with `with_*` overrides for
//! tests.
//!
//! | Id | Kind | Layer blend |
//! |----|------|-------------|
//! | `snow` | particles + piles | screen |
//! | `balloons` | particles | alpha |
//! | `spotlight` | procedural | multiply |
//! | `bubbles` | particles | alpha |
//! | `scramble` | image tiles | alpha |
//! | `sunflare` | procedural | screen |
//! | `lensflare` | procedural, pointer-driven | screen |
//! | `fireflies` | particles | alpha |
//! | `rain` | particles + splashes | alpha |
//! | `glitch` | image artefacts | alpha |
//! | `smoke` | particles | alpha |
//! | `lightning` | procedural | alpha |
//! | `starfield` | 3D particles, persistent canvas | screen |
//! | `dust` | particles | alpha |
//! | `hearts` | particles | alpha |
//! | `water-ripple` | wave grid | alpha |
//!
//! # Driving an effect
//!
//! ```ignore
//! let mut effect = effects::create(EffectId::Snow, &mut ctx);
//! let mut frame = Frame { frame: 0, now: 0.0, ctx: &mut ctx, scheduler: &mut scheduler };
//! effect.update(&mut frame);
//! effect.render(&mut canvas, background.as_ref());
//! ```

pub mod balloons;
pub mod bubbles;
pub mod dust;
pub mod fireflies;
pub mod glitch;
pub mod hearts;
pub mod lensflare;
pub mod lightning;
pub mod rain;
pub mod scramble;
pub mod smoke;
pub mod snow;
pub mod spotlight;
pub mod starfield;
pub mod sunflare;
pub mod water;

use crate::canvas::Canvas;
use crate::emitter::Emission;
use crate::error::ParseEffectIdError;
use crate::input::PointerEvent;
use crate::scheduler::Scheduler;
use crate::spawn::SpawnContext;
use crate::visuals::BlendMode;
use glam::Vec2;
use image::RgbaImage;
use std::fmt;
use std::str::FromStr;

/// Identifies one effect in the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectId {
    Snow,
    Balloons,
    Spotlight,
    Bubbles,
    Scramble,
    Sunflare,
    Lensflare,
    Fireflies,
    Rain,
    Glitch,
    Smoke,
    Lightning,
    Starfield,
    Dust,
    Hearts,
    WaterRipple,
}

impl EffectId {
    /// Every effect, in catalogue order.
    pub const ALL: [EffectId; 16] = [
        EffectId::Snow,
        EffectId::Balloons,
        EffectId::Spotlight,
        EffectId::Bubbles,
        EffectId::Scramble,
        EffectId::Sunflare,
        EffectId::Lensflare,
        EffectId::Fireflies,
        EffectId::Rain,
        EffectId::Glitch,
        EffectId::Smoke,
        EffectId::Lightning,
        EffectId::Starfield,
        EffectId::Dust,
        EffectId::Hearts,
        EffectId::WaterRipple,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EffectId::Snow => "snow",
            EffectId::Balloons => "balloons",
            EffectId::Spotlight => "spotlight",
            EffectId::Bubbles => "bubbles",
            EffectId::Scramble => "scramble",
            EffectId::Sunflare => "sunflare",
            EffectId::Lensflare => "lensflare",
            EffectId::Fireflies => "fireflies",
            EffectId::Rain => "rain",
            EffectId::Glitch => "glitch",
            EffectId::Smoke => "smoke",
            EffectId::Lightning => "lightning",
            EffectId::Starfield => "starfield",
            EffectId::Dust => "dust",
            EffectId::Hearts => "hearts",
            EffectId::WaterRipple => "water-ripple",
        }
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectId {
    type Err = ParseEffectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        EffectId::ALL
            .into_iter()
            .find(|id| id.name() == wanted)
            .ok_or_else(|| ParseEffectIdError::new(s))
    }
}

/// Everything an effect may touch during one frame.
pub struct Frame<'a> {
    /// Frames since the session started. Effect time is derived from it.
    pub frame: u64,
    /// Session clock in seconds, for scheduling deferred spawns.
    pub now: f32,
    pub ctx: &'a mut SpawnContext,
    pub scheduler: &'a mut Scheduler<Emission>,
}

impl Frame<'_> {
    /// The frame counter as per-frame effect time.
    #[inline]
    pub fn time(&self) -> f32 {
        self.frame as f32
    }

    #[inline]
    pub fn bounds(&self) -> Vec2 {
        self.ctx.bounds
    }
}

/// One selectable effect.
///
/// `update` mutates simulation state and makes every random choice;
/// `render` only reads it, so rendering the same state twice paints the
/// same pixels.
pub trait Effect: Send {
    fn id(&self) -> EffectId;

    /// How the effect layer combines with the background beneath it.
    fn layer_blend(&self) -> BlendMode {
        BlendMode::Alpha
    }

    /// Advance one frame.
    fn update(&mut self, frame: &mut Frame<'_>);

    /// Paint the current state. `background` is the ready image scaled to
    /// the canvas, or `None` while it is pending or failed.
    fn render(&self, canvas: &mut Canvas, background: Option<&RgbaImage>);

    /// The canvas changed size; `ctx.bounds` already holds the new size.
    fn resize(&mut self, _size: Vec2, _ctx: &mut SpawnContext) {}

    fn pointer(&mut self, _event: PointerEvent, _frame: &mut Frame<'_>) {}

    /// A deferred emission this effect scheduled earlier has come due.
    fn deferred(&mut self, _emission: Emission, _frame: &mut Frame<'_>) {}

    /// Live particles (or equivalent items) across all pools.
    fn population(&self) -> usize {
        0
    }

    /// Persistent effects keep last frame's pixels and fade them
    /// themselves instead of starting from a cleared canvas.
    fn persistent(&self) -> bool {
        false
    }
}

/// Builds effects for a session.
pub type Factory = Box<dyn Fn(EffectId, &mut SpawnContext) -> Box<dyn Effect> + Send>;

/// Build `id` with its default configuration, sized to `ctx.bounds`.
pub fn create(id: EffectId, ctx: &mut SpawnContext) -> Box<dyn Effect> {
    match id {
        EffectId::Snow => Box::new(snow::Snow::new(Default::default(), ctx)),
        EffectId::Balloons => Box::new(balloons::Balloons::new(Default::default(), ctx)),
        EffectId::Spotlight => Box::new(spotlight::Spotlight::new(Default::default(), ctx)),
        EffectId::Bubbles => Box::new(bubbles::Bubbles::new(Default::default(), ctx)),
        EffectId::Scramble => Box::new(scramble::Scramble::new(Default::default(), ctx)),
        EffectId::Sunflare => Box::new(sunflare::Sunflare::new(Default::default(), ctx)),
        EffectId::Lensflare => Box::new(lensflare::Lensflare::new(Default::default(), ctx)),
        EffectId::Fireflies => Box::new(fireflies::Fireflies::new(Default::default(), ctx)),
        EffectId::Rain => Box::new(rain::Rain::new(Default::default(), ctx)),
        EffectId::Glitch => Box::new(glitch::Glitch::new(Default::default(), ctx)),
        EffectId::Smoke => Box::new(smoke::Smoke::new(Default::default(), ctx)),
        EffectId::Lightning => Box::new(lightning::Lightning::new(Default::default(), ctx)),
        EffectId::Starfield => Box::new(starfield::Starfield::new(Default::default(), ctx)),
        EffectId::Dust => Box::new(dust::Dust::new(Default::default(), ctx)),
        EffectId::Hearts => Box::new(hearts::Hearts::new(Default::default(), ctx)),
        EffectId::WaterRipple => Box::new(water::WaterRipple::new(Default::default(), ctx)),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Run `frames` updates of `effect` with a throwaway scheduler.
    pub fn run(effect: &mut dyn Effect, ctx: &mut SpawnContext, frames: u64) {
        let mut scheduler = Scheduler::new();
        for n in 0..frames {
            let mut frame = Frame {
                frame: n,
                now: n as f32 / 60.0,
                ctx: &mut *ctx,
                scheduler: &mut scheduler,
            };
            effect.update(&mut frame);
        }
    }

    pub fn ctx() -> SpawnContext {
        SpawnContext::seeded(Vec2::new(320.0, 240.0), 42)
    }

    /// Count of pixels with any coverage.
    pub fn painted(canvas: &Canvas) -> usize {
        canvas.pixels().iter().filter(|c| c.a > 0.0).count()
    }
}
