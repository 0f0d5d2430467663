//! # fxdeck - decorative full-screen effects
//!
//! Sixteen selectable particle and canvas effects (snow, balloons, rain,
//! lightning, water ripples and more) drawn on a CPU-side RGBA [`Canvas`]
//! and layered over a background image. A windowed host blits the result
//! with `wgpu`.
//!
//! ## Quick Start
//!
//! ```ignore
//! use fxdeck::prelude::*;
//!
//! let mut deck = Deck::new(1280, 720);
//! deck.set_background(ImageSlot::load("backdrop.jpg"));
//! deck.select_effect(EffectId::Snow);
//!
//! let mut time = Time::new();
//! loop {
//!     let canvas = deck.tick(&time.tick());
//!     present(canvas.to_rgba8());
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### One engine, many effects
//!
//! Most effects are a [`ParticleSystem`] configured with an [`Emitter`], a
//! [`Physics`] rule list and a [`Lifecycle`] envelope. Each frame runs
//!
//! ```text
//! emission → physics (rules, then boundary) → lifecycle opacity → eviction
//! ```
//!
//! Procedural effects (spotlight, flares, lightning, glitch, scramble) keep
//! their own small state, and the water ripple drives a [`WaveGrid`].
//!
//! ### Sessions
//!
//! A [`Session`] is one activation of one effect. It owns the effect's
//! pools, RNG, deferred spawns and frame counter; dropping it frees
//! everything. The [`Deck`] keeps at most one session alive.
//!
//! ### Rules
//!
//! ```ignore
//! Physics::new()
//!     .with_rule(Rule::Gravity(0.1))
//!     .with_rule(Rule::Drag(0.999))
//!     .with_boundary(Boundary::Bounce { restitution: 0.8 })
//! ```
//!
//! ## Feature Overview
//!
//! | Category | Items |
//! |----------|-------|
//! | Engine | [`ParticleSystem`], [`Emitter`], [`Physics`], [`Lifecycle`] |
//! | Drawing | [`Canvas`], [`Paint`], [`BlendMode`], [`Sprite`] |
//! | Waves | [`WaveGrid`], [`Ripple`] |
//! | Driving | [`Deck`], [`Session`], [`Time`], [`Scheduler`] |
//! | Host | [`window::App`], [`Input`] |

pub mod background;
pub mod canvas;
pub mod deck;
pub mod effects;
pub mod emitter;
pub mod error;
pub mod input;
pub mod lifecycle;
pub mod particle;
pub mod renderer;
pub mod rules;
pub mod scheduler;
pub mod session;
pub mod shader;
pub mod spawn;
pub mod system;
pub mod time;
pub mod visuals;
pub mod wave;
pub mod window;

pub use background::{Background, ImageSlot};
pub use canvas::{Canvas, Path};
pub use deck::Deck;
pub use effects::{Effect, EffectId, Frame};
pub use emitter::{Emission, Emitter, SpawnSite};
pub use error::{BackgroundError, GpuError, HostError, ParseEffectIdError};
pub use glam::Vec2;
pub use input::{Input, KeyCode, PointerEvent};
pub use lifecycle::{Ceiling, Lifecycle};
pub use particle::Particle;
pub use renderer::Sprite;
pub use rules::{Boundary, Physics, Rule};
pub use scheduler::Scheduler;
pub use session::{Session, SessionState};
pub use spawn::SpawnContext;
pub use system::ParticleSystem;
pub use time::{FrameInput, Time};
pub use visuals::{BlendMode, Color, Gradient, Paint, Palette};
pub use wave::{Ripple, WaveConfig, WaveGrid};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use fxdeck::prelude::*;
/// ```
pub mod prelude {
    pub use crate::background::ImageSlot;
    pub use crate::canvas::Canvas;
    pub use crate::deck::Deck;
    pub use crate::effects::{Effect, EffectId, Frame};
    pub use crate::emitter::{Emission, Emitter, SpawnSite};
    pub use crate::input::PointerEvent;
    pub use crate::lifecycle::{Ceiling, Lifecycle};
    pub use crate::particle::Particle;
    pub use crate::rules::{Boundary, Physics, Rule};
    pub use crate::spawn::SpawnContext;
    pub use crate::system::ParticleSystem;
    pub use crate::time::{FrameInput, Time};
    pub use crate::visuals::{BlendMode, Color, Paint, Palette};
    pub use crate::Vec2;
}
