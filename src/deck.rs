//! The host-facing effect registry.
//!
//! A [`Deck`] holds at most one running [`Session`] and composes each frame:
//!
//! | Layer | Source | Blend |
//! |-------|--------|-------|
//! | bottom | background image stretched to the viewport, or the fallback gradient | copy |
//! | top | the active effect's canvas | [`effects::Effect::layer_blend`] |
//!
//! Selecting an effect stops the previous one first, so two sessions never
//! run at once. Selecting the active effect again turns it off.
//!
//! ```ignore
//! let mut deck = Deck::new(1280, 720);
//! deck.set_background(ImageSlot::load("backdrop.jpg"));
//! deck.select_effect(EffectId::Snow);
//! loop {
//!     let input = time.tick();
//!     let canvas = deck.tick(&input);
//!     upload(canvas.to_rgba8());
//! }
//! ```

use crate::background::{Background, ImageSlot};
use crate::canvas::Canvas;
use crate::effects::{self, EffectId, Factory};
use crate::input::PointerEvent;
use crate::session::Session;
use crate::spawn::SpawnContext;
use crate::time::FrameInput;
use glam::Vec2;
use tracing::{debug, info};

pub struct Deck {
    width: u32,
    height: u32,
    layer: Canvas,
    output: Canvas,
    background: Background,
    session: Option<Session>,
    factory: Factory,
    seed: Option<u64>,
    activations: u64,
}

impl Deck {
    /// An idle deck with no background image.
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self {
            width,
            height,
            layer: Canvas::new(width, height),
            output: Canvas::new(width, height),
            background: Background::none(width, height),
            session: None,
            factory: Box::new(effects::create),
            seed: None,
            activations: 0,
        }
    }

    /// Build effects with `factory` instead of the default catalogue.
    pub fn with_factory(mut self, factory: Factory) -> Self {
        self.factory = factory;
        self
    }

    /// Seed every session's RNG. Each activation gets its own derived seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    // ========== Selection ==========

    /// Start `id`, stopping whatever ran before. Selecting the active
    /// effect stops it instead.
    pub fn select_effect(&mut self, id: EffectId) {
        if let Some(previous) = self.session.take() {
            let toggled_off = previous.id() == id;
            drop(previous);
            if toggled_off {
                self.layer.clear();
                return;
            }
        }

        let bounds = Vec2::new(self.width as f32, self.height as f32);
        let ctx = match self.seed {
            Some(seed) => SpawnContext::seeded(bounds, seed.wrapping_add(self.activations)),
            None => SpawnContext::new(bounds),
        };
        self.activations += 1;

        // A fresh canvas so persistent effects never see another effect's pixels
        self.layer.resize(self.width, self.height);
        self.session = Some(Session::start_with(id, ctx, &*self.factory));
    }

    /// Stop the active effect, if any.
    pub fn deselect_all(&mut self) {
        if self.session.take().is_some() {
            self.layer.clear();
        }
    }

    /// The effect currently running.
    pub fn active(&self) -> Option<EffectId> {
        self.session.as_ref().filter(|s| s.is_running()).map(Session::id)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    // ========== Frame ==========

    /// Drive one frame and return the composed canvas.
    pub fn tick(&mut self, input: &FrameInput) -> &Canvas {
        self.background.poll();

        if let Some(session) = self.session.as_mut() {
            if !session.tick(input, &mut self.layer, self.background.scaled()) {
                info!(effect = %session.id(), "dropping stopped effect");
                self.session = None;
                self.layer.clear();
            }
        }

        self.output.clear();
        self.background.paint(&mut self.output);
        if let Some(blend) = self.session.as_ref().and_then(Session::layer_blend) {
            self.output.composite(&self.layer, blend);
        }
        &self.output
    }

    /// The last composed frame.
    pub fn canvas(&self) -> &Canvas {
        &self.output
    }

    /// The active effect's own layer, before composition.
    pub fn layer(&self) -> &Canvas {
        &self.layer
    }

    // ========== Host events ==========

    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.layer.resize(width, height);
        self.output.resize(width, height);
        self.background.resize(width, height);
        if let Some(session) = self.session.as_mut() {
            session.resize(Vec2::new(width as f32, height as f32));
        }
        debug!(width, height, "deck resized");
    }

    pub fn set_background(&mut self, slot: ImageSlot) {
        self.background.set_slot(slot);
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn pointer(&mut self, event: PointerEvent) {
        if let Some(session) = self.session.as_mut() {
            session.pointer(event);
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl std::fmt::Debug for Deck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deck")
            .field("size", &(self.width, self.height))
            .field("session", &self.session)
            .field("seed", &self.seed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Time;
    use crate::visuals::Color;
    use image::{Rgba, RgbaImage};

    fn deck() -> Deck {
        Deck::new(160, 120).with_seed(9)
    }

    #[test]
    fn test_select_toggles() {
        let mut deck = deck();
        deck.select_effect(EffectId::Rain);
        assert_eq!(deck.active(), Some(EffectId::Rain));
        deck.select_effect(EffectId::Rain);
        assert_eq!(deck.active(), None);
    }

    #[test]
    fn test_switching_replaces_session() {
        let mut deck = deck();
        let mut time = Time::fixed(1.0 / 60.0);
        deck.select_effect(EffectId::Snow);
        deck.tick(&time.tick());
        deck.select_effect(EffectId::Hearts);
        assert_eq!(deck.active(), Some(EffectId::Hearts));
        assert_eq!(deck.session().map(Session::frames), Some(0));
        deck.deselect_all();
        assert_eq!(deck.active(), None);
    }

    #[test]
    fn test_idle_deck_paints_background() {
        let mut deck = deck();
        deck.set_background(ImageSlot::ready(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255]))));
        let canvas = deck.tick(&FrameInput::default());
        let Color { r, g, b, a } = canvas.pixel(80, 60);
        assert!(r < 0.01 && g < 0.01);
        assert!(b > 0.99 && a > 0.99);
    }

    #[test]
    fn test_effect_layer_is_composited() {
        let mut deck = deck();
        let mut time = Time::fixed(1.0 / 60.0);
        deck.select_effect(EffectId::Hearts);
        for _ in 0..10 {
            deck.tick(&time.tick());
        }
        let painted_layer = deck.layer().pixels().iter().filter(|c| c.a > 0.0).count();
        assert!(painted_layer > 0);
        // The fallback beneath is opaque everywhere
        assert!(deck.canvas().pixels().iter().all(|c| c.a > 0.99));
    }

    #[test]
    fn test_resize_reaches_session() {
        let mut deck = deck();
        deck.select_effect(EffectId::WaterRipple);
        deck.resize(80, 40);
        assert_eq!(deck.size(), (80, 40));
        let canvas = deck.tick(&FrameInput::default());
        assert_eq!((canvas.width(), canvas.height()), (80, 40));
        deck.resize(0, 0);
        assert_eq!(deck.size(), (1, 1));
    }
}
