//! One running activation of one effect.
//!
//! A [`Session`] exclusively owns everything an effect touches while it is
//! selected: the effect itself with its particle pools, the RNG, the
//! deferred-spawn scheduler and the frame counter. Stopping the session
//! (explicitly, by dropping it, or because the effect panicked) cancels
//! pending deferred spawns and frees all of it at once.
//!
//! # Frame order
//!
//! ```text
//! clear canvas (unless persistent)
//!   → deferred spawns that came due
//!   → Effect::update   (emission, physics, lifecycle, eviction)
//!   → Effect::render
//! ```
//!
//! The whole sequence runs under `catch_unwind`. A panicking effect is
//! logged and the session stops; the caller keeps its frame loop.

use crate::canvas::Canvas;
use crate::effects::{self, Effect, EffectId, Frame};
use crate::emitter::Emission;
use crate::input::PointerEvent;
use crate::scheduler::Scheduler;
use crate::spawn::SpawnContext;
use crate::time::FrameInput;
use crate::visuals::BlendMode;
use glam::Vec2;
use image::RgbaImage;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, info};

/// Whether a session still drives its effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running,
    Stopped,
}

pub struct Session {
    id: EffectId,
    effect: Option<Box<dyn Effect>>,
    ctx: SpawnContext,
    scheduler: Scheduler<Emission>,
    frame: u64,
    now: f32,
}

impl Session {
    /// Start `id` with its default configuration.
    pub fn start(id: EffectId, ctx: SpawnContext) -> Self {
        Self::start_with(id, ctx, effects::create)
    }

    /// Start `id` using a custom builder.
    ///
    /// A builder that panics leaves the session stopped.
    pub fn start_with<F>(id: EffectId, mut ctx: SpawnContext, build: F) -> Self
    where
        F: FnOnce(EffectId, &mut SpawnContext) -> Box<dyn Effect>,
    {
        let effect = match panic::catch_unwind(AssertUnwindSafe(|| build(id, &mut ctx))) {
            Ok(effect) => {
                info!(effect = %id, width = ctx.bounds.x, height = ctx.bounds.y, "effect started");
                Some(effect)
            }
            Err(_) => {
                error!(effect = %id, "effect panicked while starting");
                None
            }
        };
        Self { id, effect, ctx, scheduler: Scheduler::new(), frame: 0, now: 0.0 }
    }

    pub fn id(&self) -> EffectId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        if self.effect.is_some() {
            SessionState::Running
        } else {
            SessionState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == SessionState::Running
    }

    /// Frames driven so far.
    pub fn frames(&self) -> u64 {
        self.frame
    }

    /// Deferred spawns still waiting.
    pub fn pending(&self) -> usize {
        self.scheduler.len()
    }

    pub fn population(&self) -> usize {
        self.effect.as_ref().map_or(0, |e| e.population())
    }

    /// How the effect layer goes over the background, while running.
    pub fn layer_blend(&self) -> Option<BlendMode> {
        self.effect.as_ref().map(|e| e.layer_blend())
    }

    /// Drive one frame onto `canvas`. Returns false once the session is stopped.
    pub fn tick(
        &mut self,
        input: &FrameInput,
        canvas: &mut Canvas,
        background: Option<&RgbaImage>,
    ) -> bool {
        let Some(effect) = self.effect.as_mut() else {
            return false;
        };

        let mut frame = Frame {
            frame: self.frame,
            now: self.now,
            ctx: &mut self.ctx,
            scheduler: &mut self.scheduler,
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            if !effect.persistent() {
                canvas.clear();
            }
            let due = frame.scheduler.take_due(frame.now);
            for emission in due {
                effect.deferred(emission, &mut frame);
            }
            effect.update(&mut frame);
            effect.render(canvas, background);
        }));

        self.frame += 1;
        self.now += input.delta.max(0.0);

        if outcome.is_err() {
            error!(effect = %self.id, frame = self.frame, "effect panicked, stopping it");
            // Drop half-drawn pixels and any unbalanced save() state
            canvas.resize(canvas.width(), canvas.height());
            self.dispose();
            return false;
        }
        true
    }

    /// Forward a pointer event to the effect.
    pub fn pointer(&mut self, event: PointerEvent) {
        let Some(effect) = self.effect.as_mut() else {
            return;
        };
        let mut frame = Frame {
            frame: self.frame,
            now: self.now,
            ctx: &mut self.ctx,
            scheduler: &mut self.scheduler,
        };
        if panic::catch_unwind(AssertUnwindSafe(|| effect.pointer(event, &mut frame))).is_err() {
            error!(effect = %self.id, "effect panicked handling pointer input, stopping it");
            self.dispose();
        }
    }

    /// The viewport changed. The next frame sees the new bounds.
    pub fn resize(&mut self, size: Vec2) {
        self.ctx.bounds = size;
        let Some(effect) = self.effect.as_mut() else {
            return;
        };
        let ctx = &mut self.ctx;
        if panic::catch_unwind(AssertUnwindSafe(|| effect.resize(size, ctx))).is_err() {
            error!(effect = %self.id, "effect panicked while resizing, stopping it");
            self.dispose();
        } else {
            debug!(effect = %self.id, width = size.x, height = size.y, "session resized");
        }
    }

    /// Stop the effect: cancel deferred spawns and drop all its state.
    /// Idempotent.
    pub fn dispose(&mut self) {
        if self.effect.take().is_some() {
            let cancelled = self.scheduler.cancel_all();
            info!(effect = %self.id, frames = self.frame, cancelled, "effect stopped");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("frame", &self.frame)
            .field("pending", &self.scheduler.len())
            .finish()
    }
}
