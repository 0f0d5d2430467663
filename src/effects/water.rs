//! Water ripples over the background, driven by the pointer.
//!
//! Pointer moves occasionally drop a light ripple, clicks a strong one plus
//! a weaker echo 150 ms later nearby, and the surface stirs on its own now
//! and then. The [`WaveGrid`] does the rest.

use super::{Effect, EffectId, Frame};
use crate::canvas::Canvas;
use crate::emitter::{Emission, Emitter, FollowUp};
use crate::input::PointerEvent;
use crate::spawn::SpawnContext;
use crate::wave::{WaveConfig, WaveGrid};
use glam::Vec2;
use image::RgbaImage;
use tracing::debug;

pub const MOVE_CHANCE: f32 = 0.05;
pub const MOVE_STRENGTH: f32 = 0.3;
pub const CLICK_STRENGTH: f32 = 0.8;
pub const ECHO_DELAY: f32 = 0.15;
pub const ECHO_SPREAD: f32 = 15.0;
pub const ECHO_STRENGTH: f32 = 0.4;
pub const AMBIENT_CHANCE: f32 = 0.02;
pub const AMBIENT_STRENGTH: f32 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct WaterConfig {
    pub wave: WaveConfig,
    pub ambient_chance: f32,
    pub ambient_strength: f32,
    pub interaction: Emitter,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            wave: WaveConfig::default(),
            ambient_chance: AMBIENT_CHANCE,
            ambient_strength: AMBIENT_STRENGTH,
            interaction: Emitter::Interaction {
                move_chance: MOVE_CHANCE,
                move_strength: MOVE_STRENGTH,
                click_strength: CLICK_STRENGTH,
                follow_ups: vec![FollowUp {
                    delay: ECHO_DELAY,
                    spread: ECHO_SPREAD,
                    strength: ECHO_STRENGTH,
                }],
            },
        }
    }
}

impl WaterConfig {
    pub fn with_ambient_chance(mut self, chance: f32) -> Self {
        self.ambient_chance = chance;
        self
    }

    pub fn with_wave(mut self, wave: WaveConfig) -> Self {
        self.wave = wave;
        self
    }
}

pub struct WaterRipple {
    config: WaterConfig,
    grid: WaveGrid,
}

impl WaterRipple {
    pub fn new(config: WaterConfig, ctx: &mut SpawnContext) -> Self {
        let grid = WaveGrid::with_config(ctx.bounds, config.wave.clone());
        Self { config, grid }
    }

    pub fn grid(&self) -> &WaveGrid {
        &self.grid
    }
}

impl Effect for WaterRipple {
    fn id(&self) -> EffectId {
        EffectId::WaterRipple
    }

    fn update(&mut self, frame: &mut Frame<'_>) {
        if frame.ctx.chance(self.config.ambient_chance) {
            let at = frame.ctx.random_point();
            self.grid.ripple(at, self.config.ambient_strength, frame.ctx);
        }
        self.grid.step();
    }

    fn render(&self, canvas: &mut Canvas, background: Option<&RgbaImage>) {
        self.grid.render(canvas, background);
    }

    fn resize(&mut self, size: Vec2, _ctx: &mut SpawnContext) {
        self.grid.resize(size);
        debug!(cols = self.grid.cols(), rows = self.grid.rows(), "wave grid resized");
    }

    fn pointer(&mut self, event: PointerEvent, frame: &mut Frame<'_>) {
        let emissions =
            self.config.interaction.pointer(event, frame.now, frame.ctx, frame.scheduler);
        for e in emissions {
            self.grid.ripple(e.position, e.strength, frame.ctx);
        }
    }

    fn deferred(&mut self, emission: Emission, frame: &mut Frame<'_>) {
        self.grid.ripple(emission.position, emission.strength, frame.ctx);
    }

    fn population(&self) -> usize {
        self.grid.ripples().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing;
    use crate::scheduler::Scheduler;

    fn quiet(ctx: &mut SpawnContext) -> WaterRipple {
        WaterRipple::new(WaterConfig::default().with_ambient_chance(0.0), ctx)
    }

    #[test]
    fn test_click_ripples_now_and_schedules_echo() {
        let mut ctx = testing::ctx();
        let mut scheduler = Scheduler::new();
        let mut water = quiet(&mut ctx);
        let mut frame = Frame {
            frame: 0,
            now: 1.0,
            ctx: &mut ctx,
            scheduler: &mut scheduler,
        };
        water.pointer(PointerEvent::Click(Vec2::new(160.0, 120.0)), &mut frame);
        assert_eq!(water.population(), 1);
        assert_eq!(water.grid().ripples()[0].strength, CLICK_STRENGTH);

        assert!(scheduler.take_due(1.1).is_empty());
        let due = scheduler.take_due(1.2);
        assert_eq!(due.len(), 1);
        let echo = due[0];
        assert_eq!(echo.strength, ECHO_STRENGTH);
        assert!((echo.position - Vec2::new(160.0, 120.0)).abs().max_element() <= ECHO_SPREAD);
    }

    #[test]
    fn test_deferred_echo_adds_ripple() {
        let mut ctx = testing::ctx();
        let mut scheduler = Scheduler::new();
        let mut water = quiet(&mut ctx);
        let mut frame = Frame {
            frame: 0,
            now: 0.0,
            ctx: &mut ctx,
            scheduler: &mut scheduler,
        };
        let echo = Emission { position: Vec2::new(50.0, 50.0), strength: ECHO_STRENGTH };
        water.deferred(echo, &mut frame);
        assert_eq!(water.population(), 1);
    }

    #[test]
    fn test_surface_settles_after_click() {
        let mut ctx = testing::ctx();
        let mut scheduler = Scheduler::new();
        let mut water = quiet(&mut ctx);
        {
            let mut frame = Frame {
                frame: 0,
                now: 0.0,
                ctx: &mut ctx,
                scheduler: &mut scheduler,
            };
            water.pointer(PointerEvent::Click(Vec2::new(160.0, 120.0)), &mut frame);
        }
        testing::run(&mut water, &mut ctx, 30);
        let excited = water.grid().max_abs_height();
        assert!(excited > 0.0);
        testing::run(&mut water, &mut ctx, 1500);
        assert_eq!(water.population(), 0);
        assert!(water.grid().max_abs_height() < excited * 0.1);
    }

    #[test]
    fn test_short_lived_ripples() {
        let mut ctx = testing::ctx();
        let mut scheduler = Scheduler::new();
        let wave = WaveConfig { ripple_max_age: 10.0, ..WaveConfig::default() };
        let config = WaterConfig::default().with_ambient_chance(0.0).with_wave(wave);
        let mut water = WaterRipple::new(config, &mut ctx);
        {
            let mut frame = Frame {
                frame: 0,
                now: 0.0,
                ctx: &mut ctx,
                scheduler: &mut scheduler,
            };
            water.pointer(PointerEvent::Click(Vec2::new(160.0, 120.0)), &mut frame);
        }
        testing::run(&mut water, &mut ctx, 10);
        assert_eq!(water.population(), 1);
        testing::run(&mut water, &mut ctx, 1);
        assert_eq!(water.population(), 0);
    }

    #[test]
    fn test_resize_rebuilds_grid() {
        let mut ctx = testing::ctx();
        let mut water = quiet(&mut ctx);
        water.resize(Vec2::new(100.0, 50.0), &mut ctx);
        assert_eq!((water.grid().cols(), water.grid().rows()), (25, 13));
    }
}
