//! Frame clock.
//!
//! [`Time`] is the single source of truth for "which frame is this and
//! how many seconds have passed". Effect physics counts frames; the
//! deferred-spawn scheduler counts seconds. Both come from here.
//!
//! In fixed-step mode elapsed time is the sum of fixed deltas, so a test
//! that ticks 60 times has seen exactly one second regardless of how fast
//! the machine ran.
//!
//! ```ignore
//! let mut time = Time::fixed(1.0 / 60.0);
//! for _ in 0..60 {
//!     let input = time.tick();
//!     deck.tick(&input);
//! }
//! assert_eq!(time.frame(), 60);
//! ```

use std::time::Instant;

/// Longest wall-clock gap a single tick reports. A window that was
/// minimised or dragged resumes where it left off instead of jumping.
pub const MAX_DELTA: f32 = 0.1;

/// One tick's worth of timing, handed to the deck.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    /// Frames since the clock started, starting at 1 for the first tick.
    pub frame: u64,
    /// Seconds since the clock started, as the sum of reported deltas.
    pub elapsed: f32,
    /// Seconds since the previous tick, at most [`MAX_DELTA`].
    pub delta: f32,
}

/// Frame counter plus elapsed time.
#[derive(Debug)]
pub struct Time {
    last_frame: Instant,
    step: Option<f32>,
    current: FrameInput,
}

impl Time {
    /// Wall-clock timer starting from now.
    pub fn new() -> Self {
        Self { last_frame: Instant::now(), step: None, current: FrameInput::default() }
    }

    /// Deterministic timer advancing `delta` seconds per tick.
    pub fn fixed(delta: f32) -> Self {
        Self { step: Some(delta.max(0.0)), ..Self::new() }
    }

    /// Advance one frame. Call once per redraw.
    pub fn tick(&mut self) -> FrameInput {
        let now = Instant::now();
        let delta = match self.step {
            Some(step) => step,
            None => now.duration_since(self.last_frame).as_secs_f32().min(MAX_DELTA),
        };
        self.last_frame = now;
        self.current = FrameInput {
            frame: self.current.frame + 1,
            elapsed: self.current.elapsed + delta,
            delta,
        };
        self.current
    }

    pub fn is_fixed(&self) -> bool {
        self.step.is_some()
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.current.elapsed
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.current.delta
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.current.frame
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.elapsed(), 0.0);
        assert!(!time.is_fixed());
    }

    #[test]
    fn test_time_tick() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(10));
        let input = time.tick();

        assert!(input.delta > 0.0);
        assert_eq!(input.elapsed, input.delta);
        assert_eq!(input.frame, 1);
    }

    #[test]
    fn test_long_stall_is_clamped() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(150));
        let input = time.tick();
        assert_eq!(input.delta, MAX_DELTA);
    }

    #[test]
    fn test_fixed_delta_accumulates() {
        let mut time = Time::fixed(0.25);
        thread::sleep(Duration::from_millis(20));
        for _ in 0..4 {
            time.tick();
        }
        assert_eq!(time.frame(), 4);
        assert!((time.elapsed() - 1.0).abs() < 1e-6);
        assert!((time.delta() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_negative_step_is_zero() {
        let mut time = Time::fixed(-1.0);
        assert_eq!(time.tick().delta, 0.0);
    }
}
