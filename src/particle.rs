//! The shared particle record.
//!
//! Every effect's moving items (flakes, balloons, drops, hearts, stars...)
//! are [`Particle`]s. The common attributes drive the engine; the extras
//! at the bottom of the struct are read by the rules and sprites that need
//! them and ignored by everything else.

use crate::visuals::Color;
use glam::Vec2;
use std::collections::VecDeque;

/// Bounded history of recent positions, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trail {
    points: VecDeque<Vec2>,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a position, dropping the oldest once full. No-op at capacity 0.
    pub fn push(&mut self, p: Vec2) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_back();
        }
        self.points.push_front(p);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Positions from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.points.iter().copied()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

/// One simulated visual element.
///
/// `opacity` is owned by the [`Lifecycle`](crate::lifecycle::Lifecycle):
/// it is recomputed from `life`, `max_life` and `max_opacity` every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Canvas position in pixels.
    pub position: Vec2,
    /// Pixels per frame.
    pub velocity: Vec2,
    /// Radius (or characteristic size) in pixels.
    pub size: f32,
    /// Radians.
    pub rotation: f32,
    /// Radians per frame.
    pub rotation_speed: f32,
    /// Current opacity in `[0, max_opacity]`.
    pub opacity: f32,
    /// Steady-state opacity.
    pub max_opacity: f32,
    /// Frames lived.
    pub life: f32,
    /// Frames until expiry.
    pub max_life: f32,
    pub color: Color,

    // ========== Effect extras ==========
    /// Sideways drift or sway amplitude.
    pub drift: f32,
    /// Phase offset for pulses, twinkles and wobbles.
    pub phase: f32,
    /// Per-particle pulse/twinkle rate. Zero means "use the lifecycle's".
    pub phase_speed: f32,
    /// Base speed for effects that steer rather than integrate.
    pub speed: f32,
    /// Walls hit so far.
    pub bounce_count: u32,
    /// Recent positions for trail rendering.
    pub trail: Trail,
    /// Seek destination.
    pub target: Option<Vec2>,
    /// Distance from the viewer for perspective effects.
    pub depth: f32,
    /// Secondary length (balloon string, raindrop streak).
    pub length: f32,
    /// Base hue in degrees for effects that tint by hue.
    pub hue: f32,
    /// Sprite-specific flag set during update (e.g. "sparkle this frame").
    pub flair: Option<Vec2>,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            size: 1.0,
            rotation: 0.0,
            rotation_speed: 0.0,
            opacity: 0.0,
            max_opacity: 1.0,
            life: 0.0,
            max_life: 1.0,
            color: Color::WHITE,
            drift: 0.0,
            phase: 0.0,
            phase_speed: 0.0,
            speed: 0.0,
            bounce_count: 0,
            trail: Trail::default(),
            target: None,
            depth: 0.0,
            length: 0.0,
            hue: 0.0,
            flair: None,
        }
    }
}

impl Particle {
    /// A fresh particle at `position`: zero life, zero opacity.
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Steady opacity; clamped into `[0, 1]`.
    pub fn with_max_opacity(mut self, max_opacity: f32) -> Self {
        self.max_opacity = max_opacity.clamp(0.0, 1.0);
        self
    }

    /// Lifespan in frames; at least one frame.
    pub fn with_max_life(mut self, frames: f32) -> Self {
        self.max_life = frames.max(1.0);
        self
    }

    pub fn with_rotation(mut self, rotation: f32, speed: f32) -> Self {
        self.rotation = rotation;
        self.rotation_speed = speed;
        self
    }

    pub fn with_trail(mut self, capacity: usize) -> Self {
        self.trail = Trail::new(capacity);
        self
    }

    /// Fraction of life used, `life / max_life`.
    #[inline]
    pub fn age_ratio(&self) -> f32 {
        self.life / self.max_life
    }

    /// True if every numeric field is finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.size.is_finite()
            && self.rotation.is_finite()
            && self.opacity.is_finite()
            && self.life.is_finite()
            && self.max_life.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_particle_starts_invisible() {
        let p = Particle::new(Vec2::new(3.0, 4.0));
        assert_eq!(p.opacity, 0.0);
        assert_eq!(p.life, 0.0);
        assert!(p.is_finite());
    }

    #[test]
    fn test_builder_clamps() {
        let p = Particle::new(Vec2::ZERO).with_max_opacity(1.1).with_max_life(0.0);
        assert_eq!(p.max_opacity, 1.0);
        assert_eq!(p.max_life, 1.0);
    }

    #[test]
    fn test_trail_is_bounded_newest_first() {
        let mut trail = Trail::new(3);
        for i in 0..5 {
            trail.push(Vec2::splat(i as f32));
        }
        let points: Vec<f32> = trail.iter().map(|p| p.x).collect();
        assert_eq!(points, vec![4.0, 3.0, 2.0]);
    }

    #[test]
    fn test_zero_capacity_trail_stays_empty() {
        let mut trail = Trail::default();
        trail.push(Vec2::ONE);
        assert!(trail.is_empty());
    }
}
