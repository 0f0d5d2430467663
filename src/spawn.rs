//! Random sampling helpers shared by emitters, rules and effects.
//!
//! Every session owns exactly one [`SpawnContext`]. It wraps a
//! [`SmallRng`] together with the current canvas size so spawners can ask
//! for "a random point on screen" or "a point just past a random edge"
//! without repeating the arithmetic.
//!
//! ```ignore
//! let flake = Particle::new(ctx.random_point())
//!     .with_size(ctx.random_range(2.0, 6.0))
//!     .with_color(ctx.pick(Palette::Balloons));
//! ```

use crate::visuals::{Color, Palette};
use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// One side of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom];
}

/// RNG plus canvas bounds.
#[derive(Debug, Clone)]
pub struct SpawnContext {
    /// Canvas size in pixels.
    pub bounds: Vec2,
    rng: SmallRng,
}

impl SpawnContext {
    /// Context seeded from OS entropy.
    pub fn new(bounds: Vec2) -> Self {
        Self {
            bounds,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Reproducible context for tests and benchmarks.
    pub fn seeded(bounds: Vec2, seed: u64) -> Self {
        Self {
            bounds,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    // ========== Random primitives ==========

    /// Uniform in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Uniform in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Uniform in `[-amplitude, amplitude)`.
    #[inline]
    pub fn signed(&mut self, amplitude: f32) -> f32 {
        (self.random() - 0.5) * 2.0 * amplitude
    }

    /// Uniform integer in `[min, max)`.
    #[inline]
    pub fn random_int(&mut self, min: i32, max: i32) -> i32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Bernoulli trial with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        p > 0.0 && self.random() < p
    }

    /// Uniform angle in `[0, TAU)`.
    #[inline]
    pub fn random_angle(&mut self) -> f32 {
        self.random() * std::f32::consts::TAU
    }

    /// Random palette color.
    pub fn pick(&mut self, palette: Palette) -> Color {
        let i = self.rng.gen_range(0..palette.len().max(1));
        palette.color(i)
    }

    /// Random element of a slice, `None` if empty.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.rng.gen_range(0..items.len())])
        }
    }

    // ========== Position helpers ==========

    /// Uniform point on the canvas.
    pub fn random_point(&mut self) -> Vec2 {
        Vec2::new(self.random() * self.bounds.x, self.random() * self.bounds.y)
    }

    /// Uniform edge.
    pub fn random_edge(&mut self) -> Edge {
        Edge::ALL[self.rng.gen_range(0..4)]
    }

    /// Random point `margin` pixels outside `edge`.
    pub fn point_past(&mut self, edge: Edge, margin: f32) -> Vec2 {
        match edge {
            Edge::Left => Vec2::new(-margin, self.random() * self.bounds.y),
            Edge::Right => Vec2::new(self.bounds.x + margin, self.random() * self.bounds.y),
            Edge::Top => Vec2::new(self.random() * self.bounds.x, -margin),
            Edge::Bottom => Vec2::new(self.random() * self.bounds.x, self.bounds.y + margin),
        }
    }

    /// Point offset from `center` by up to `±spread` on each axis.
    pub fn jitter(&mut self, center: Vec2, spread: f32) -> Vec2 {
        center + Vec2::new(self.signed(spread), self.signed(spread))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = SpawnContext::seeded(Vec2::new(800.0, 600.0), 7);
        let mut b = SpawnContext::seeded(Vec2::new(800.0, 600.0), 7);
        for _ in 0..32 {
            assert_eq!(a.random(), b.random());
        }
    }

    #[test]
    fn test_random_point_in_bounds() {
        let mut ctx = SpawnContext::seeded(Vec2::new(800.0, 600.0), 1);
        for _ in 0..1000 {
            let p = ctx.random_point();
            assert!(p.x >= 0.0 && p.x < 800.0 && p.y >= 0.0 && p.y < 600.0);
        }
    }

    #[test]
    fn test_point_past_edges() {
        let mut ctx = SpawnContext::seeded(Vec2::new(100.0, 50.0), 2);
        assert_eq!(ctx.point_past(Edge::Left, 10.0).x, -10.0);
        assert_eq!(ctx.point_past(Edge::Right, 10.0).x, 110.0);
        assert_eq!(ctx.point_past(Edge::Top, 10.0).y, -10.0);
        assert_eq!(ctx.point_past(Edge::Bottom, 10.0).y, 60.0);
    }

    #[test]
    fn test_degenerate_ranges() {
        let mut ctx = SpawnContext::seeded(Vec2::ONE, 3);
        assert_eq!(ctx.random_range(5.0, 5.0), 5.0);
        assert_eq!(ctx.random_int(2, 1), 2);
        assert!(!ctx.chance(0.0));
        assert!(ctx.choose::<u8>(&[]).is_none());
    }

    #[test]
    fn test_signed_range() {
        let mut ctx = SpawnContext::seeded(Vec2::ONE, 4);
        for _ in 0..1000 {
            let v = ctx.signed(0.5);
            assert!((-0.5..0.5).contains(&v));
        }
    }
}
