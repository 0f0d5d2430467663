//! Per-frame particle physics.
//!
//! A [`Physics`] profile is a list of [`Rule`]s plus one [`Boundary`]
//! policy. Every frame, for every particle, [`Physics::step`] runs:
//!
//! 1. integrate: `position += velocity`
//! 2. each rule, in the order it was added
//! 3. the boundary policy
//! 4. trail, `life += 1`, `rotation += rotation_speed`
//!
//! Constants are per frame, not per second. A display running at 120 Hz
//! animates twice as fast as one at 60 Hz; effects are tuned for 60.
//!
//! # Rule Categories
//!
//! - **Forces**: Gravity, Wind, Drag
//! - **Motion**: Float, Wobble, Seek
//! - **Shape**: Grow
//!
//! Drag is applied once per frame, wherever it sits in the list. Presets
//! list forces first and drag last.
//!
//! # Example
//!
//! ```ignore
//! let smoke = Physics::new()
//!     .with_rule(Rule::Grow(0.2))
//!     .with_rule(Rule::Wind {
//!         strength: Vec2::new(0.02, 0.01),
//!         time_scale: Vec2::new(0.01, 0.008),
//!         space_scale: 0.001,
//!     })
//!     .with_rule(Rule::Drag(0.995))
//!     .with_boundary(Boundary::None);
//! ```

use crate::lifecycle::RemovalReason;
use crate::particle::Particle;
use crate::spawn::SpawnContext;
use glam::Vec2;

/// Which axes a wrap boundary applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axes {
    Horizontal,
    Vertical,
    Both,
}

/// What happens when a particle reaches the canvas edge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Boundary {
    /// Leave the particle alone (other code decides its fate).
    #[default]
    None,
    /// Teleport to the opposite edge.
    ///
    /// With `padded`, the wrap window is widened by the particle's size on
    /// each side so large sprites leave the screen fully before reappearing.
    Wrap { axes: Axes, padded: bool },
    /// Reflect with energy loss: `v = -v * restitution`.
    ///
    /// Walls sit at `size` and `extent - size`, so the sprite's edge touches
    /// the canvas edge. The position is clamped onto the wall.
    Bounce { restitution: f32 },
    /// Remove once more than `margin` pixels outside the canvas.
    Despawn { margin: f32 },
}

/// A single per-frame behaviour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    /// Constant downward acceleration: `vy += g`.
    ///
    /// ```ignore
    /// Rule::Gravity(0.1)   // bouncing hearts
    /// Rule::Gravity(0.001) // barely-settling dust
    /// ```
    Gravity(f32),

    /// Multiplicative damping: `v *= factor`, with `factor` in `(0, 1)`.
    Drag(f32),

    /// Gusts varying with time and position:
    ///
    /// ```text
    /// vx += sin(time * time_scale.x + x * space_scale) * strength.x
    /// vy += cos(time * time_scale.y + y * space_scale) * strength.y
    /// ```
    Wind {
        strength: Vec2,
        time_scale: Vec2,
        space_scale: f32,
    },

    /// Lazy positional sway, independent of velocity:
    ///
    /// ```text
    /// x += sin(time * frequency.x + x * space_scale) * amplitude.x * k
    /// y += cos(time * frequency.y + y * space_scale) * amplitude.y * k
    /// ```
    ///
    /// where `k` is the particle's `drift` if `by_drift` is set, else 1.
    Float {
        amplitude: Vec2,
        frequency: Vec2,
        space_scale: f32,
        by_drift: bool,
    },

    /// Side-to-side wobble driven by the particle's own phase:
    /// `x += sin(phase) * amplitude`, then `phase += phase_speed`.
    Wobble { amplitude: f32 },

    /// Ease toward `target` by `rate * speed` of the remaining distance,
    /// picking a new random on-screen target with probability `retarget`.
    Seek { rate: f32, retarget: f32 },

    /// Size growth per frame.
    Grow(f32),
}

impl Rule {
    fn apply(&self, p: &mut Particle, time: f32, ctx: &mut SpawnContext) {
        match *self {
            Rule::Gravity(g) => p.velocity.y += g,
            Rule::Drag(factor) => p.velocity *= factor,
            Rule::Wind { strength, time_scale, space_scale } => {
                let phase = time * time_scale + p.position * space_scale;
                p.velocity.x += phase.x.sin() * strength.x;
                p.velocity.y += phase.y.cos() * strength.y;
            }
            Rule::Float { amplitude, frequency, space_scale, by_drift } => {
                let k = if by_drift { p.drift } else { 1.0 };
                let phase = time * frequency + p.position * space_scale;
                p.position.x += phase.x.sin() * amplitude.x * k;
                p.position.y += phase.y.cos() * amplitude.y * k;
            }
            Rule::Wobble { amplitude } => {
                p.position.x += p.phase.sin() * amplitude;
                p.phase += p.phase_speed;
            }
            Rule::Seek { rate, retarget } => {
                if p.target.is_none() || ctx.chance(retarget) {
                    p.target = Some(ctx.random_point());
                }
                if let Some(target) = p.target {
                    p.position += (target - p.position) * rate * p.speed;
                }
            }
            Rule::Grow(rate) => p.size += rate,
        }
    }
}

/// A physics profile: ordered rules plus a boundary policy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Physics {
    rules: Vec<Rule>,
    boundary: Boundary,
}

impl Physics {
    /// No rules, no boundary: particles just coast.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Advance one particle by one frame.
    ///
    /// Returns `Some(OutOfBounds)` when a [`Boundary::Despawn`] policy wants
    /// the particle gone. Opacity is not touched here; the particle system
    /// recomputes it after the step.
    pub fn step(
        &self,
        p: &mut Particle,
        time: f32,
        ctx: &mut SpawnContext,
    ) -> Option<RemovalReason> {
        p.position += p.velocity;

        for rule in &self.rules {
            rule.apply(p, time, ctx);
        }

        let verdict = apply_boundary(self.boundary, p, ctx.bounds);

        if p.trail.capacity() > 0 {
            p.trail.push(p.position);
        }
        p.life += 1.0;
        p.rotation += p.rotation_speed;
        verdict
    }
}

fn apply_boundary(boundary: Boundary, p: &mut Particle, bounds: Vec2) -> Option<RemovalReason> {
    match boundary {
        Boundary::None => None,
        Boundary::Wrap { axes, padded } => {
            let pad = if padded { p.size } else { 0.0 };
            if matches!(axes, Axes::Horizontal | Axes::Both) {
                p.position.x = wrap(p.position.x, -pad, bounds.x + pad);
            }
            if matches!(axes, Axes::Vertical | Axes::Both) {
                p.position.y = wrap(p.position.y, -pad, bounds.y + pad);
            }
            None
        }
        Boundary::Bounce { restitution } => {
            if bounce_axis(&mut p.position.x, &mut p.velocity.x, p.size, bounds.x, restitution) {
                p.bounce_count += 1;
            }
            if bounce_axis(&mut p.position.y, &mut p.velocity.y, p.size, bounds.y, restitution) {
                p.bounce_count += 1;
            }
            None
        }
        Boundary::Despawn { margin } => {
            let q = p.position;
            let inside = q.cmpge(Vec2::splat(-margin)).all() && q.cmple(bounds + margin).all();
            (!inside).then_some(RemovalReason::OutOfBounds)
        }
    }
}

/// Past `hi` reappears at `lo` and vice versa.
fn wrap(v: f32, lo: f32, hi: f32) -> f32 {
    if v > hi {
        lo
    } else if v < lo {
        hi
    } else {
        v
    }
}

/// Reflect on one axis. Returns true if a wall was hit.
fn bounce_axis(pos: &mut f32, vel: &mut f32, size: f32, extent: f32, restitution: f32) -> bool {
    let lo = size.min(extent * 0.5);
    let hi = (extent - size).max(lo);
    if *pos <= lo || *pos >= hi {
        *vel = -*vel * restitution;
        *pos = pos.clamp(lo, hi);
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> SpawnContext {
        SpawnContext::seeded(Vec2::new(800.0, 600.0), 11)
    }

    #[test]
    fn test_bounce_reflects_and_clamps() {
        let physics = Physics::new().with_boundary(Boundary::Bounce { restitution: 0.8 });
        let size = 20.0;
        let mut p = Particle::new(Vec2::new(size - 1.0, 300.0))
            .with_size(size)
            .with_velocity(Vec2::new(-5.0, 0.0));
        physics.step(&mut p, 0.0, &mut ctx());
        assert_eq!(p.position.x, size);
        assert_eq!(p.velocity.x, 5.0 * 0.8);
        assert_eq!(p.bounce_count, 1);
    }

    #[test]
    fn test_bounce_on_tiny_canvas_does_not_panic() {
        let physics = Physics::new().with_boundary(Boundary::Bounce { restitution: 0.5 });
        let mut small = SpawnContext::seeded(Vec2::new(10.0, 10.0), 0);
        let mut p = Particle::new(Vec2::new(5.0, 5.0)).with_size(40.0).with_velocity(Vec2::ONE);
        physics.step(&mut p, 0.0, &mut small);
        assert!(p.is_finite());
    }

    #[test]
    fn test_gravity_then_drag_once() {
        let physics = Physics::new().with_rule(Rule::Gravity(1.0)).with_rule(Rule::Drag(0.5));
        let mut p = Particle::new(Vec2::new(100.0, 100.0)).with_velocity(Vec2::new(2.0, 0.0));
        physics.step(&mut p, 0.0, &mut ctx());
        assert_eq!(p.position, Vec2::new(102.0, 100.0));
        assert_eq!(p.velocity, Vec2::new(1.0, 0.5));
    }

    #[test]
    fn test_wrap_horizontal() {
        let physics =
            Physics::new().with_boundary(Boundary::Wrap { axes: Axes::Horizontal, padded: false });
        let mut p = Particle::new(Vec2::new(799.0, 10.0)).with_velocity(Vec2::new(2.0, 0.0));
        physics.step(&mut p, 0.0, &mut ctx());
        assert_eq!(p.position.x, 0.0);

        let mut q = Particle::new(Vec2::new(1.0, 700.0)).with_velocity(Vec2::new(-2.0, 0.0));
        physics.step(&mut q, 0.0, &mut ctx());
        assert_eq!(q.position.x, 800.0);
        assert_eq!(q.position.y, 700.0);
    }

    #[test]
    fn test_padded_wrap_uses_size() {
        let physics =
            Physics::new().with_boundary(Boundary::Wrap { axes: Axes::Both, padded: true });
        let mut p = Particle::new(Vec2::new(805.0, 300.0)).with_size(10.0);
        physics.step(&mut p, 0.0, &mut ctx());
        assert_eq!(p.position.x, 805.0);
        p.position.x = 811.0;
        physics.step(&mut p, 0.0, &mut ctx());
        assert_eq!(p.position.x, -10.0);
    }

    #[test]
    fn test_despawn_margin() {
        let physics = Physics::new().with_boundary(Boundary::Despawn { margin: 50.0 });
        let mut p = Particle::new(Vec2::new(300.0, 640.0)).with_velocity(Vec2::new(0.0, 20.0));
        assert_eq!(physics.step(&mut p, 0.0, &mut ctx()), Some(RemovalReason::OutOfBounds));
        let mut q = Particle::new(Vec2::new(300.0, 300.0));
        assert_eq!(physics.step(&mut q, 0.0, &mut ctx()), None);
    }

    #[test]
    fn test_wind_at_rest() {
        let physics = Physics::new().with_rule(Rule::Wind {
            strength: Vec2::new(0.02, 0.01),
            time_scale: Vec2::ZERO,
            space_scale: 0.0,
        });
        let mut p = Particle::new(Vec2::new(10.0, 10.0));
        physics.step(&mut p, 0.0, &mut ctx());
        // sin(0) = 0, cos(0) = 1
        assert_eq!(p.velocity.x, 0.0);
        assert!((p.velocity.y - 0.01).abs() < 1e-7);
    }

    #[test]
    fn test_seek_moves_toward_target() {
        let physics = Physics::new().with_rule(Rule::Seek { rate: 0.01, retarget: 0.0 });
        let mut p = Particle::new(Vec2::ZERO);
        p.speed = 1.0;
        p.target = Some(Vec2::new(100.0, 0.0));
        physics.step(&mut p, 0.0, &mut ctx());
        assert!((p.position.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_life_and_rotation_advance() {
        let physics = Physics::new().with_rule(Rule::Grow(0.2));
        let mut p = Particle::new(Vec2::ZERO).with_rotation(0.0, 0.1).with_size(1.0).with_trail(2);
        physics.step(&mut p, 0.0, &mut ctx());
        assert_eq!(p.life, 1.0);
        assert!((p.rotation - 0.1).abs() < 1e-6);
        assert!((p.size - 1.2).abs() < 1e-6);
        assert_eq!(p.trail.len(), 1);
    }
}
