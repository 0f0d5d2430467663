//! Emission policies: when and where new particles appear.
//!
//! An [`Emitter`] never builds particles itself. It decides *that* something
//! should spawn and *where*, producing [`Emission`]s; the owning particle
//! system turns each one into a particle through its spawner. The same
//! emissions drive wave-grid impulses for the water ripple.
//!
//! # Emitter Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Emitter::Burst`] | `count` spawns once, on activation |
//! | [`Emitter::Continuous`] | one spawn per frame with probability `p`, while under `cap` |
//! | [`Emitter::Edge`] | continuous, but just outside a random canvas edge |
//! | [`Emitter::Interaction`] | spawns at the pointer, plus delayed follow-ups |
//!
//! # Example
//!
//! ```ignore
//! // Bubbles: 25 to start, then trickle in from below while fewer than 30
//! let initial = Emitter::Burst { count: 25, site: SpawnSite::BelowBottom { depth: 100.0 } };
//! let trickle = Emitter::Continuous {
//!     probability: 0.02,
//!     cap: 30,
//!     site: SpawnSite::BelowBottom { depth: 100.0 },
//! };
//! ```

use crate::input::PointerEvent;
use crate::scheduler::Scheduler;
use crate::spawn::SpawnContext;
use glam::Vec2;

/// Where a spawn lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnSite {
    /// Uniform over the canvas.
    Anywhere,
    /// Random x, `y` in `(-depth, 0]`.
    AboveTop { depth: f32 },
    /// Random x, `y` in `[height, height + depth)`.
    BelowBottom { depth: f32 },
    /// Random x, `y = height + offset` exactly.
    Beneath { offset: f32 },
    /// `margin` pixels outside a random edge.
    AnyEdge { margin: f32 },
    /// A fixed point.
    At(Vec2),
}

impl SpawnSite {
    pub fn sample(&self, ctx: &mut SpawnContext) -> Vec2 {
        let bounds = ctx.bounds;
        match *self {
            SpawnSite::Anywhere => ctx.random_point(),
            SpawnSite::AboveTop { depth } => {
                Vec2::new(ctx.random() * bounds.x, -ctx.random() * depth)
            }
            SpawnSite::BelowBottom { depth } => {
                Vec2::new(ctx.random() * bounds.x, bounds.y + ctx.random() * depth)
            }
            SpawnSite::Beneath { offset } => Vec2::new(ctx.random() * bounds.x, bounds.y + offset),
            SpawnSite::AnyEdge { margin } => {
                let edge = ctx.random_edge();
                ctx.point_past(edge, margin)
            }
            SpawnSite::At(p) => p,
        }
    }
}

/// A request to spawn one thing at `position`.
///
/// `strength` is 1 for ordinary spawns; interaction emitters set it from
/// their configuration (ripple impulse strength).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emission {
    pub position: Vec2,
    pub strength: f32,
}

impl Emission {
    pub fn at(position: Vec2) -> Self {
        Self { position, strength: 1.0 }
    }
}

/// A delayed extra spawn after a click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowUp {
    /// Seconds after the click.
    pub delay: f32,
    /// Random offset of up to `±spread` pixels per axis.
    pub spread: f32,
    pub strength: f32,
}

/// Particle emission policy. See the [module docs](self).
#[derive(Debug, Clone, PartialEq)]
pub enum Emitter {
    /// Spawn `count` at activation, then nothing.
    Burst { count: usize, site: SpawnSite },

    /// Each frame, with probability `probability`, spawn one if the
    /// population is below `cap`.
    Continuous {
        probability: f32,
        cap: usize,
        site: SpawnSite,
    },

    /// Continuous emission `margin` pixels outside a random edge.
    Edge {
        probability: f32,
        cap: usize,
        margin: f32,
    },

    /// Pointer-driven spawns.
    ///
    /// A move spawns with probability `move_chance`; a click always spawns
    /// and schedules every follow-up.
    Interaction {
        move_chance: f32,
        move_strength: f32,
        click_strength: f32,
        follow_ups: Vec<FollowUp>,
    },
}

impl Emitter {
    /// Spawns due on activation.
    pub fn initial(&self, ctx: &mut SpawnContext) -> Vec<Emission> {
        match self {
            Emitter::Burst { count, site } => {
                (0..*count).map(|_| Emission::at(site.sample(ctx))).collect()
            }
            _ => Vec::new(),
        }
    }

    /// The spawn (if any) for one frame given the current population.
    pub fn frame(&self, population: usize, ctx: &mut SpawnContext) -> Option<Emission> {
        let (probability, cap, site) = match *self {
            Emitter::Continuous { probability, cap, site } => (probability, cap, site),
            Emitter::Edge { probability, cap, margin } => {
                (probability, cap, SpawnSite::AnyEdge { margin })
            }
            _ => return None,
        };
        if population < cap && ctx.chance(probability) {
            Some(Emission::at(site.sample(ctx)))
        } else {
            None
        }
    }

    /// Spawns caused by a pointer event at time `now` (seconds).
    ///
    /// Follow-ups go into `scheduler` and come back through the session
    /// when due.
    pub fn pointer(
        &self,
        event: PointerEvent,
        now: f32,
        ctx: &mut SpawnContext,
        scheduler: &mut Scheduler<Emission>,
    ) -> Vec<Emission> {
        let Emitter::Interaction {
            move_chance,
            move_strength,
            click_strength,
            follow_ups,
        } = self
        else {
            return Vec::new();
        };
        match event {
            PointerEvent::Move(position) => {
                if ctx.chance(*move_chance) {
                    vec![Emission { position, strength: *move_strength }]
                } else {
                    Vec::new()
                }
            }
            PointerEvent::Click(position) => {
                for follow in follow_ups {
                    let at = ctx.jitter(position, follow.spread);
                    let echo = Emission { position: at, strength: follow.strength };
                    scheduler.schedule(now + follow.delay, echo);
                }
                vec![Emission { position, strength: *click_strength }]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> SpawnContext {
        SpawnContext::seeded(Vec2::new(800.0, 600.0), 5)
    }

    #[test]
    fn test_burst_only_initial() {
        let e = Emitter::Burst { count: 25, site: SpawnSite::Anywhere };
        let mut c = ctx();
        assert_eq!(e.initial(&mut c).len(), 25);
        assert!(e.frame(0, &mut c).is_none());
    }

    #[test]
    fn test_continuous_respects_cap() {
        let e = Emitter::Continuous { probability: 1.0, cap: 3, site: SpawnSite::Anywhere };
        let mut c = ctx();
        assert!(e.frame(2, &mut c).is_some());
        assert!(e.frame(3, &mut c).is_none());
    }

    #[test]
    fn test_below_bottom_site() {
        let mut c = ctx();
        for _ in 0..100 {
            let p = SpawnSite::BelowBottom { depth: 100.0 }.sample(&mut c);
            assert!(p.y >= 600.0 && p.y < 700.0);
        }
    }

    #[test]
    fn test_beneath_site_is_fixed_depth() {
        let mut c = ctx();
        for _ in 0..20 {
            let p = SpawnSite::Beneath { offset: 20.0 }.sample(&mut c);
            assert_eq!(p.y, 620.0);
            assert!((0.0..800.0).contains(&p.x));
        }
    }

    #[test]
    fn test_edge_spawns_outside() {
        let e = Emitter::Edge { probability: 1.0, cap: usize::MAX, margin: 10.0 };
        let mut c = ctx();
        for _ in 0..50 {
            let p = e.frame(0, &mut c).map(|e| e.position).unwrap_or(Vec2::splat(400.0));
            let outside = p.x <= -10.0 || p.y <= -10.0 || p.x >= 810.0 || p.y >= 610.0;
            assert!(outside, "{p:?}");
        }
    }

    #[test]
    fn test_click_schedules_follow_up() {
        let e = Emitter::Interaction {
            move_chance: 0.0,
            move_strength: 0.3,
            click_strength: 0.8,
            follow_ups: vec![FollowUp { delay: 0.15, spread: 15.0, strength: 0.4 }],
        };
        let mut c = ctx();
        let mut s = Scheduler::new();
        let now = e.pointer(PointerEvent::Click(Vec2::new(100.0, 100.0)), 1.0, &mut c, &mut s);
        assert_eq!(now, vec![Emission { position: Vec2::new(100.0, 100.0), strength: 0.8 }]);
        assert!(s.take_due(1.1).is_empty());
        let later = s.take_due(1.2);
        assert_eq!(later.len(), 1);
        assert_eq!(later[0].strength, 0.4);
        assert!((later[0].position - Vec2::new(100.0, 100.0)).abs().max_element() <= 15.0);

        assert!(e.pointer(PointerEvent::Move(Vec2::ZERO), 1.0, &mut c, &mut s).is_empty());
    }
}
