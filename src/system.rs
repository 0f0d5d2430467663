//! One particle pool and the per-frame pipeline that drives it.
//!
//! A [`ParticleSystem`] ties together the pieces every particle effect
//! needs:
//!
//! ```text
//! emitters ──▶ spawner ──▶ particles ──▶ physics ──▶ lifecycle ──▶ evictions
//! ```
//!
//! Each [`update`](ParticleSystem::update) runs emission, then the physics
//! step, then the opacity envelope, then removal. Removal compacts the pool
//! in place with `Vec::retain` and reports each evicted particle so effects
//! can react (a raindrop leaving the screen becomes a splash).
//!
//! # Example
//!
//! ```ignore
//! let mut dust = ParticleSystem::new("dust")
//!     .with_emitter(Emitter::Burst { count: 120, site: SpawnSite::Anywhere })
//!     .with_emitter(Emitter::Edge { probability: 0.05, cap: 160, margin: 10.0 })
//!     .with_physics(Physics::new().with_rule(Rule::Gravity(0.001)).with_rule(Rule::Drag(0.999)))
//!     .with_lifecycle(Lifecycle::standard().margin(50.0))
//!     .with_spawner(|ctx, emission| {
//!         Particle::new(emission.position).with_size(ctx.random_range(1.0, 4.0))
//!     });
//!
//! dust.activate(&mut ctx);
//! let evicted = dust.update(time, &mut ctx);
//! ```

use crate::emitter::{Emission, Emitter};
use crate::input::PointerEvent;
use crate::lifecycle::{Lifecycle, RemovalReason};
use crate::particle::Particle;
use crate::rules::Physics;
use crate::scheduler::Scheduler;
use crate::spawn::SpawnContext;
use glam::Vec2;
use tracing::debug;

/// Builds a particle for one emission. Must set every field the effect uses.
pub type Spawner = Box<dyn FnMut(&mut SpawnContext, Emission) -> Particle + Send>;

/// A particle that left the pool this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eviction {
    pub position: Vec2,
    pub reason: RemovalReason,
}

/// A pool of particles with its emission, physics and lifecycle.
pub struct ParticleSystem {
    label: &'static str,
    particles: Vec<Particle>,
    emitters: Vec<Emitter>,
    physics: Physics,
    lifecycle: Lifecycle,
    spawner: Spawner,
}

impl std::fmt::Debug for ParticleSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleSystem")
            .field("label", &self.label)
            .field("particles", &self.particles.len())
            .field("emitters", &self.emitters)
            .field("physics", &self.physics)
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}

impl ParticleSystem {
    /// Empty pool with no emitters, no physics and a default spawner that
    /// places a plain particle at the emission point.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            particles: Vec::new(),
            emitters: Vec::new(),
            physics: Physics::new(),
            lifecycle: Lifecycle::standard(),
            spawner: Box::new(|_, emission| Particle::new(emission.position)),
        }
    }

    // =========================================================================
    // BUILDER METHODS
    // =========================================================================

    pub fn with_emitter(mut self, emitter: Emitter) -> Self {
        self.emitters.push(emitter);
        self
    }

    pub fn with_physics(mut self, physics: Physics) -> Self {
        self.physics = physics;
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    pub fn with_spawner<F>(mut self, spawner: F) -> Self
    where
        F: FnMut(&mut SpawnContext, Emission) -> Particle + Send + 'static,
    {
        self.spawner = Box::new(spawner);
        self
    }

    // =========================================================================
    // SPAWNING
    // =========================================================================

    /// Fire the burst emitters. Returns how many particles were spawned.
    pub fn activate(&mut self, ctx: &mut SpawnContext) -> usize {
        let emissions: Vec<Emission> = self.emitters.iter().flat_map(|e| e.initial(ctx)).collect();
        let n = emissions.len();
        for emission in emissions {
            self.spawn(emission, ctx);
        }
        debug!(system = self.label, spawned = n, "initial burst");
        n
    }

    /// Spawn one particle through the spawner. It starts at zero life and
    /// zero opacity whatever the spawner set.
    pub fn spawn(&mut self, emission: Emission, ctx: &mut SpawnContext) {
        let mut particle = (self.spawner)(ctx, emission);
        particle.life = 0.0;
        particle.opacity = 0.0;
        self.particles.push(particle);
    }

    /// Add an already-built particle as is.
    pub fn push(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    /// Feed a pointer event to the interaction emitters.
    pub fn pointer(
        &mut self,
        event: PointerEvent,
        now: f32,
        ctx: &mut SpawnContext,
        scheduler: &mut Scheduler<Emission>,
    ) {
        let emissions: Vec<Emission> = self
            .emitters
            .iter()
            .flat_map(|e| e.pointer(event, now, ctx, scheduler))
            .collect();
        for emission in emissions {
            self.spawn(emission, ctx);
        }
    }

    // =========================================================================
    // FRAME
    // =========================================================================

    /// Advance one frame at effect time `time`.
    pub fn update(&mut self, time: f32, ctx: &mut SpawnContext) -> Vec<Eviction> {
        for i in 0..self.emitters.len() {
            if let Some(emission) = self.emitters[i].frame(self.particles.len(), ctx) {
                self.spawn(emission, ctx);
            }
        }

        let bounds = ctx.bounds;
        let mut verdicts = Vec::with_capacity(self.particles.len());
        for p in &mut self.particles {
            let boundary = self.physics.step(p, time, ctx);
            p.opacity = self.lifecycle.opacity(p, time);
            let verdict = boundary.or_else(|| self.lifecycle.removal(p, bounds));
            verdicts.push(verdict);
        }

        let mut evictions = Vec::new();
        let mut verdicts = verdicts.into_iter();
        self.particles.retain(|p| match verdicts.next().flatten() {
            Some(reason) => {
                evictions.push(Eviction { position: p.position, reason });
                false
            }
            None => true,
        });
        evictions
    }

    // =========================================================================
    // ACCESS
    // =========================================================================

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::SpawnSite;
    use crate::rules::{Boundary, Rule};

    fn ctx() -> SpawnContext {
        SpawnContext::seeded(Vec2::new(800.0, 600.0), 9)
    }

    #[test]
    fn test_activate_bursts() {
        let mut system = ParticleSystem::new("test")
            .with_emitter(Emitter::Burst { count: 10, site: SpawnSite::Anywhere });
        let mut c = ctx();
        assert_eq!(system.activate(&mut c), 10);
        assert_eq!(system.len(), 10);
        assert!(system.particles().iter().all(|p| p.opacity == 0.0 && p.life == 0.0));
    }

    #[test]
    fn test_expired_particles_evicted() {
        let mut system = ParticleSystem::new("test")
            .with_emitter(Emitter::Burst { count: 4, site: SpawnSite::At(Vec2::new(10.0, 10.0)) })
            .with_spawner(|_, e| Particle::new(e.position).with_max_life(3.0));
        let mut c = ctx();
        system.activate(&mut c);
        for frame in 0..3 {
            assert!(system.update(frame as f32, &mut c).is_empty());
        }
        let evicted = system.update(3.0, &mut c);
        assert_eq!(evicted.len(), 4);
        assert!(evicted.iter().all(|e| e.reason == RemovalReason::Expired));
        assert!(system.is_empty());
    }

    #[test]
    fn test_despawn_boundary_reports_position() {
        let mut system = ParticleSystem::new("test")
            .with_physics(Physics::new().with_boundary(Boundary::Despawn { margin: 0.0 }))
            .with_lifecycle(Lifecycle::immortal());
        system.push(Particle::new(Vec2::new(799.0, 300.0)).with_velocity(Vec2::new(5.0, 0.0)));
        system.push(Particle::new(Vec2::new(400.0, 300.0)));
        let evicted = system.update(0.0, &mut ctx());
        let expected = Eviction {
            position: Vec2::new(804.0, 300.0),
            reason: RemovalReason::OutOfBounds,
        };
        assert_eq!(evicted, vec![expected]);
        assert_eq!(system.len(), 1);
    }

    #[test]
    fn test_opacity_follows_envelope() {
        let mut system = ParticleSystem::new("test")
            .with_physics(Physics::new().with_rule(Rule::Gravity(0.0)))
            .with_spawner(|_, e| {
                Particle::new(e.position).with_max_life(100.0).with_max_opacity(0.5)
            });
        let mut c = ctx();
        system.spawn(Emission::at(Vec2::splat(100.0)), &mut c);
        for t in 0..50 {
            system.update(t as f32, &mut c);
        }
        assert_eq!(system.particles()[0].opacity, 0.5);
    }

    #[test]
    fn test_continuous_never_exceeds_cap() {
        let mut system = ParticleSystem::new("test")
            .with_emitter(Emitter::Continuous {
                probability: 1.0,
                cap: 5,
                site: SpawnSite::Anywhere,
            })
            .with_lifecycle(Lifecycle::immortal());
        let mut c = ctx();
        for t in 0..100 {
            system.update(t as f32, &mut c);
            assert!(system.len() <= 5);
        }
        assert_eq!(system.len(), 5);
    }
}
