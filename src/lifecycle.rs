//! Particle lifecycle: the opacity envelope and the removal predicate.
//!
//! Every particle's opacity is derived from its age ratio `r = life / max_life`
//! through a three-phase envelope:
//!
//! | Phase | Range | Opacity |
//! |-------|-------|---------|
//! | Fade in | `r < fade_in` | `(r / fade_in) * max_opacity` |
//! | Steady | otherwise | `max_opacity`, optionally pulsed |
//! | Fade out | `r > fade_out` | `max_opacity * (1 - (r - fade_out) / (1 - fade_out))` |
//!
//! The pulse is `max_opacity * (floor + (1 - floor) * sin(time * speed + phase))`,
//! clamped into `[0, max_opacity]`.
//!
//! Opacity is always recomputed from scratch, so calling
//! [`Lifecycle::opacity`] any number of times for the same inputs gives the
//! same answer.
//!
//! # Presets
//!
//! ```ignore
//! Lifecycle::standard()              // 10% fade in, fade out from 80%
//! Lifecycle::ripple()                // fade out from 70%
//! Lifecycle::immortal()              // recycled particles: no envelope, no expiry
//! Lifecycle::standard().pulse(0.9, 0.05).margin(50.0)
//! Lifecycle::standard().ceiling(Ceiling::Fixed(100.0)) // rising smoke
//! ```

use crate::particle::Particle;
use glam::Vec2;

/// Why a particle left the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    /// `life > max_life`.
    Expired,
    /// Opacity reached zero after fading in.
    Faded,
    /// Outside the canvas plus margin.
    OutOfBounds,
}

/// Sinusoidal "breathing" applied in the steady phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    /// Lowest point of the wave as a fraction of `max_opacity` (before clamping).
    pub floor: f32,
    /// Radians per frame. Zero defers to each particle's `phase_speed`.
    pub speed: f32,
}

/// How far above the top edge a rising particle may go before removal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ceiling {
    /// Removed once `y < -px`.
    Fixed(f32),
    /// Removed once `y < -(size + px)`, so large sprites clear the edge first.
    PastSize(f32),
}

impl Ceiling {
    fn is_above(&self, particle: &Particle) -> bool {
        match *self {
            Ceiling::Fixed(px) => particle.position.y < -px,
            Ceiling::PastSize(px) => particle.position.y < -(particle.size + px),
        }
    }
}

/// Lifecycle configuration. See the [module docs](self).
#[derive(Debug, Clone, PartialEq)]
pub struct Lifecycle {
    fade_in: f32,
    fade_out: f32,
    pulse: Option<Pulse>,
    mortal: bool,
    margin: Option<f32>,
    ceiling: Option<Ceiling>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::standard()
    }
}

impl Lifecycle {
    pub const DEFAULT_FADE_IN: f32 = 0.1;
    pub const DEFAULT_FADE_OUT: f32 = 0.8;
    pub const RIPPLE_FADE_OUT: f32 = 0.7;

    // =========================================================================
    // PRESETS
    // =========================================================================

    /// Fade in over the first 10%, fade out after 80%, expire at `max_life`.
    pub fn standard() -> Self {
        Self {
            fade_in: Self::DEFAULT_FADE_IN,
            fade_out: Self::DEFAULT_FADE_OUT,
            pulse: None,
            mortal: true,
            margin: None,
            ceiling: None,
        }
    }

    /// Ripple rings: same fade in, earlier fade out at 70%.
    pub fn ripple() -> Self {
        Self::standard().fade_out(Self::RIPPLE_FADE_OUT)
    }

    /// Particles that are recycled rather than removed.
    ///
    /// No envelope, no expiry: opacity is the steady value (pulsed if a
    /// pulse is configured) from the first frame.
    pub fn immortal() -> Self {
        Self {
            mortal: false,
            ..Self::standard()
        }
    }

    // =========================================================================
    // BUILDER METHODS
    // =========================================================================

    /// Length of the fade-in as a fraction of life.
    pub fn fade_in(mut self, fraction: f32) -> Self {
        self.fade_in = fraction.clamp(0.0, 1.0);
        self
    }

    /// Age ratio after which the fade-out starts.
    pub fn fade_out(mut self, threshold: f32) -> Self {
        self.fade_out = threshold.clamp(0.0, 1.0);
        self
    }

    /// Pulse the steady phase. `speed == 0.0` uses each particle's `phase_speed`.
    pub fn pulse(mut self, floor: f32, speed: f32) -> Self {
        self.pulse = Some(Pulse { floor, speed });
        self
    }

    /// Remove particles more than `px` outside the canvas.
    pub fn margin(mut self, px: f32) -> Self {
        self.margin = Some(px);
        self
    }

    /// Remove particles that have risen past `ceiling`.
    pub fn ceiling(mut self, ceiling: Ceiling) -> Self {
        self.ceiling = Some(ceiling);
        self
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn fade_out_threshold(&self) -> f32 {
        self.fade_out
    }

    /// The unpulsed envelope for `(life, max_life, max_opacity)`.
    ///
    /// Always in `[0, max_opacity]`.
    pub fn envelope(&self, life: f32, max_life: f32, max_opacity: f32) -> f32 {
        let max_opacity = max_opacity.max(0.0);
        if !self.mortal || max_life <= 0.0 {
            return max_opacity;
        }
        let r = life / max_life;
        let value = if r < self.fade_in {
            (r / self.fade_in) * max_opacity
        } else if r > self.fade_out {
            let span = 1.0 - self.fade_out;
            if span > f32::EPSILON {
                max_opacity * (1.0 - (r - self.fade_out) / span)
            } else {
                0.0
            }
        } else {
            max_opacity
        };
        value.clamp(0.0, max_opacity)
    }

    /// True while the particle is in the steady phase.
    fn is_steady(&self, life: f32, max_life: f32) -> bool {
        if !self.mortal {
            return true;
        }
        let r = life / max_life;
        r >= self.fade_in && r <= self.fade_out
    }

    /// Current opacity for `particle` at frame time `time`.
    pub fn opacity(&self, particle: &Particle, time: f32) -> f32 {
        let base = self.envelope(particle.life, particle.max_life, particle.max_opacity);
        match self.pulse {
            Some(pulse) if self.is_steady(particle.life, particle.max_life) => {
                let speed = if pulse.speed != 0.0 { pulse.speed } else { particle.phase_speed };
                let swing = (time * speed + particle.phase).sin();
                let wave = pulse.floor + (1.0 - pulse.floor) * swing;
                (base * wave).clamp(0.0, particle.max_opacity.max(0.0))
            }
            _ => base,
        }
    }

    pub fn is_expired(&self, particle: &Particle) -> bool {
        self.mortal && particle.life > particle.max_life
    }

    /// The removal predicate: expired, faded out, beyond the margin, or
    /// above the ceiling.
    ///
    /// A particle still fading in is never "faded": its zero opacity at
    /// birth is not a reason to drop it.
    pub fn removal(&self, particle: &Particle, bounds: Vec2) -> Option<RemovalReason> {
        if self.is_expired(particle) {
            return Some(RemovalReason::Expired);
        }
        if self.mortal && particle.opacity <= 0.0 && particle.age_ratio() >= self.fade_in {
            return Some(RemovalReason::Faded);
        }
        if let Some(margin) = self.margin {
            let p = particle.position;
            let inside = p.cmpge(Vec2::splat(-margin)).all() && p.cmple(bounds + margin).all();
            if !inside {
                return Some(RemovalReason::OutOfBounds);
            }
        }
        if self.ceiling.is_some_and(|c| c.is_above(particle)) {
            return Some(RemovalReason::OutOfBounds);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aged(life: f32, max_life: f32) -> Particle {
        let mut p = Particle::new(Vec2::ZERO).with_max_life(max_life).with_max_opacity(0.8);
        p.life = life;
        p
    }

    #[test]
    fn test_standard_envelope_phases() {
        let l = Lifecycle::standard();
        assert_eq!(l.envelope(0.0, 100.0, 0.8), 0.0);
        assert!((l.envelope(5.0, 100.0, 0.8) - 0.4).abs() < 1e-6);
        assert_eq!(l.envelope(50.0, 100.0, 0.8), 0.8);
        assert!((l.envelope(90.0, 100.0, 0.8) - 0.4).abs() < 1e-5);
        assert_eq!(l.envelope(100.0, 100.0, 0.8), 0.0);
        assert_eq!(l.envelope(130.0, 100.0, 0.8), 0.0);
    }

    #[test]
    fn test_ripple_fades_earlier() {
        let l = Lifecycle::ripple();
        assert_eq!(l.fade_out_threshold(), 0.7);
        assert!(l.envelope(75.0, 100.0, 1.0) < 1.0);
        assert_eq!(Lifecycle::standard().envelope(75.0, 100.0, 1.0), 1.0);
    }

    #[test]
    fn test_pulse_only_in_steady_phase() {
        let l = Lifecycle::standard().pulse(0.9, 0.05);
        let young = aged(5.0, 100.0);
        assert_eq!(l.opacity(&young, 12.0), l.envelope(5.0, 100.0, 0.8));

        let mid = aged(50.0, 100.0);
        let t = std::f32::consts::FRAC_PI_2 * 3.0 / 0.05; // sin = -1
        assert!((l.opacity(&mid, t) - 0.8 * 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_pulse_with_low_floor_never_negative() {
        let l = Lifecycle::immortal().pulse(0.0, 1.0);
        let p = aged(0.0, 1.0);
        for i in 0..100 {
            let o = l.opacity(&p, i as f32 * 0.37);
            assert!((0.0..=p.max_opacity).contains(&o));
        }
    }

    #[test]
    fn test_per_particle_pulse_speed() {
        let l = Lifecycle::immortal().pulse(0.5, 0.0);
        let mut p = aged(0.0, 1.0);
        p.phase_speed = 0.02;
        let t = std::f32::consts::FRAC_PI_2 / 0.02; // sin = 1
        assert!((l.opacity(&p, t) - p.max_opacity).abs() < 1e-4);
    }

    #[test]
    fn test_recomputed_not_compounded() {
        let l = Lifecycle::standard();
        let p = aged(85.0, 100.0);
        let first = l.opacity(&p, 3.0);
        let second = l.opacity(&p, 3.0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_immortal_never_expires() {
        let l = Lifecycle::immortal();
        let p = aged(1e6, 10.0);
        assert!(!l.is_expired(&p));
        assert_eq!(l.removal(&p, Vec2::splat(100.0)), None);
    }

    #[test]
    fn test_removal_reasons() {
        let l = Lifecycle::standard().margin(50.0);
        let bounds = Vec2::new(800.0, 600.0);

        assert_eq!(l.removal(&aged(101.0, 100.0), bounds), Some(RemovalReason::Expired));

        let newborn = aged(0.0, 100.0);
        assert_eq!(l.removal(&newborn, bounds), None);

        let mut faded = aged(50.0, 100.0);
        faded.opacity = 0.0;
        assert_eq!(l.removal(&faded, bounds), Some(RemovalReason::Faded));

        let mut outside = aged(50.0, 100.0);
        outside.opacity = 0.5;
        outside.position = Vec2::new(-51.0, 10.0);
        assert_eq!(l.removal(&outside, bounds), Some(RemovalReason::OutOfBounds));
        outside.position = Vec2::new(-49.0, 649.0);
        assert_eq!(l.removal(&outside, bounds), None);
    }

    #[test]
    fn test_ceiling_removes_risen_particles() {
        let bounds = Vec2::new(800.0, 600.0);
        let fixed = Lifecycle::standard().ceiling(Ceiling::Fixed(100.0));
        let mut p = aged(50.0, 100.0);
        p.opacity = 0.5;
        p.size = 40.0;

        p.position = Vec2::new(400.0, -99.0);
        assert_eq!(fixed.removal(&p, bounds), None);
        p.position.y = -101.0;
        assert_eq!(fixed.removal(&p, bounds), Some(RemovalReason::OutOfBounds));

        let sized = Lifecycle::standard().ceiling(Ceiling::PastSize(50.0));
        assert_eq!(sized.removal(&p, bounds), None);
        p.position.y = -91.0;
        assert_eq!(sized.removal(&p, bounds), Some(RemovalReason::OutOfBounds));

        // Sideways and downward drift is not the ceiling's concern
        p.position = Vec2::new(-500.0, 900.0);
        assert_eq!(fixed.removal(&p, bounds), None);
    }
}
