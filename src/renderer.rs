//! Particle sprites.
//!
//! Each particle effect draws its pool with one [`Sprite`]. A sprite reads
//! the particle (never writes it) and paints a stack of layers: glows,
//! bodies, highlights, trails. Every draw happens inside
//! [`Canvas::scoped`], so rotations, alpha and blend changes stay local to
//! one particle.
//!
//! | Sprite | Used by | Layers |
//! |--------|---------|--------|
//! | `Flake` | snow | soft glow, white disc |
//! | `Balloon` | balloons | string, glow, gradient body, knot, highlight |
//! | `Bubble` | bubbles | shadow, iridescent body, rim, two highlights, reflection |
//! | `Firefly` | fireflies | fading trail, outer glow, core, white centre |
//! | `Raindrop` | rain | slanted streak with a bright core |
//! | `Droplet` | rain splashes | dot with a short motion tail |
//! | `SplashRing` | rain splashes | expanding ring |
//! | `Smoke` | smoke | three soft radial layers, rotated |
//! | `Mote` | dust | disc with a faint halo |
//! | `Heart` | hearts | shadow, body, outline, highlight, optional sparkle |

use crate::canvas::{Canvas, Path};
use crate::particle::Particle;
use crate::visuals::{Color, Gradient, Paint};
use glam::Vec2;

const STRING_BROWN: u32 = 0x8B4513;
const SKY_BLUE: u32 = 0x87CEEB;
const POWDER_BLUE: u32 = 0xB0E0E6;

/// How a particle pool is drawn. See the [module docs](self).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sprite {
    Flake,
    Balloon,
    Bubble,
    Firefly,
    Raindrop,
    Droplet,
    SplashRing,
    Smoke,
    Mote,
    Heart,
}

impl Sprite {
    /// Draw every visible particle in order.
    pub fn draw_all(self, canvas: &mut Canvas, particles: &[Particle], time: f32) {
        for p in particles {
            self.draw(canvas, p, time);
        }
    }

    /// Draw one particle. Fully transparent particles are skipped.
    pub fn draw(self, canvas: &mut Canvas, p: &Particle, time: f32) {
        if p.opacity <= 0.0 && self != Sprite::Firefly {
            return;
        }
        canvas.scoped(|c| match self {
            Sprite::Flake => flake(c, p),
            Sprite::Balloon => balloon(c, p),
            Sprite::Bubble => bubble(c, p, time),
            Sprite::Firefly => firefly(c, p),
            Sprite::Raindrop => raindrop(c, p),
            Sprite::Droplet => droplet(c, p),
            Sprite::SplashRing => splash_ring(c, p),
            Sprite::Smoke => smoke(c, p),
            Sprite::Mote => mote(c, p),
            Sprite::Heart => heart(c, p),
        });
    }
}

/// Radial falloff from `color` at the centre to transparent at the rim.
pub fn glow(center: Vec2, radius: f32, color: Color) -> Paint {
    Paint::radial(center, 0.0, radius, Gradient::linear(color, color.with_alpha(0.0)))
}

/// The heart outline used by the hearts effect, centred on the origin.
///
/// The shape is authored for `size == 20`; other sizes scale it.
pub fn heart_path(size: f32) -> Path {
    let s = size / 20.0;
    Path::new()
        .move_to(Vec2::new(0.0, 4.0 * s))
        .cubic_to(Vec2::new(-6.0, -3.0) * s, Vec2::new(-12.0, 2.0) * s, Vec2::new(0.0, 14.0) * s)
        .cubic_to(Vec2::new(12.0, 2.0) * s, Vec2::new(6.0, -3.0) * s, Vec2::new(0.0, 4.0) * s)
}

fn flake(c: &mut Canvas, p: &Particle) {
    c.set_alpha(p.opacity);
    let halo = glow(p.position, p.size * 2.0, Color::WHITE.with_alpha(0.5));
    c.fill_circle(p.position, p.size * 2.0, &halo);
    c.fill_circle(p.position, p.size, &Color::WHITE.into());
}

fn balloon(c: &mut Canvas, p: &Particle) {
    let top = p.position + Vec2::new(0.0, p.size);
    c.set_alpha(p.opacity * 0.6);
    c.stroke_line(top, top + Vec2::new(0.0, p.length), 2.0, &Color::hex(STRING_BROWN).into());

    c.set_alpha(p.opacity);
    let halo = glow(p.position, p.size * 1.3, p.color.with_alpha(0.35));
    c.fill_circle(p.position, p.size * 1.3, &halo);
    let light = p.position - Vec2::splat(p.size * 0.3);
    let body = Gradient::new()
        .stop(0.0, p.color)
        .stop(0.7, p.color)
        .stop(1.0, p.color.with_alpha(0.5));
    c.fill_circle(p.position, p.size, &Paint::radial(light, 0.0, p.size * 1.3, body));
    let knot = [top - Vec2::new(0.0, 2.0), top + Vec2::new(-3.0, 4.0), top + Vec2::new(3.0, 4.0)];
    c.fill_polygon(&knot, &p.color.lerp(Color::BLACK, 0.2).into());

    c.set_alpha(p.opacity * 0.4);
    c.fill_circle(light, p.size * 0.3, &Color::WHITE.into());
}

fn bubble(c: &mut Canvas, p: &Particle, time: f32) {
    let hue1 = (p.hue + (time * 0.01 + p.position.x * 0.01).sin() * 30.0).rem_euclid(360.0);
    let hue2 = (p.hue + 60.0 + (time * 0.01 + p.position.y * 0.01).cos() * 30.0).rem_euclid(360.0);
    let hue3 = (p.hue + 120.0).rem_euclid(360.0);
    let (x, s) = (p.position, p.size);

    c.set_alpha(p.opacity * 0.1);
    c.fill_circle(x + Vec2::splat(2.0), s, &Color::BLACK.with_alpha(0.2).into());

    c.set_alpha(p.opacity);
    let body = Gradient::new()
        .stop(0.0, Color::hsla(hue1, 0.7, 0.8, 0.1))
        .stop(0.3, Color::hsla(hue2, 0.6, 0.7, 0.3))
        .stop(0.7, Color::hsla(hue3, 0.5, 0.6, 0.4))
        .stop(1.0, Color::hsla(p.hue, 0.4, 0.5, 0.6));
    c.fill_circle(x, s, &Paint::radial(x - Vec2::splat(s * 0.3), 0.0, s * 1.3, body));

    c.set_alpha(p.opacity * 0.8);
    c.stroke_circle(x, s - 1.0, 2.0, &Color::hsla(hue1, 0.8, 0.9, 0.6).into());

    let h1 = x - Vec2::splat(s * 0.4);
    c.set_alpha(p.opacity * 0.9);
    let shine = Gradient::new()
        .stop(0.0, Color::WHITE.with_alpha(0.8))
        .stop(0.5, Color::WHITE.with_alpha(0.4))
        .stop(1.0, Color::WHITE.with_alpha(0.0));
    c.fill_circle(h1, s * 0.3, &Paint::radial(h1, 0.0, s * 0.3, shine));

    let h2 = x + Vec2::new(s * 0.2, -s * 0.6);
    c.set_alpha(p.opacity * 0.6);
    c.fill_circle(h2, s * 0.15, &glow(h2, s * 0.15, Color::WHITE.with_alpha(0.7)));

    let reflection = x + Vec2::new(0.0, s * 0.3);
    c.set_alpha(p.opacity * 0.3);
    let sheen = glow(reflection, s * 0.4, Color::hsla(hue2, 0.6, 0.9, 0.3));
    c.fill_circle(reflection, s * 0.4, &sheen);
}

fn firefly(c: &mut Canvas, p: &Particle) {
    let n = p.trail.len() as f32;
    for (i, point) in p.trail.iter().enumerate() {
        let fade = 1.0 - i as f32 / n;
        let alpha = p.opacity * fade * 0.3;
        if alpha > 0.01 {
            c.set_alpha(alpha);
            c.fill_circle(point, p.size * fade * 0.5, &p.color.into());
        }
    }
    if p.opacity <= 0.0 {
        return;
    }

    c.set_alpha(p.opacity);
    let halo = Gradient::new()
        .stop(0.0, p.color)
        .stop(0.3, p.color.with_alpha(0.5))
        .stop(1.0, p.color.with_alpha(0.0));
    c.fill_circle(p.position, p.size * 4.0, &Paint::radial(p.position, 0.0, p.size * 4.0, halo));

    c.set_alpha((p.opacity * 1.2).min(1.0));
    c.fill_circle(p.position, p.size, &p.color.into());

    c.set_alpha((p.opacity * 1.5).min(1.0));
    c.fill_circle(p.position, p.size * 0.3, &Color::WHITE.into());
}

/// Streak from the drop's head back up along its slant. `drift` is the
/// slant, `length` the streak length, `size` the line width.
fn raindrop(c: &mut Canvas, p: &Particle) {
    let tail = p.position + Vec2::new(p.drift * p.length, -p.length);
    c.set_alpha(p.opacity);
    c.stroke_line(p.position, tail, p.size, &Color::hex(SKY_BLUE).into());
    c.set_alpha(p.opacity * 0.8);
    c.stroke_line(p.position, tail, p.size * 0.5, &Color::hex(POWDER_BLUE).into());
}

fn droplet(c: &mut Canvas, p: &Particle) {
    c.set_alpha(p.opacity);
    c.fill_circle(p.position, 1.0, &Color::hex(SKY_BLUE).into());
    c.stroke_line(p.position, p.position - p.velocity, 0.5, &Color::hex(POWDER_BLUE).into());
}

fn splash_ring(c: &mut Canvas, p: &Particle) {
    c.set_alpha(p.opacity * 0.3);
    c.stroke_circle(p.position, p.size * p.age_ratio(), 2.0, &Color::hex(SKY_BLUE).into());
}

fn smoke(c: &mut Canvas, p: &Particle) {
    c.translate(p.position);
    c.rotate(p.rotation);
    c.set_alpha(p.opacity);
    let o = p.opacity;
    let tint = |a: f32| p.color.with_alpha(a);

    let outer =
        Gradient::new().stop(0.0, tint(o * 0.1)).stop(0.4, tint(o * 0.05)).stop(1.0, tint(0.0));
    c.fill_circle(Vec2::ZERO, p.size * 1.5, &Paint::radial(Vec2::ZERO, 0.0, p.size * 1.5, outer));

    let body =
        Gradient::new().stop(0.0, tint(o * 0.4)).stop(0.5, tint(o * 0.2)).stop(1.0, tint(0.0));
    c.fill_circle(Vec2::ZERO, p.size, &Paint::radial(Vec2::ZERO, 0.0, p.size, body));

    let core = Gradient::linear(tint(o * 0.6), tint(o * 0.1));
    c.fill_circle(Vec2::ZERO, p.size * 0.4, &Paint::radial(Vec2::ZERO, 0.0, p.size * 0.4, core));
}

fn mote(c: &mut Canvas, p: &Particle) {
    c.set_alpha(p.opacity);
    c.fill_circle(p.position, p.size, &p.color.into());
    c.set_alpha(p.opacity * 0.3);
    c.fill_circle(p.position, p.size * 2.0, &p.color.into());
}

fn heart(c: &mut Canvas, p: &Particle) {
    c.translate(p.position);
    c.rotate(p.rotation);
    let shape = heart_path(p.size);

    c.scoped(|c| {
        c.translate(Vec2::splat(2.0));
        c.set_alpha(p.opacity * 0.3);
        c.fill_path(&shape, &Color::BLACK.with_alpha(0.4).into());
    });

    c.set_alpha(p.opacity);
    c.fill_path(&shape, &p.color.into());

    c.set_alpha(p.opacity * 0.8);
    c.stroke_path(&shape, 1.5, &Color::WHITE.with_alpha(0.6).into());

    c.set_alpha(p.opacity * 0.7);
    c.fill_path(&heart_path(p.size * 0.6), &Color::WHITE.with_alpha(0.4).into());

    if let Some(sparkle) = p.flair {
        c.set_alpha(p.opacity * 0.8);
        c.fill_circle(sparkle, 1.0, &Color::WHITE.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible(pos: Vec2, size: f32) -> Particle {
        let mut p = Particle::new(pos).with_size(size).with_color(Color::hex(0xFF0000));
        p.opacity = 1.0;
        p
    }

    #[test]
    fn test_invisible_particle_draws_nothing() {
        let mut canvas = Canvas::new(32, 32);
        let mut p = visible(Vec2::splat(16.0), 5.0);
        p.opacity = 0.0;
        Sprite::Mote.draw(&mut canvas, &p, 0.0);
        assert!(canvas.pixels().iter().all(|c| c.a == 0.0));
    }

    #[test]
    fn test_sprites_do_not_leak_state() {
        let mut canvas = Canvas::new(64, 64);
        let p = visible(Vec2::splat(32.0), 10.0);
        for sprite in [Sprite::Heart, Sprite::Smoke, Sprite::Bubble, Sprite::Balloon] {
            sprite.draw(&mut canvas, &p, 3.0);
            assert_eq!(canvas.depth(), 0);
            assert_eq!(canvas.alpha(), 1.0);
            assert_eq!(canvas.transform(), glam::Affine2::IDENTITY);
        }
    }

    #[test]
    fn test_heart_fills_centre() {
        let mut canvas = Canvas::new(64, 64);
        Sprite::Heart.draw(&mut canvas, &visible(Vec2::new(32.0, 24.0), 40.0), 0.0);
        // Heart body spans y in (4s, 14s) below its anchor at scale 2
        assert!(canvas.pixel(32, 40).a > 0.5);
        assert_eq!(canvas.pixel(2, 2).a, 0.0);
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let p = visible(Vec2::splat(20.0), 6.0);
        let mut a = Canvas::new(40, 40);
        let mut b = Canvas::new(40, 40);
        Sprite::Bubble.draw(&mut a, &p, 7.0);
        Sprite::Bubble.draw(&mut b, &p, 7.0);
        assert_eq!(a.pixels(), b.pixels());
    }

    #[test]
    fn test_heart_path_scales() {
        let small = heart_path(20.0);
        let big = heart_path(40.0);
        let lowest = |p: &Path| p.points().iter().map(|v| v.y).fold(f32::MIN, f32::max);
        assert!((lowest(&small) - 14.0).abs() < 1e-3);
        assert!((lowest(&big) - 28.0).abs() < 1e-3);
    }
}
