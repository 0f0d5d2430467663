//! Colors, palettes, gradients and blend modes.
//!
//! Everything here is plain data: the [`Canvas`](crate::canvas::Canvas)
//! consumes it when painting.
//!
//! # Usage
//!
//! ```ignore
//! let glow = Gradient::new()
//!     .stop(0.0, Color::hex(0xFFD700))
//!     .stop(0.3, Color::hex(0xFFD700).with_alpha(0.5))
//!     .stop(1.0, Color::TRANSPARENT);
//!
//! canvas.scoped(|c| {
//!     c.set_blend(BlendMode::Screen);
//!     c.fill_circle(center, 12.0, &Paint::radial(center, 0.0, 12.0, glow));
//! });
//! ```

use glam::Vec2;

/// Straight (non-premultiplied) RGBA color, channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    /// Color from float channels.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from 8-bit channels.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
    }

    /// Color from 8-bit channels plus a float alpha, like CSS `rgba()`.
    pub fn rgb8a(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self::rgba(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a)
    }

    /// Opaque color from a `0xRRGGBB` literal.
    pub fn hex(rgb: u32) -> Self {
        Self::rgb8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Color from CSS-style HSL (hue in degrees, saturation and lightness in `0..=1`).
    pub fn hsla(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = lightness - c / 2.0;
        Self::rgba(r + m, g + m, b + m, alpha)
    }

    /// Same color with a different alpha.
    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Same color with alpha multiplied by `factor`.
    #[inline]
    pub fn fade(self, factor: f32) -> Self {
        Self { a: self.a * factor, ..self }
    }

    /// Component-wise linear interpolation.
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::rgba(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// 8-bit RGBA, clamping every channel.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Inverse of [`Color::to_rgba8`].
    pub fn from_rgba8(px: [u8; 4]) -> Self {
        Self::rgba(
            px[0] as f32 / 255.0,
            px[1] as f32 / 255.0,
            px[2] as f32 / 255.0,
            px[3] as f32 / 255.0,
        )
    }
}

/// Categorical color sets that effects draw particle colors from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    /// Pastel party balloons.
    Balloons,
    /// Warm yellow-greens.
    Fireflies,
    /// Earthy browns and beiges.
    Dust,
    /// Reds, pinks and a few bright accents.
    Hearts,
    /// Near-white star tints.
    Stars,
    /// Pale blues and lavender for bolts.
    Lightning,
    /// Light greys for smoke.
    Smoke,
}

const BALLOONS: [u32; 10] = [
    0xFF6B6B,
    0x4ECDC4,
    0x45B7D1,
    0x96CEB4,
    0xFFEAA7,
    0xDDA0DD,
    0x98D8C8,
    0xF7DC6F,
    0xBB8FCE,
    0x85C1E9,
];

const FIREFLIES: [u32; 10] = [
    0xFFD700,
    0xFFF700,
    0xFFFF00,
    0x90EE90,
    0x98FB98,
    0xF0E68C,
    0xFFFFE0,
    0xFFFACD,
    0xE6E6FA,
    0xF5F5DC,
];

const DUST: [u32; 8] = [
    0x8B7D6B,
    0xA08E7A,
    0xCDC0B0,
    0xDACEBE,
    0xF5EBDC,
    0xDEB887,
    0xBC8F8F,
    0xD2B48C,
];

const HEARTS: [u32; 9] = [
    0x8B0000,
    0xFF1493,
    0xFF69B4,
    0xFF0000,
    0xFF4500,
    0xFFD700,
    0x32CD32,
    0x00BFFF,
    0x8A2BE2,
];

const STARS: [u32; 10] = [
    0xFFFFFF,
    0xFFF8DC,
    0xF0F8FF,
    0xE6E6FA,
    0xFFFACD,
    0xFFE4E1,
    0xF5F5DC,
    0xFFEFD5,
    0xFDF5E6,
    0xFAF0E6,
];

const LIGHTNING: [u32; 5] = [
    0xFFFFFF,
    0xE6E6FA,
    0xB0C4DE,
    0x87CEEB,
    0xADD8E6,
];

const SMOKE: [u32; 6] = [
    0xC8C8C8,
    0xB4B4B4,
    0xDCDCDC,
    0xA0A0A0,
    0xF0F0F0,
    0xBEBEBE,
];

impl Palette {
    /// The colors in this palette as `0xRRGGBB` literals.
    pub fn hexes(&self) -> &'static [u32] {
        match self {
            Palette::Balloons => &BALLOONS,
            Palette::Fireflies => &FIREFLIES,
            Palette::Dust => &DUST,
            Palette::Hearts => &HEARTS,
            Palette::Stars => &STARS,
            Palette::Lightning => &LIGHTNING,
            Palette::Smoke => &SMOKE,
        }
    }

    /// Number of colors in the palette.
    pub fn len(&self) -> usize {
        self.hexes().len()
    }

    /// Color at `index`, wrapping around.
    pub fn color(&self, index: usize) -> Color {
        let hexes = self.hexes();
        Color::hex(hexes[index % hexes.len()])
    }
}

/// How a painted pixel combines with what is already on the canvas.
///
/// The separable modes follow the W3C compositing model: the blend
/// function mixes the colors, then the result is composited source-over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard source-over alpha blending (default).
    #[default]
    Alpha,
    /// Premultiplied sum, clamped. Overlaps get brighter ("lighter").
    Additive,
    /// `1 - (1 - a)(1 - b)`. Brightens without blowing out.
    Screen,
    /// `a * b`. Darkens; used for vignettes and tints.
    Multiply,
    /// Multiply in the darks, screen in the lights.
    Overlay,
    /// Replace the destination outright.
    Copy,
}

impl BlendMode {
    /// Composite `src` (already carrying its coverage in alpha) over `dst`.
    pub fn composite(self, dst: Color, src: Color) -> Color {
        let sa = src.a.clamp(0.0, 1.0);
        if sa <= 0.0 && self != BlendMode::Copy {
            return dst;
        }
        let da = dst.a.clamp(0.0, 1.0);

        match self {
            BlendMode::Copy => src,
            BlendMode::Additive => {
                let out_a = (sa + da).min(1.0);
                if out_a <= 0.0 {
                    return Color::TRANSPARENT;
                }
                let mix = |s: f32, d: f32| ((s * sa + d * da).min(1.0) / out_a).min(1.0);
                Color::rgba(mix(src.r, dst.r), mix(src.g, dst.g), mix(src.b, dst.b), out_a)
            }
            _ => {
                let out_a = sa + da * (1.0 - sa);
                if out_a <= 0.0 {
                    return Color::TRANSPARENT;
                }
                let mix = |s: f32, d: f32| {
                    let blended = self.blend_channel(d, s);
                    let premul = s * sa * (1.0 - da) + sa * da * blended + d * da * (1.0 - sa);
                    (premul / out_a).clamp(0.0, 1.0)
                };
                Color::rgba(mix(src.r, dst.r), mix(src.g, dst.g), mix(src.b, dst.b), out_a)
            }
        }
    }

    /// Separable blend function `B(backdrop, source)`.
    fn blend_channel(self, cb: f32, cs: f32) -> f32 {
        match self {
            BlendMode::Multiply => cb * cs,
            BlendMode::Screen => cb + cs - cb * cs,
            BlendMode::Overlay => {
                if cb <= 0.5 {
                    2.0 * cb * cs
                } else {
                    let cs2 = 2.0 * cb - 1.0;
                    cs2 + cs - cs2 * cs
                }
            }
            BlendMode::Alpha | BlendMode::Additive | BlendMode::Copy => cs,
        }
    }
}

/// Piecewise-linear color ramp, like a canvas gradient's color stops.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Gradient {
    stops: Vec<(f32, Color)>,
}

impl Gradient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two-stop ramp.
    pub fn linear(from: Color, to: Color) -> Self {
        Self::new().stop(0.0, from).stop(1.0, to)
    }

    /// Add a color stop at `offset` (clamped to `0..=1`). Stops may be added in any order.
    pub fn stop(mut self, offset: f32, color: Color) -> Self {
        let offset = offset.clamp(0.0, 1.0);
        let at = self.stops.partition_point(|(o, _)| *o <= offset);
        self.stops.insert(at, (offset, color));
        self
    }

    /// Color at `t`; values outside the stop range take the end colors.
    pub fn sample(&self, t: f32) -> Color {
        let Some(&(first_offset, first)) = self.stops.first() else {
            return Color::TRANSPARENT;
        };
        if t <= first_offset {
            return first;
        }
        for pair in self.stops.windows(2) {
            let (o0, c0) = pair[0];
            let (o1, c1) = pair[1];
            if t <= o1 {
                let span = o1 - o0;
                let local = if span > f32::EPSILON { (t - o0) / span } else { 1.0 };
                return c0.lerp(c1, local);
            }
        }
        self.stops.last().map(|&(_, c)| c).unwrap_or(first)
    }
}

/// What a shape is filled with. Coordinates are in the canvas' local space.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Ramp along the segment `start → end`.
    Linear { start: Vec2, end: Vec2, gradient: Gradient },
    /// Concentric ramp from radius `inner` to radius `outer` around `center`.
    Radial { center: Vec2, inner: f32, outer: f32, gradient: Gradient },
}

impl Paint {
    pub fn radial(center: Vec2, inner: f32, outer: f32, gradient: Gradient) -> Self {
        Paint::Radial { center, inner, outer, gradient }
    }

    pub fn linear(start: Vec2, end: Vec2, gradient: Gradient) -> Self {
        Paint::Linear { start, end, gradient }
    }

    /// Paint color at a local-space point.
    pub fn color_at(&self, p: Vec2) -> Color {
        match self {
            Paint::Solid(c) => *c,
            Paint::Linear { start, end, gradient } => {
                let axis = *end - *start;
                let len_sq = axis.length_squared();
                let t = if len_sq > f32::EPSILON { (p - *start).dot(axis) / len_sq } else { 0.0 };
                gradient.sample(t)
            }
            Paint::Radial { center, inner, outer, gradient } => {
                let span = outer - inner;
                let d = p.distance(*center);
                let t = if span > f32::EPSILON { (d - inner) / span } else { 1.0 };
                gradient.sample(t)
            }
        }
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Color, b: Color) -> bool {
        let d = [a.r - b.r, a.g - b.g, a.b - b.b, a.a - b.a];
        d.iter().all(|v| v.abs() < 1e-3)
    }

    #[test]
    fn test_hex_and_rgba8_roundtrip() {
        let c = Color::hex(0xFF6B6B);
        assert_eq!(c.to_rgba8(), [0xFF, 0x6B, 0x6B, 0xFF]);
    }

    #[test]
    fn test_hsla_primaries() {
        assert!(close(Color::hsla(0.0, 1.0, 0.5, 1.0), Color::rgba(1.0, 0.0, 0.0, 1.0)));
        assert!(close(Color::hsla(120.0, 1.0, 0.5, 1.0), Color::rgba(0.0, 1.0, 0.0, 1.0)));
        assert!(close(Color::hsla(240.0, 1.0, 0.5, 1.0), Color::rgba(0.0, 0.0, 1.0, 1.0)));
        assert!(close(Color::hsla(600.0, 1.0, 0.5, 1.0), Color::rgba(0.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn test_source_over_opaque_replaces() {
        let out = BlendMode::Alpha.composite(Color::WHITE, Color::hex(0x336699));
        assert!(close(out, Color::hex(0x336699)));
    }

    #[test]
    fn test_transparent_source_is_noop() {
        let dst = Color::hex(0x123456);
        let modes = [
            BlendMode::Alpha,
            BlendMode::Additive,
            BlendMode::Screen,
            BlendMode::Multiply,
            BlendMode::Overlay,
        ];
        for mode in modes {
            assert_eq!(mode.composite(dst, Color::TRANSPARENT), dst);
        }
    }

    #[test]
    fn test_multiply_and_screen_on_opaque_backdrop() {
        let dst = Color::rgba(0.5, 0.5, 0.5, 1.0);
        let src = Color::rgba(0.5, 1.0, 0.0, 1.0);
        let m = BlendMode::Multiply.composite(dst, src);
        assert!(close(m, Color::rgba(0.25, 0.5, 0.0, 1.0)));
        let s = BlendMode::Screen.composite(dst, src);
        assert!(close(s, Color::rgba(0.75, 1.0, 0.5, 1.0)));
    }

    #[test]
    fn test_additive_saturates() {
        let dst = Color::rgba(0.8, 0.8, 0.8, 1.0);
        let out = BlendMode::Additive.composite(dst, Color::rgba(0.5, 0.1, 0.0, 1.0));
        assert!(close(out, Color::rgba(1.0, 0.9, 0.8, 1.0)));
    }

    #[test]
    fn test_gradient_sampling() {
        let g = Gradient::new()
            .stop(1.0, Color::BLACK)
            .stop(0.0, Color::WHITE);
        assert!(close(g.sample(-1.0), Color::WHITE));
        assert!(close(g.sample(0.5), Color::rgba(0.5, 0.5, 0.5, 1.0)));
        assert!(close(g.sample(2.0), Color::BLACK));
        assert_eq!(Gradient::new().sample(0.3), Color::TRANSPARENT);
    }

    #[test]
    fn test_radial_paint() {
        let fade = Gradient::linear(Color::WHITE, Color::TRANSPARENT);
        let paint = Paint::radial(Vec2::ZERO, 0.0, 10.0, fade);
        assert!(close(paint.color_at(Vec2::ZERO), Color::WHITE));
        assert!((paint.color_at(Vec2::new(5.0, 0.0)).a - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_palettes_not_empty() {
        let palettes = [
            Palette::Balloons,
            Palette::Fireflies,
            Palette::Dust,
            Palette::Hearts,
            Palette::Stars,
            Palette::Lightning,
            Palette::Smoke,
        ];
        for p in palettes {
            assert!(p.len() > 0);
            assert_eq!(p.color(p.len()), p.color(0));
        }
    }
}
