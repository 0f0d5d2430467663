//! Software drawing surface.
//!
//! [`Canvas`] is a CPU-side RGBA surface with a small immediate-mode API
//! modelled on a 2D canvas context: a state stack (transform, global alpha,
//! blend mode), shape fills with solid or gradient [`Paint`], strokes, paths
//! and image blits.
//!
//! Shapes are rasterized by scanning their device-space bounding box and
//! mapping every pixel center back into local space through the inverse
//! transform, so rotation and scale come for free. Edges are antialiased
//! over roughly one local unit.
//!
//! # State scoping
//!
//! ```ignore
//! canvas.scoped(|c| {
//!     c.translate(p.position);
//!     c.rotate(p.rotation);
//!     c.set_alpha(p.opacity);
//!     c.fill_circle(Vec2::ZERO, p.size, &Paint::Solid(p.color));
//! });
//! // transform, alpha and blend mode are back to what they were
//! ```

use crate::visuals::{BlendMode, Color, Paint};
use glam::{Affine2, Vec2};
use image::RgbaImage;

#[derive(Debug, Clone, Copy)]
struct DrawState {
    transform: Affine2,
    alpha: f32,
    blend: BlendMode,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine2::IDENTITY,
            alpha: 1.0,
            blend: BlendMode::Alpha,
        }
    }
}

/// A polygonal outline built from lines and Bézier curves.
///
/// Curves are flattened into line segments as they are added.
#[derive(Debug, Clone, Default)]
pub struct Path {
    points: Vec<Vec2>,
}

impl Path {
    const CURVE_STEPS: usize = 16;

    pub fn new() -> Self {
        Self::default()
    }

    /// Start the outline at `p`, discarding anything before it.
    pub fn move_to(mut self, p: Vec2) -> Self {
        self.points.clear();
        self.points.push(p);
        self
    }

    pub fn line_to(mut self, p: Vec2) -> Self {
        self.points.push(p);
        self
    }

    pub fn quad_to(mut self, c: Vec2, p: Vec2) -> Self {
        let start = self.current();
        for i in 1..=Self::CURVE_STEPS {
            let t = i as f32 / Self::CURVE_STEPS as f32;
            let mt = 1.0 - t;
            self.points.push(start * mt * mt + c * 2.0 * mt * t + p * t * t);
        }
        self
    }

    pub fn cubic_to(mut self, c1: Vec2, c2: Vec2, p: Vec2) -> Self {
        let start = self.current();
        for i in 1..=Self::CURVE_STEPS {
            let t = i as f32 / Self::CURVE_STEPS as f32;
            let mt = 1.0 - t;
            let (w0, w1) = (mt * mt * mt, 3.0 * mt * mt * t);
            let (w2, w3) = (3.0 * mt * t * t, t * t * t);
            self.points.push(start * w0 + c1 * w1 + c2 * w2 + p * w3);
        }
        self
    }

    /// Regular polygon with `sides` vertices, first vertex at angle `rotation`.
    pub fn regular(center: Vec2, radius: f32, sides: usize, rotation: f32) -> Self {
        let points = (0..sides.max(3))
            .map(|i| {
                let angle = rotation + i as f32 * std::f32::consts::TAU / sides.max(3) as f32;
                center + Vec2::from_angle(angle) * radius
            })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    fn current(&self) -> Vec2 {
        self.points.last().copied().unwrap_or(Vec2::ZERO)
    }
}

/// CPU RGBA drawing surface. See the [module docs](self).
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl Canvas {
    /// A fully transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::TRANSPARENT; width as usize * height as usize],
            state: DrawState::default(),
            stack: Vec::new(),
        }
    }

    /// Reallocate the backing store. Contents and state are reset.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions as a vector.
    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Clear every pixel to transparent. Draw state is untouched.
    pub fn clear(&mut self) {
        self.pixels.fill(Color::TRANSPARENT);
    }

    // ========== State ==========

    pub fn save(&mut self) {
        self.stack.push(self.state);
    }

    /// Pop the last saved state. Unbalanced restores are ignored.
    pub fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    /// Run `f` between a save and a restore.
    pub fn scoped<R>(&mut self, f: impl FnOnce(&mut Canvas) -> R) -> R {
        self.save();
        let out = f(self);
        self.restore();
        out
    }

    /// Depth of the save stack.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.state.transform = self.state.transform * Affine2::from_translation(offset);
    }

    pub fn rotate(&mut self, angle: f32) {
        self.state.transform = self.state.transform * Affine2::from_angle(angle);
    }

    pub fn scale(&mut self, factor: Vec2) {
        self.state.transform = self.state.transform * Affine2::from_scale(factor);
    }

    /// Current local-to-device transform.
    pub fn transform(&self) -> Affine2 {
        self.state.transform
    }

    /// Set the global alpha applied to everything painted afterwards.
    pub fn set_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn alpha(&self) -> f32 {
        self.state.alpha
    }

    pub fn set_blend(&mut self, blend: BlendMode) {
        self.state.blend = blend;
    }

    pub fn blend(&self) -> BlendMode {
        self.state.blend
    }

    // ========== Pixel access ==========

    /// Pixel at `(x, y)`, transparent outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize]
        } else {
            Color::TRANSPARENT
        }
    }

    /// Overwrite a pixel, ignoring state. Out-of-range writes are dropped.
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = color;
        }
    }

    /// Row-major pixel storage.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Composite a same-sized `layer` onto this surface with `mode`,
    /// ignoring draw state. Mismatched sizes use the overlapping region.
    pub fn composite(&mut self, layer: &Canvas, mode: BlendMode) {
        let w = self.width.min(layer.width) as usize;
        let h = self.height.min(layer.height) as usize;
        for y in 0..h {
            let dst_row = y * self.width as usize;
            let src_row = y * layer.width as usize;
            for x in 0..w {
                let dst = &mut self.pixels[dst_row + x];
                *dst = mode.composite(*dst, layer.pixels[src_row + x]);
            }
        }
    }

    /// Export as RGBA8 texels, row-major.
    pub fn to_rgba8(&self) -> Vec<[u8; 4]> {
        self.pixels.iter().map(|c| c.to_rgba8()).collect()
    }

    // ========== Fills ==========

    /// Paint the whole surface, ignoring the transform.
    pub fn fill_all(&mut self, paint: &Paint) {
        let saved = self.state.transform;
        self.state.transform = Affine2::IDENTITY;
        self.fill_rect(Vec2::ZERO, self.size(), paint);
        self.state.transform = saved;
    }

    pub fn fill_rect(&mut self, min: Vec2, size: Vec2, paint: &Paint) {
        let max = min + size;
        let coverage = |p: Vec2| {
            let inside_x = (p.x - min.x + 0.5).min(max.x - p.x + 0.5);
            let inside_y = (p.y - min.y + 0.5).min(max.y - p.y + 0.5);
            inside_x.min(inside_y).clamp(0.0, 1.0)
        };
        self.raster(min, max, coverage, paint);
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        if radius <= 0.0 {
            return;
        }
        let r = Vec2::splat(radius);
        let coverage = |p: Vec2| (radius - p.distance(center) + 0.5).clamp(0.0, 1.0);
        self.raster(center - r, center + r, coverage, paint);
    }

    /// Circle outline of the given line width.
    pub fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, paint: &Paint) {
        if radius <= 0.0 || width <= 0.0 {
            return;
        }
        let half = width * 0.5;
        let r = Vec2::splat(radius + half);
        let coverage = |p: Vec2| (half - (p.distance(center) - radius).abs() + 0.5).clamp(0.0, 1.0);
        self.raster(center - r, center + r, coverage, paint);
    }

    /// Line segment with round caps.
    pub fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, paint: &Paint) {
        self.stroke_polyline(&[from, to], width, paint);
    }

    /// Connected segments with round caps and joins.
    pub fn stroke_polyline(&mut self, points: &[Vec2], width: f32, paint: &Paint) {
        if points.len() < 2 || width <= 0.0 {
            return;
        }
        let half = width * 0.5;
        let (lo, hi) = bounds(points);
        let coverage = |p: Vec2| {
            let d = points
                .windows(2)
                .map(|seg| segment_distance(p, seg[0], seg[1]))
                .fold(f32::INFINITY, f32::min);
            (half - d + 0.5).clamp(0.0, 1.0)
        };
        self.raster(lo - Vec2::splat(half), hi + Vec2::splat(half), coverage, paint);
    }

    /// Filled polygon (nonzero winding).
    pub fn fill_polygon(&mut self, points: &[Vec2], paint: &Paint) {
        if points.len() < 3 {
            return;
        }
        let (lo, hi) = bounds(points);
        let coverage = |p: Vec2| if winding(points, p) != 0 { 1.0 } else { 0.0 };
        self.raster(lo, hi, coverage, paint);
    }

    /// Closed polygon outline.
    pub fn stroke_polygon(&mut self, points: &[Vec2], width: f32, paint: &Paint) {
        if let Some(&first) = points.first() {
            let mut closed = points.to_vec();
            closed.push(first);
            self.stroke_polyline(&closed, width, paint);
        }
    }

    pub fn fill_path(&mut self, path: &Path, paint: &Paint) {
        self.fill_polygon(path.points(), paint);
    }

    pub fn stroke_path(&mut self, path: &Path, width: f32, paint: &Paint) {
        self.stroke_polygon(path.points(), width, paint);
    }

    /// Draw the `src_min..src_min + src_size` region of `image` into the
    /// local rectangle `dst_min..dst_min + dst_size`, nearest-neighbour.
    ///
    /// Source coordinates are clamped to the image, so regions reaching
    /// past its edges repeat the border pixels instead of failing.
    pub fn draw_image(
        &mut self,
        image: &RgbaImage,
        src_min: Vec2,
        src_size: Vec2,
        dst_min: Vec2,
        dst_size: Vec2,
    ) {
        self.draw_image_filtered(image, src_min, src_size, dst_min, dst_size, |c| c);
    }

    /// [`draw_image`](Self::draw_image) with every sampled texel passed
    /// through `filter` first (channel isolation, tinting).
    pub fn draw_image_filtered(
        &mut self,
        image: &RgbaImage,
        src_min: Vec2,
        src_size: Vec2,
        dst_min: Vec2,
        dst_size: Vec2,
        filter: impl Fn(Color) -> Color,
    ) {
        if image.width() == 0 || image.height() == 0 || dst_size.x <= 0.0 || dst_size.y <= 0.0 {
            return;
        }
        let dst_max = dst_min + dst_size;
        let max_x = (image.width() - 1) as f32;
        let max_y = (image.height() - 1) as f32;
        let coverage = |p: Vec2| {
            let inside = p.cmpge(dst_min).all() && p.cmplt(dst_max).all();
            if inside {
                1.0
            } else {
                0.0
            }
        };
        let texel = |p: Vec2| {
            let uv = (p - dst_min) / dst_size;
            let sx = (src_min.x + uv.x * src_size.x).clamp(0.0, max_x);
            let sy = (src_min.y + uv.y * src_size.y).clamp(0.0, max_y);
            filter(Color::from_rgba8(image.get_pixel(sx as u32, sy as u32).0))
        };
        self.raster_with(dst_min, dst_max, coverage, texel);
    }

    // ========== Rasterizer ==========

    fn raster(&mut self, lo: Vec2, hi: Vec2, coverage: impl Fn(Vec2) -> f32, paint: &Paint) {
        self.raster_with(lo, hi, coverage, |p| paint.color_at(p));
    }

    /// Scan the device-space box covering the local box `lo..hi` and
    /// composite `color(p)` weighted by `coverage(p)` at every pixel.
    fn raster_with(
        &mut self,
        lo: Vec2,
        hi: Vec2,
        coverage: impl Fn(Vec2) -> f32,
        color: impl Fn(Vec2) -> Color,
    ) {
        if self.width == 0 || self.height == 0 || self.state.alpha <= 0.0 {
            return;
        }
        let xf = self.state.transform;
        let corners = [
            xf.transform_point2(lo),
            xf.transform_point2(Vec2::new(hi.x, lo.y)),
            xf.transform_point2(hi),
            xf.transform_point2(Vec2::new(lo.x, hi.y)),
        ];
        let (dev_lo, dev_hi) = bounds(&corners);
        if !dev_lo.is_finite() || !dev_hi.is_finite() {
            return;
        }
        let x0 = (dev_lo.x - 1.0).floor().max(0.0) as u32;
        let y0 = (dev_lo.y - 1.0).floor().max(0.0) as u32;
        let x1 = ((dev_hi.x + 1.0).ceil().max(0.0) as u32).min(self.width);
        let y1 = ((dev_hi.y + 1.0).ceil().max(0.0) as u32).min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let inverse = xf.inverse();
        let alpha = self.state.alpha;
        let blend = self.state.blend;
        for y in y0..y1 {
            let row = (y * self.width) as usize;
            for x in x0..x1 {
                let local = inverse.transform_point2(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                let cov = coverage(local);
                if cov <= 0.0 {
                    continue;
                }
                let src = color(local);
                let src = src.with_alpha(src.a * cov * alpha);
                let idx = row + x as usize;
                self.pixels[idx] = blend.composite(self.pixels[idx], src);
            }
        }
    }
}

fn bounds(points: &[Vec2]) -> (Vec2, Vec2) {
    points.iter().fold(
        (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
        |(lo, hi), p| (lo.min(*p), hi.max(*p)),
    )
}

fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq > f32::EPSILON { ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0) } else { 0.0 };
    p.distance(a + ab * t)
}

/// Nonzero winding number of `poly` around `p`.
fn winding(poly: &[Vec2], p: Vec2) -> i32 {
    let mut wn = 0;
    for i in 0..poly.len() {
        let a = poly[i];
        let b = poly[(i + 1) % poly.len()];
        let cross = (b - a).perp_dot(p - a);
        if a.y <= p.y {
            if b.y > p.y && cross > 0.0 {
                wn += 1;
            }
        } else if b.y <= p.y && cross < 0.0 {
            wn -= 1;
        }
    }
    wn
}
