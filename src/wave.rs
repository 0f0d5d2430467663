//! Damped 2D wave grid with image-displacement rendering.
//!
//! The canvas is divided into square cells of [`CELL_SIZE`] pixels, each
//! holding a height and a vertical velocity. Ripples inject energy into the
//! cells around them; every frame each interior cell accelerates toward the
//! mean of its eight neighbours, loses a little energy to damping, and
//! moves.
//!
//! # Frame Order
//!
//! 1. ripples age (`age += 1`, `radius += 2`) and expire
//! 2. each live ripple adds `sin(age * frequency) * strength * influence`
//!    to the interior cells inside its radius, with linear falloff
//! 3. propagation over all interior cells from the previous frame's heights
//!
//! Border cells never move, so once ripples stop the surface settles back
//! to flat.
//!
//! # Rendering
//!
//! [`WaveGrid::render`] samples the background at a per-pixel offset of
//! `(h * 3, h * 2)`, then lays an overlay lighting pass and a screen-blended
//! caustics pass on top. Without an image, a vertical blue gradient stands
//! in for it.

use crate::canvas::Canvas;
use crate::spawn::SpawnContext;
use crate::visuals::{BlendMode, Color, Gradient, Paint};
use glam::Vec2;
use image::RgbaImage;

/// Cell edge length in pixels.
pub const CELL_SIZE: f32 = 4.0;

/// Light direction for the surface shading pass.
const LIGHT: Vec2 = Vec2::new(-0.6, -0.8);

const FALLBACK_TOP: u32 = 0x1E3A8A;
const FALLBACK_MIDDLE: u32 = 0x3B82F6;
const FALLBACK_BOTTOM: u32 = 0x1E40AF;

/// Tunables for the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveConfig {
    /// Velocity multiplier per frame.
    pub damping: f32,
    /// Pull toward the neighbour mean.
    pub stiffness: f32,
    /// Heights are clamped into `[-limit, limit]`.
    pub height_limit: f32,
    /// Scale applied to ripple impulses.
    pub impulse_scale: f32,
    /// Ripple radius growth in pixels per frame.
    pub ripple_growth: f32,
    /// Ripple lifetime in frames.
    pub ripple_max_age: f32,
    /// Pixel displacement per unit height, per axis.
    pub displacement: Vec2,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            damping: 0.99,
            stiffness: 0.2,
            height_limit: 2.0,
            impulse_scale: 0.1,
            ripple_growth: 2.0,
            ripple_max_age: 120.0,
            displacement: Vec2::new(3.0, 2.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cell {
    pub height: f32,
    pub velocity: f32,
}

/// A transient disturbance feeding energy into the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ripple {
    pub position: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    pub strength: f32,
    pub age: f32,
    pub max_age: f32,
    pub frequency: f32,
}

impl Ripple {
    /// Fraction of strength still applied: `max(0, 1 - age / max_age)`.
    pub fn influence(&self) -> f32 {
        (1.0 - self.age / self.max_age).max(0.0)
    }

    fn is_spent(&self) -> bool {
        self.age > self.max_age || self.radius > self.max_radius
    }
}

/// The simulated water surface.
#[derive(Debug, Clone)]
pub struct WaveGrid {
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
    scratch: Vec<f32>,
    ripples: Vec<Ripple>,
    config: WaveConfig,
}

impl WaveGrid {
    /// Flat grid covering a `size` pixel canvas.
    pub fn new(size: Vec2) -> Self {
        Self::with_config(size, WaveConfig::default())
    }

    pub fn with_config(size: Vec2, config: WaveConfig) -> Self {
        let mut grid = Self {
            cols: 0,
            rows: 0,
            cells: Vec::new(),
            scratch: Vec::new(),
            ripples: Vec::new(),
            config,
        };
        grid.resize(size);
        grid
    }

    /// Re-derive the dimensions for a new canvas size. All heights,
    /// velocities and ripples are discarded.
    pub fn resize(&mut self, size: Vec2) {
        self.cols = (size.x.max(0.0) / CELL_SIZE).ceil() as usize;
        self.rows = (size.y.max(0.0) / CELL_SIZE).ceil() as usize;
        self.cells = vec![Cell::default(); self.cols * self.rows];
        self.scratch = vec![0.0; self.cols * self.rows];
        self.ripples.clear();
    }

    // ========== Queries ==========

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn config(&self) -> &WaveConfig {
        &self.config
    }

    pub fn ripples(&self) -> &[Ripple] {
        &self.ripples
    }

    /// Cell at grid coordinates, `None` outside the grid.
    pub fn cell(&self, col: usize, row: usize) -> Option<Cell> {
        (col < self.cols && row < self.rows).then(|| self.cells[row * self.cols + col])
    }

    /// Height under a canvas pixel, zero outside the grid.
    pub fn height_at(&self, p: Vec2) -> f32 {
        if p.x < 0.0 || p.y < 0.0 {
            return 0.0;
        }
        let col = (p.x / CELL_SIZE) as usize;
        let row = (p.y / CELL_SIZE) as usize;
        self.cell(col, row).map_or(0.0, |c| c.height)
    }

    /// Largest absolute height anywhere on the grid.
    pub fn max_abs_height(&self) -> f32 {
        self.cells.iter().map(|c| c.height.abs()).fold(0.0, f32::max)
    }

    // ========== Impulses ==========

    pub fn add_ripple(&mut self, ripple: Ripple) {
        self.ripples.push(ripple);
    }

    /// Start a ripple at `position` with randomized reach and frequency:
    /// `max_radius` in `[100, 250)`, `frequency` in `[0.05, 0.15)`.
    pub fn ripple(&mut self, position: Vec2, strength: f32, ctx: &mut SpawnContext) {
        let ripple = Ripple {
            position,
            radius: 0.0,
            max_radius: ctx.random() * 150.0 + 100.0,
            strength,
            age: 0.0,
            max_age: self.config.ripple_max_age,
            frequency: ctx.random() * 0.1 + 0.05,
        };
        self.add_ripple(ripple);
    }

    // ========== Simulation ==========

    /// Advance one frame.
    pub fn step(&mut self) {
        let growth = self.config.ripple_growth;
        for ripple in &mut self.ripples {
            ripple.age += 1.0;
            ripple.radius += growth;
        }
        self.ripples.retain(|r| !r.is_spent());

        for i in 0..self.ripples.len() {
            let ripple = self.ripples[i];
            self.apply_impulse(&ripple);
        }
        self.propagate();
    }

    fn apply_impulse(&mut self, ripple: &Ripple) {
        if self.cols < 3 || self.rows < 3 {
            return;
        }
        let wave = (ripple.age * ripple.frequency).sin() * ripple.strength * ripple.influence();
        let amount = wave * self.config.impulse_scale;
        if amount == 0.0 || !amount.is_finite() {
            return;
        }
        let center_col = (ripple.position.x / CELL_SIZE).floor() as i64;
        let center_row = (ripple.position.y / CELL_SIZE).floor() as i64;
        let reach = (ripple.radius / CELL_SIZE).floor() as i64;

        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let col = center_col + dx;
                let row = center_row + dy;
                let (last_col, last_row) = (self.cols as i64 - 1, self.rows as i64 - 1);
                if col < 1 || row < 1 || col >= last_col || row >= last_row {
                    continue;
                }
                let distance = ((dx * dx + dy * dy) as f32).sqrt();
                let falloff = if reach == 0 {
                    1.0
                } else if distance <= reach as f32 {
                    1.0 - distance / reach as f32
                } else {
                    continue;
                };
                self.cells[row as usize * self.cols + col as usize].height += amount * falloff;
            }
        }
    }

    fn propagate(&mut self) {
        let (cols, rows) = (self.cols, self.rows);
        if cols < 3 || rows < 3 {
            return;
        }
        for (dst, cell) in self.scratch.iter_mut().zip(&self.cells) {
            *dst = cell.height;
        }
        let limit = self.config.height_limit;
        for y in 1..rows - 1 {
            for x in 1..cols - 1 {
                let h = |cx: usize, cy: usize| self.scratch[cy * cols + cx];
                let sum = h(x, y - 1)
                    + h(x, y + 1)
                    + h(x - 1, y)
                    + h(x + 1, y)
                    + h(x - 1, y - 1)
                    + h(x + 1, y - 1)
                    + h(x - 1, y + 1)
                    + h(x + 1, y + 1);
                let avg = sum / 8.0;
                let cell = &mut self.cells[y * cols + x];
                cell.velocity += (avg - cell.height) * self.config.stiffness;
                cell.velocity *= self.config.damping;
                cell.height = (cell.height + cell.velocity).clamp(-limit, limit);
            }
        }
    }

    // ========== Rendering ==========

    /// The gradient shown through the water when no image is ready.
    pub fn fallback_gradient() -> Gradient {
        Gradient::new()
            .stop(0.0, Color::hex(FALLBACK_TOP))
            .stop(0.5, Color::hex(FALLBACK_MIDDLE))
            .stop(1.0, Color::hex(FALLBACK_BOTTOM))
    }

    /// Draw the displaced background plus lighting and caustics.
    pub fn render(&self, canvas: &mut Canvas, background: Option<&RgbaImage>) {
        self.render_displacement(canvas, background);
        self.render_lighting(canvas);
        self.render_caustics(canvas);
    }

    fn render_displacement(&self, canvas: &mut Canvas, background: Option<&RgbaImage>) {
        let (width, height) = (canvas.width(), canvas.height());
        if width == 0 || height == 0 {
            return;
        }
        let fallback = Self::fallback_gradient();
        let shift = self.config.displacement;
        let pixels = canvas.pixels_mut();
        for y in 0..height {
            for x in 0..width {
                let p = Vec2::new(x as f32, y as f32);
                let h = self.height_at(p);
                let q = p + shift * h;
                pixels[(y * width + x) as usize] = match background {
                    Some(img) if img.width() > 0 && img.height() > 0 => {
                        let sx = q.x.clamp(0.0, (img.width() - 1) as f32) as u32;
                        let sy = q.y.clamp(0.0, (img.height() - 1) as f32) as u32;
                        let mut c = Color::from_rgba8(img.get_pixel(sx, sy).0);
                        c.a = 1.0;
                        c
                    }
                    _ => {
                        let sy = q.y.clamp(0.0, (height - 1) as f32);
                        fallback.sample(sy / height as f32)
                    }
                };
            }
        }
    }

    fn render_lighting(&self, canvas: &mut Canvas) {
        if self.cols < 3 || self.rows < 3 {
            return;
        }
        canvas.scoped(|c| {
            c.set_blend(BlendMode::Overlay);
            for y in 1..self.rows - 1 {
                for x in 1..self.cols - 1 {
                    let h = self.cells[y * self.cols + x].height;
                    let alpha = h.abs() * 0.3;
                    if alpha <= 0.01 {
                        continue;
                    }
                    let right = self.cells[y * self.cols + x + 1].height;
                    let down = self.cells[(y + 1) * self.cols + x].height;
                    let normal = Vec2::new(h - right, h - down);
                    let length = (normal.length_squared() + 1.0).sqrt();
                    let intensity = ((normal.dot(LIGHT) + 1.0) / length).clamp(0.0, 1.0);
                    let shade = if intensity > 0.5 {
                        Color::WHITE.with_alpha((intensity - 0.5) * 0.4)
                    } else {
                        Color::rgb8a(0, 50, 100, (0.5 - intensity) * 0.3)
                    };
                    c.set_alpha(alpha.min(1.0));
                    let min = Vec2::new(x as f32, y as f32) * CELL_SIZE;
                    c.fill_rect(min, Vec2::splat(CELL_SIZE), &shade.into());
                }
            }
        });
    }

    fn render_caustics(&self, canvas: &mut Canvas) {
        if self.cols < 2 || self.rows < 2 {
            return;
        }
        canvas.scoped(|c| {
            c.set_blend(BlendMode::Screen);
            c.set_alpha(0.1);
            for y in (0..self.rows - 1).step_by(2) {
                for x in (0..self.cols - 1).step_by(2) {
                    let h = self.cells[y * self.cols + x].height;
                    if h.abs() <= 0.1 {
                        continue;
                    }
                    let intensity = h.abs() * 0.5;
                    let size = intensity * 20.0 + 5.0;
                    let center = Vec2::new(x as f32, y as f32) * CELL_SIZE;
                    let light = Color::rgb8a(200, 230, 255, intensity.min(1.0));
                    let ramp = Gradient::linear(light, light.with_alpha(0.0));
                    let paint = Paint::radial(center, 0.0, size, ramp);
                    c.fill_circle(center, size, &paint);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center_ripple(grid: &WaveGrid, strength: f32) -> Ripple {
        Ripple {
            position: Vec2::new(grid.cols() as f32, grid.rows() as f32) * CELL_SIZE * 0.5,
            radius: 0.0,
            max_radius: 200.0,
            strength,
            age: 0.0,
            max_age: 120.0,
            frequency: 0.1,
        }
    }

    #[test]
    fn test_dimensions_round_up() {
        let grid = WaveGrid::new(Vec2::new(801.0, 600.0));
        assert_eq!(grid.cols(), 201);
        assert_eq!(grid.rows(), 150);
    }

    #[test]
    fn test_resize_zeroes_everything() {
        let mut grid = WaveGrid::new(Vec2::new(100.0, 100.0));
        let r = center_ripple(&grid, 0.8);
        grid.add_ripple(r);
        for _ in 0..10 {
            grid.step();
        }
        assert!(grid.max_abs_height() > 0.0);
        grid.resize(Vec2::new(60.0, 40.0));
        assert_eq!((grid.cols(), grid.rows()), (15, 10));
        assert_eq!(grid.max_abs_height(), 0.0);
        assert!(grid.ripples().is_empty());
    }

    #[test]
    fn test_ripple_raises_center_and_spares_border() {
        let mut grid = WaveGrid::new(Vec2::new(100.0, 100.0));
        let r = center_ripple(&grid, 0.8);
        grid.add_ripple(r);
        for _ in 0..8 {
            grid.step();
        }
        assert!(grid.height_at(r.position).abs() > 0.0);
        for col in 0..grid.cols() {
            assert_eq!(grid.cell(col, 0).map(|c| c.height), Some(0.0));
            assert_eq!(grid.cell(col, grid.rows() - 1).map(|c| c.height), Some(0.0));
        }
    }

    #[test]
    fn test_ripple_expires_after_max_age() {
        let mut grid = WaveGrid::new(Vec2::new(200.0, 200.0));
        let mut r = center_ripple(&grid, 0.8);
        r.max_radius = 10_000.0;
        grid.add_ripple(r);
        for _ in 0..120 {
            grid.step();
        }
        assert_eq!(grid.ripples().len(), 1);
        grid.step();
        assert!(grid.ripples().is_empty());
    }

    #[test]
    fn test_heights_are_clamped() {
        let mut grid = WaveGrid::new(Vec2::new(80.0, 80.0));
        for _ in 0..50 {
            let mut r = center_ripple(&grid, 500.0);
            r.frequency = 1.3;
            grid.add_ripple(r);
            grid.step();
        }
        assert!(grid.max_abs_height() <= 2.0);
    }

    #[test]
    fn test_flat_grid_renders_undisplaced_fallback() {
        let grid = WaveGrid::new(Vec2::new(16.0, 16.0));
        let mut canvas = Canvas::new(16, 16);
        grid.render(&mut canvas, None);
        let top = canvas.pixel(3, 0);
        let expected = WaveGrid::fallback_gradient().sample(0.0);
        assert!((top.r - expected.r).abs() < 1e-3 && (top.b - expected.b).abs() < 1e-3);
        assert_eq!(top.a, 1.0);
    }

    #[test]
    fn test_displacement_samples_shifted_pixel() {
        let mut grid = WaveGrid::new(Vec2::new(16.0, 16.0));
        grid.cells[grid.cols + 1].height = 1.0;
        let img = RgbaImage::from_fn(16, 16, |x, _| image::Rgba([(x * 10) as u8, 0, 0, 255]));
        let mut canvas = Canvas::new(16, 16);
        grid.render_displacement(&mut canvas, Some(&img));
        // Pixel (4, 4) lies in cell (1, 1): sampled from x + 3
        assert_eq!(canvas.pixel(4, 4).to_rgba8()[0], 70);
        assert_eq!(canvas.pixel(0, 0).to_rgba8()[0], 0);
    }
}
