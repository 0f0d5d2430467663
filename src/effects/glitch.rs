//! Digital glitching of the background image.
//!
//! Every artefact is decided in `update` and stored, so `render` draws the
//! same frame no matter how often it is called:
//!
//! | Artefact | Chance per frame | Lifetime |
//! |----------|------------------|----------|
//! | base image dropout | 10% | one frame |
//! | colour strip | 5% | 10–40 frames |
//! | noise burst (20 rects) | 2% | 20 frames |
//! | major glitch (5 strips, noise, RGB split) | 0.1% | one frame |
//! | scanlines | 30% | one frame |
//! | flash | 0.5% | one frame |
//! | corruption bars | 2% | one frame |
//!
//! Nothing is drawn until the background image has loaded.

use super::{Effect, EffectId, Frame};
use crate::canvas::Canvas;
use crate::spawn::SpawnContext;
use crate::visuals::{BlendMode, Color, Paint};
use glam::Vec2;
use image::RgbaImage;

pub const BASE_CHANCE: f32 = 0.9;
pub const STRIP_CHANCE: f32 = 0.05;
pub const NOISE_CHANCE: f32 = 0.02;
pub const MAJOR_CHANCE: f32 = 0.001;
pub const SCANLINE_CHANCE: f32 = 0.3;
pub const FLASH_CHANCE: f32 = 0.005;
pub const BAR_CHANCE: f32 = 0.02;
pub const NOISE_BURST: usize = 20;
pub const NOISE_LIFE: f32 = 20.0;
const MAJOR_STRIPS: usize = 5;
const SPLIT_OFFSET: f32 = 3.0;

/// One colour channel of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Keep only this channel, as a multiply by pure red, green or blue would.
    pub fn isolate(self, c: Color) -> Color {
        match self {
            Channel::Red => Color::rgba(c.r, 0.0, 0.0, c.a),
            Channel::Green => Color::rgba(0.0, c.g, 0.0, c.a),
            Channel::Blue => Color::rgba(0.0, 0.0, c.b, c.a),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strip {
    pub y: f32,
    pub height: f32,
    pub offset: Vec2,
    pub opacity: f32,
    pub channel: Channel,
    pub life: f32,
    pub max_life: f32,
}

impl Strip {
    pub fn alpha(&self) -> f32 {
        (self.opacity * (1.0 - self.life / self.max_life)).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Noise {
    pub position: Vec2,
    pub size: Vec2,
    pub opacity: f32,
    pub life: f32,
    /// Re-rolled every frame.
    pub color: Color,
}

/// One-frame decisions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Artefacts {
    pub base: bool,
    pub major: bool,
    pub scanlines: bool,
    pub flash: Option<Color>,
    pub bars: Vec<f32>,
}

const NOISE_COLORS: [u32; 5] = [0xFF0000, 0x00FF00, 0x0000FF, 0xFFFFFF, 0x000000];

#[derive(Debug, Clone, PartialEq)]
pub struct GlitchConfig {
    pub base_chance: f32,
    pub strip_chance: f32,
    pub noise_chance: f32,
    pub major_chance: f32,
    pub scanline_chance: f32,
    pub flash_chance: f32,
    pub bar_chance: f32,
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            base_chance: BASE_CHANCE,
            strip_chance: STRIP_CHANCE,
            noise_chance: NOISE_CHANCE,
            major_chance: MAJOR_CHANCE,
            scanline_chance: SCANLINE_CHANCE,
            flash_chance: FLASH_CHANCE,
            bar_chance: BAR_CHANCE,
        }
    }
}

impl GlitchConfig {
    /// Every artefact fires every frame.
    pub fn chaotic() -> Self {
        Self {
            base_chance: 1.0,
            strip_chance: 1.0,
            noise_chance: 1.0,
            major_chance: 1.0,
            scanline_chance: 1.0,
            flash_chance: 1.0,
            bar_chance: 1.0,
        }
    }

    /// Nothing but the base image.
    pub fn calm() -> Self {
        Self {
            base_chance: 1.0,
            strip_chance: 0.0,
            noise_chance: 0.0,
            major_chance: 0.0,
            scanline_chance: 0.0,
            flash_chance: 0.0,
            bar_chance: 0.0,
        }
    }
}

pub struct Glitch {
    config: GlitchConfig,
    strips: Vec<Strip>,
    noise: Vec<Noise>,
    artefacts: Artefacts,
}

impl Glitch {
    pub fn new(config: GlitchConfig, _ctx: &mut SpawnContext) -> Self {
        Self { config, strips: Vec::new(), noise: Vec::new(), artefacts: Artefacts::default() }
    }

    pub fn strips(&self) -> &[Strip] {
        &self.strips
    }

    pub fn noise(&self) -> &[Noise] {
        &self.noise
    }

    pub fn artefacts(&self) -> &Artefacts {
        &self.artefacts
    }

    fn add_strip(&mut self, ctx: &mut SpawnContext) {
        let channel = *ctx.choose(&Channel::ALL).unwrap_or(&Channel::Red);
        self.strips.push(Strip {
            y: ctx.random() * ctx.bounds.y,
            height: ctx.random_range(5.0, 25.0),
            offset: Vec2::new(ctx.signed(10.0), ctx.signed(5.0)),
            opacity: ctx.random_range(0.2, 1.0),
            channel,
            life: 0.0,
            max_life: ctx.random_range(10.0, 40.0),
        });
    }

    fn add_noise_burst(&mut self, ctx: &mut SpawnContext) {
        for _ in 0..NOISE_BURST {
            self.noise.push(Noise {
                position: ctx.random_point(),
                size: Vec2::new(ctx.random_range(1.0, 5.0), ctx.random_range(1.0, 5.0)),
                opacity: ctx.random_range(0.2, 1.0),
                life: 0.0,
                color: Color::TRANSPARENT,
            });
        }
    }

    fn draw_strip(c: &mut Canvas, image: &RgbaImage, strip: &Strip, scale: Vec2) {
        let width = c.size().x;
        let channel = strip.channel;
        c.scoped(|c| {
            c.set_blend(BlendMode::Screen);
            c.set_alpha(strip.alpha());
            c.draw_image_filtered(
                image,
                Vec2::new(0.0, strip.y) * scale,
                Vec2::new(width, strip.height) * scale,
                Vec2::new(strip.offset.x, strip.y + strip.offset.y),
                Vec2::new(width, strip.height),
                |px| channel.isolate(px),
            );
        });
    }
}

impl Effect for Glitch {
    fn id(&self) -> EffectId {
        EffectId::Glitch
    }

    fn update(&mut self, frame: &mut Frame<'_>) {
        let ctx = &mut *frame.ctx;
        let cfg = self.config.clone();

        let mut artefacts = Artefacts { base: ctx.chance(cfg.base_chance), ..Artefacts::default() };
        if ctx.chance(cfg.strip_chance) {
            self.add_strip(ctx);
        }
        if ctx.chance(cfg.noise_chance) {
            self.add_noise_burst(ctx);
        }
        artefacts.major = ctx.chance(cfg.major_chance);
        if artefacts.major {
            for _ in 0..MAJOR_STRIPS {
                self.add_strip(ctx);
            }
            self.add_noise_burst(ctx);
        }

        for strip in &mut self.strips {
            strip.life += 1.0;
        }
        for n in &mut self.noise {
            n.life += 1.0;
            n.color = Color::hex(*ctx.choose(&NOISE_COLORS).unwrap_or(&0));
        }

        artefacts.scanlines = ctx.chance(cfg.scanline_chance);
        if ctx.chance(cfg.flash_chance) {
            artefacts.flash = Some(if ctx.chance(0.5) { Color::WHITE } else { Color::BLACK });
        }
        if ctx.chance(cfg.bar_chance) {
            let count = ctx.random_int(1, 4);
            artefacts.bars = (0..count).map(|_| ctx.random() * ctx.bounds.y).collect();
        }
        self.artefacts = artefacts;

        // strips and noise drawn on their final frame before removal
        self.strips.retain(|s| s.life <= s.max_life);
        self.noise.retain(|n| n.life <= NOISE_LIFE);
    }

    fn render(&self, canvas: &mut Canvas, background: Option<&RgbaImage>) {
        let Some(image) = background else {
            return;
        };
        let size = canvas.size();
        let scale = Vec2::new(image.width() as f32, image.height() as f32) / size.max(Vec2::ONE);
        let full = Vec2::new(image.width() as f32, image.height() as f32);
        let a = &self.artefacts;

        if a.base {
            canvas.draw_image(image, Vec2::ZERO, full, Vec2::ZERO, size);
        }
        for strip in &self.strips {
            Self::draw_strip(canvas, image, strip, scale);
        }
        for n in &self.noise {
            let alpha = n.opacity * (1.0 - n.life / NOISE_LIFE).max(0.0);
            canvas.scoped(|c| {
                c.set_alpha(alpha);
                c.fill_rect(n.position, n.size, &n.color.into());
            });
        }
        if a.scanlines {
            canvas.scoped(|c| {
                c.set_alpha(0.1);
                let mut y = 0.0;
                while y < size.y {
                    c.fill_rect(Vec2::new(0.0, y), Vec2::new(size.x, 2.0), &Color::BLACK.into());
                    y += 4.0;
                }
            });
        }
        if let Some(color) = a.flash {
            canvas.scoped(|c| {
                c.set_alpha(0.3);
                c.fill_all(&color.into());
            });
        }
        if a.major {
            canvas.scoped(|c| {
                c.set_blend(BlendMode::Screen);
                c.set_alpha(0.3);
                let shift = Vec2::new(SPLIT_OFFSET, 0.0);
                c.draw_image_filtered(image, Vec2::ZERO, full, -shift, size, |px| {
                    Channel::Red.isolate(px)
                });
                c.draw_image_filtered(image, Vec2::ZERO, full, shift, size, |px| {
                    Channel::Blue.isolate(px)
                });
            });
        }
        for &y in &a.bars {
            canvas.scoped(|c| {
                c.set_alpha(0.6);
                let green: Paint = Color::hex(0x00FF00).into();
                c.fill_rect(Vec2::new(0.0, y), Vec2::new(size.x, 2.0), &green);
            });
        }
    }

    fn population(&self) -> usize {
        self.strips.len() + self.noise.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing;
    use image::Rgba;

    fn image() -> RgbaImage {
        RgbaImage::from_pixel(32, 24, Rgba([200, 100, 50, 255]))
    }

    #[test]
    fn test_nothing_without_image() {
        let mut ctx = testing::ctx();
        let mut glitch = Glitch::new(GlitchConfig::chaotic(), &mut ctx);
        testing::run(&mut glitch, &mut ctx, 3);
        let mut canvas = Canvas::new(320, 240);
        glitch.render(&mut canvas, None);
        assert!(testing::painted(&canvas) == 0);
    }

    #[test]
    fn test_calm_frame_is_the_image() {
        let mut ctx = testing::ctx();
        let mut glitch = Glitch::new(GlitchConfig::calm(), &mut ctx);
        testing::run(&mut glitch, &mut ctx, 5);
        assert_eq!(glitch.population(), 0);
        let mut canvas = Canvas::new(320, 240);
        glitch.render(&mut canvas, Some(&image()));
        assert_eq!(canvas.pixel(100, 100).to_rgba8(), [200, 100, 50, 255]);
    }

    #[test]
    fn test_artefacts_are_stored_and_expire() {
        let mut ctx = testing::ctx();
        let mut glitch = Glitch::new(GlitchConfig::chaotic(), &mut ctx);
        testing::run(&mut glitch, &mut ctx, 1);
        assert_eq!(glitch.strips().len(), 1 + MAJOR_STRIPS);
        assert_eq!(glitch.noise().len(), 2 * NOISE_BURST);
        let a = glitch.artefacts();
        assert!(a.base && a.major && a.scanlines && a.flash.is_some());
        assert!((1..=3).contains(&a.bars.len()));

        let mut quiet = Glitch::new(GlitchConfig::chaotic(), &mut ctx);
        testing::run(&mut quiet, &mut ctx, 1);
        quiet.config = GlitchConfig::calm();
        testing::run(&mut quiet, &mut ctx, 41);
        assert_eq!(quiet.population(), 0);
    }

    #[test]
    fn test_render_is_repeatable() {
        let mut ctx = testing::ctx();
        let mut glitch = Glitch::new(GlitchConfig::chaotic(), &mut ctx);
        testing::run(&mut glitch, &mut ctx, 2);
        let mut a = Canvas::new(64, 48);
        let mut b = Canvas::new(64, 48);
        glitch.render(&mut a, Some(&image()));
        glitch.render(&mut b, Some(&image()));
        assert_eq!(a.to_rgba8(), b.to_rgba8());
    }

    #[test]
    fn test_channel_isolation() {
        let c = Color::rgba(0.2, 0.4, 0.6, 1.0);
        assert_eq!(Channel::Green.isolate(c), Color::rgba(0.0, 0.4, 0.0, 1.0));
    }
}
