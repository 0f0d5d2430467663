//! The background image: loaded off-thread, stretched to the viewport.
//!
//! Decoding a large JPEG takes long enough to drop frames, so
//! [`ImageSlot::load`] hands the work to a `std::thread` and returns at once.
//! The frame loop calls [`Background::poll`] every tick; it never blocks.
//!
//! ```text
//! Pending ──decoded──▶ Ready
//!    │
//!    └──error / thread gone──▶ Failed
//! ```
//!
//! While the slot is not ready, image-keyed effects draw their own fallback
//! and the deck paints [`fallback_gradient`] beneath the effect layer.

use crate::canvas::Canvas;
use crate::error::BackgroundError;
use crate::visuals::{Color, Gradient, Paint};
use glam::Vec2;
use image::imageops::FilterType;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use tracing::{info, warn};

const FALLBACK_TOP: u32 = 0x0F172A;
const FALLBACK_BOTTOM: u32 = 0x1E293B;

/// Where the background image currently stands.
#[derive(Debug)]
pub enum ImageSlot {
    /// Decoding on a worker thread.
    Pending(Receiver<Result<RgbaImage, BackgroundError>>),
    Ready(RgbaImage),
    /// Load failed; the fallback is used for the rest of the run.
    Failed,
}

impl ImageSlot {
    /// Start decoding `path` on a worker thread.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path: PathBuf = path.as_ref().to_path_buf();
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            // Ignore send errors - the deck may have been dropped
            let _ = tx.send(decode(&path));
        });
        ImageSlot::Pending(rx)
    }

    /// An already decoded image.
    pub fn ready(image: RgbaImage) -> Self {
        ImageSlot::Ready(image)
    }

    /// Check the worker without blocking. Returns true if the slot changed.
    pub fn poll(&mut self) -> bool {
        let ImageSlot::Pending(rx) = self else {
            return false;
        };
        let outcome = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => Err(BackgroundError::Disconnected),
        };
        *self = match outcome {
            Ok(image) => {
                info!(width = image.width(), height = image.height(), "background ready");
                ImageSlot::Ready(image)
            }
            Err(e) => {
                warn!(error = %e, "background unavailable, using fallback");
                ImageSlot::Failed
            }
        };
        true
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        match self {
            ImageSlot::Ready(image) => Some(image),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ImageSlot::Pending(_))
    }
}

/// Read and decode an image file into RGBA8.
pub fn decode(path: &Path) -> Result<RgbaImage, BackgroundError> {
    let bytes = std::fs::read(path)?;
    Ok(image::load_from_memory(&bytes)?.into_rgba8())
}

/// Dark vertical gradient shown when no image is available.
pub fn fallback_gradient(height: f32) -> Paint {
    Paint::linear(
        Vec2::ZERO,
        Vec2::new(0.0, height.max(1.0)),
        Gradient::linear(Color::hex(FALLBACK_TOP), Color::hex(FALLBACK_BOTTOM)),
    )
}

/// The background slot plus a copy stretched to the viewport.
#[derive(Debug)]
pub struct Background {
    slot: ImageSlot,
    scaled: Option<RgbaImage>,
    viewport: (u32, u32),
}

impl Background {
    pub fn new(slot: ImageSlot, width: u32, height: u32) -> Self {
        let mut background = Self { slot, scaled: None, viewport: (width, height) };
        background.rescale();
        background
    }

    /// No image at all: always the fallback.
    pub fn none(width: u32, height: u32) -> Self {
        Self::new(ImageSlot::Failed, width, height)
    }

    pub fn set_slot(&mut self, slot: ImageSlot) {
        self.slot = slot;
        self.rescale();
    }

    /// Poll the loader. Returns true when the image just became ready.
    pub fn poll(&mut self) -> bool {
        if self.slot.poll() {
            self.rescale();
            return self.scaled.is_some();
        }
        false
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.viewport != (width, height) {
            self.viewport = (width, height);
            self.rescale();
        }
    }

    pub fn slot(&self) -> &ImageSlot {
        &self.slot
    }

    /// The image at viewport size, once ready.
    pub fn scaled(&self) -> Option<&RgbaImage> {
        self.scaled.as_ref()
    }

    /// Paint the background (or the fallback) over the whole canvas.
    pub fn paint(&self, canvas: &mut Canvas) {
        match &self.scaled {
            Some(image) => {
                let size = Vec2::new(image.width() as f32, image.height() as f32);
                canvas.draw_image(image, Vec2::ZERO, size, Vec2::ZERO, canvas.size());
            }
            None => canvas.fill_all(&fallback_gradient(canvas.size().y)),
        }
    }

    fn rescale(&mut self) {
        let (w, h) = self.viewport;
        self.scaled = match self.slot.image() {
            Some(image) if w > 0 && h > 0 => {
                if image.dimensions() == (w, h) {
                    Some(image.clone())
                } else {
                    Some(image::imageops::resize(image, w, h, FilterType::Triangle))
                }
            }
            _ => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::time::{Duration, Instant};

    fn wait_until_settled(bg: &mut Background) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while bg.slot().is_pending() && Instant::now() < deadline {
            bg.poll();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_ready_image_is_stretched() {
        let image = RgbaImage::from_pixel(4, 2, Rgba([10, 20, 30, 255]));
        let mut bg = Background::new(ImageSlot::ready(image), 40, 30);
        assert_eq!(bg.scaled().map(|i| i.dimensions()), Some((40, 30)));
        bg.resize(8, 8);
        assert_eq!(bg.scaled().map(|i| i.dimensions()), Some((8, 8)));
    }

    #[test]
    fn test_missing_file_fails_to_fallback() {
        let mut bg = Background::new(ImageSlot::load("/definitely/not/here.png"), 16, 16);
        wait_until_settled(&mut bg);
        assert!(matches!(bg.slot(), ImageSlot::Failed));
        assert!(bg.scaled().is_none());

        let mut canvas = Canvas::new(16, 16);
        bg.paint(&mut canvas);
        assert_eq!(canvas.pixel(8, 0).a, 1.0);
    }

    #[test]
    fn test_load_from_disk() {
        let dir = std::env::temp_dir().join(format!("fxdeck-bg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bg.png");
        RgbaImage::from_pixel(3, 3, Rgba([200, 0, 0, 255])).save(&path).unwrap();

        let mut bg = Background::new(ImageSlot::load(&path), 6, 6);
        assert!(bg.scaled().is_none());
        wait_until_settled(&mut bg);
        let scaled = bg.scaled().expect("image decoded");
        assert_eq!(scaled.get_pixel(3, 3).0, [200, 0, 0, 255]);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_decode_reports_io_error() {
        let err = decode(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, BackgroundError::Io(_)));
    }
}
