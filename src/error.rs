//! Error types for fxdeck.
//!
//! Only the edges of the crate can fail: decoding the background image,
//! bringing up the GPU, creating the window, and parsing effect names.
//! Everything inside the frame loop degrades instead (skip, clamp, or fall
//! back), so there is no error type for it.

use std::fmt;

/// Errors from loading the background image.
#[derive(Debug)]
pub enum BackgroundError {
    /// The file was read but could not be decoded.
    ImageLoad(image::ImageError),
    /// The file could not be read.
    Io(std::io::Error),
    /// The loader thread went away without reporting a result.
    Disconnected,
}

impl fmt::Display for BackgroundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackgroundError::ImageLoad(e) => write!(f, "Failed to decode background image: {}", e),
            BackgroundError::Io(e) => write!(f, "Failed to read background image: {}", e),
            BackgroundError::Disconnected => {
                write!(f, "Background loader stopped before finishing")
            }
        }
    }
}

impl std::error::Error for BackgroundError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackgroundError::ImageLoad(e) => Some(e),
            BackgroundError::Io(e) => Some(e),
            BackgroundError::Disconnected => None,
        }
    }
}

impl From<image::ImageError> for BackgroundError {
    fn from(e: image::ImageError) -> Self {
        BackgroundError::ImageLoad(e)
    }
}

impl From<std::io::Error> for BackgroundError {
    fn from(e: std::io::Error) -> Self {
        BackgroundError::Io(e)
    }
}

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter(wgpu::RequestAdapterError),
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The adapter cannot present to the window surface.
    UnsupportedSurface,
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter(e) => write!(
                f,
                "No compatible GPU adapter found ({}). Ensure your system has Vulkan/Metal/DX12/GL support.",
                e
            ),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::UnsupportedSurface => {
                write!(f, "The GPU adapter cannot present to this window")
            }
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::NoAdapter(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::UnsupportedSurface => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestAdapterError> for GpuError {
    fn from(e: wgpu::RequestAdapterError) -> Self {
        GpuError::NoAdapter(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that stop the host binary.
#[derive(Debug)]
pub enum HostError {
    /// Failed to create or run the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create the window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// The background image named on the command line is unusable.
    Background(BackgroundError),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::EventLoop(e) => write!(f, "Event loop error: {}", e),
            HostError::Window(e) => write!(f, "Failed to create window: {}", e),
            HostError::Gpu(e) => write!(f, "GPU error: {}", e),
            HostError::Background(e) => write!(f, "Background error: {}", e),
        }
    }
}

impl std::error::Error for HostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HostError::EventLoop(e) => Some(e),
            HostError::Window(e) => Some(e),
            HostError::Gpu(e) => Some(e),
            HostError::Background(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for HostError {
    fn from(e: winit::error::EventLoopError) -> Self {
        HostError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for HostError {
    fn from(e: winit::error::OsError) -> Self {
        HostError::Window(e)
    }
}

impl From<GpuError> for HostError {
    fn from(e: GpuError) -> Self {
        HostError::Gpu(e)
    }
}

impl From<BackgroundError> for HostError {
    fn from(e: BackgroundError) -> Self {
        HostError::Background(e)
    }
}

/// An effect name that is not in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEffectIdError {
    name: String,
}

impl ParseEffectIdError {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ParseEffectIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown effect '{}'", self.name)
    }
}

impl std::error::Error for ParseEffectIdError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_background_error_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.png");
        let err: HostError = BackgroundError::from(io).into();
        assert!(err.to_string().contains("missing.png"));
        let source = err.source().and_then(|s| s.source());
        assert!(source.is_some());
    }

    #[test]
    fn test_disconnected_has_no_source() {
        let err = BackgroundError::Disconnected;
        assert!(err.source().is_none());
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_parse_error_names_the_input() {
        let err = ParseEffectIdError::new("confetti");
        assert_eq!(err.name(), "confetti");
        assert!(err.to_string().contains("confetti"));
    }
}
