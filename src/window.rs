//! The windowed host: winit event handling plus the wgpu surface.
//!
//! Every redraw runs one frame:
//!
//! 1. apply key presses (`1`-`9`, `0`, `Q`-`Y` select, `Escape` deselects);
//! 2. hand queued pointer events to the deck;
//! 3. tick the deck and upload its canvas with `queue.write_texture`;
//! 4. blit and present, then ask for the next redraw.
//!
//! Canvas pixels map one-to-one to the window's physical pixels.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

use crate::background::ImageSlot;
use crate::canvas::Canvas;
use crate::deck::Deck;
use crate::effects::EffectId;
use crate::error::{GpuError, HostError};
use crate::input::{effect_for_key, Input, KeyCode};
use crate::shader::Blit;
use crate::time::Time;

/// Start-up options for the host.
#[derive(Debug, Clone, Default)]
pub struct HostConfig {
    pub width: u32,
    pub height: u32,
    pub image: Option<PathBuf>,
    pub effect: Option<EffectId>,
    pub seed: Option<u64>,
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    blit: Blit,
}

impl GpuState {
    pub async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::UnsupportedSurface)?;
        let alpha_mode =
            surface_caps.alpha_modes.first().copied().ok_or(GpuError::UnsupportedSurface)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let blit = Blit::new(&device, surface_format, config.width, config.height);
        info!(
            adapter = %adapter.get_info().name,
            format = ?surface_format,
            width = config.width,
            height = config.height,
            "gpu ready"
        );

        Ok(Self { surface, device, queue, config, blit })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.blit.resize(&self.device, new_size.width, new_size.height);
        }
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn render(&mut self, canvas: &Canvas) -> Result<(), wgpu::SurfaceError> {
        if !self.blit.upload(&self.queue, canvas) {
            debug!(
                canvas = ?(canvas.width(), canvas.height()),
                texture = ?self.blit.size(),
                "skipping stale canvas"
            );
        }

        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Blit Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Blit Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.blit.draw(&mut render_pass);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

pub struct App {
    config: HostConfig,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    deck: Deck,
    input: Input,
    time: Time,
    error: Option<HostError>,
}

impl App {
    pub fn new(config: HostConfig) -> Self {
        let mut deck = Deck::new(config.width, config.height);
        if let Some(seed) = config.seed {
            deck = deck.with_seed(seed);
        }
        if let Some(path) = &config.image {
            info!(path = %path.display(), "loading background");
            deck.set_background(ImageSlot::load(path));
        }
        Self {
            config,
            window: None,
            gpu_state: None,
            deck,
            input: Input::new(),
            time: Time::new(),
            error: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<HostError> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: HostError) {
        error!(error = %err, "host stopping");
        self.error = Some(err);
        event_loop.exit();
    }

    fn apply_keys(&mut self) {
        let pressed: Vec<KeyCode> = self.input.pressed_keys().collect();
        for key in pressed {
            if key == KeyCode::Escape {
                self.deck.deselect_all();
            } else if let Some(id) = effect_for_key(key) {
                self.deck.select_effect(id);
            } else {
                continue;
            }
            self.update_title();
        }
    }

    fn update_title(&self) {
        if let Some(window) = &self.window {
            match self.deck.active() {
                Some(id) => window.set_title(&format!("fxdeck - {}", id)),
                None => window.set_title("fxdeck"),
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.apply_keys();
        for event in self.input.drain_pointer() {
            self.deck.pointer(event);
        }
        self.input.begin_frame();

        let frame = self.time.tick();
        let canvas = self.deck.tick(&frame);

        if let Some(gpu_state) = &mut self.gpu_state {
            match gpu_state.render(canvas) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    gpu_state.reconfigure()
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    error!("out of GPU memory");
                    event_loop.exit();
                }
                Err(e) => warn!(error = ?e, "frame dropped"),
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("fxdeck")
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };
        let gpu_state = match pollster::block_on(GpuState::new(window.clone())) {
            Ok(state) => state,
            Err(e) => return self.fail(event_loop, e.into()),
        };

        let size = window.inner_size();
        self.deck.resize(size.width, size.height);
        self.window = Some(window.clone());
        self.gpu_state = Some(gpu_state);

        if let Some(id) = self.config.effect {
            self.deck.select_effect(id);
        }
        self.update_title();
        window.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                self.deck.deselect_all();
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
                if physical_size.width > 0 && physical_size.height > 0 {
                    self.deck.resize(physical_size.width, physical_size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
