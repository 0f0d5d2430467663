use std::path::PathBuf;

use clap::Parser;
use fxdeck::effects::EffectId;
use fxdeck::error::HostError;
use fxdeck::window::{App, HostConfig};
use tracing_subscriber::EnvFilter;
use winit::event_loop::{ControlFlow, EventLoop};

#[derive(Parser)]
#[command(name = "fxdeck")]
#[command(about = "Full-screen decorative effects over a background image", long_about = None)]
#[command(version)]
struct Cli {
    /// Background image (PNG or JPEG)
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Effect to start with, e.g. snow, rain, water-ripple
    #[arg(short, long)]
    effect: Option<EffectId>,

    /// Initial window width in physical pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Initial window height in physical pixels
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Seed the effects' randomness
    #[arg(long)]
    seed: Option<u64>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), HostError> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "fxdeck=debug" } else { "fxdeck=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(HostConfig {
        width: cli.width,
        height: cli.height,
        image: cli.image,
        effect: cli.effect,
        seed: cli.seed,
    });
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
