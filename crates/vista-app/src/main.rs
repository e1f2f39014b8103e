//! Runs the world pipeline for a fixed number of frames, either on the GPU
//! or against the bookkeeping-only device.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use glam::Vec3;
use vista_app::{
    CheckerboardConfig, DayCycle, FIXED_DT, FrameInputs, ScriptedPointer, SharedTopology,
    WorldRenderer, spawn_checkerboard_generator,
};
use vista_config::{CliArgs, Config, default_config_dir};
use vista_render::{HeadlessDevice, RenderDevice, WgpuDevice};
use vista_terrain::{TopologyQuery, terrain_channel};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Backend {
    Headless,
    Wgpu,
}

#[derive(Parser, Debug)]
#[command(name = "vista", about = "Vista terrain/sky/camera frame driver")]
struct Args {
    #[command(flatten)]
    cli: CliArgs,

    /// Number of frames to run.
    #[arg(long, default_value_t = 240)]
    frames: u64,

    /// Render backend.
    #[arg(long, value_enum, default_value_t = Backend::Headless)]
    backend: Backend,

    /// Chunks generated on each side of the origin.
    #[arg(long, default_value_t = 2)]
    chunk_radius: i32,
}

/// Radius of the circle the scripted player walks.
const PATH_RADIUS: f32 = 24.0;

fn main() {
    let args = Args::parse();

    let config_dir = match args.cli.config.clone() {
        Some(dir) => Some(dir),
        None => default_config_dir().ok(),
    };
    let mut config = match config_dir.as_deref().map(Config::load_or_create) {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            eprintln!("Failed to load config, using defaults: {e}");
            Config::default()
        }
        None => Config::default(),
    };
    config.apply_cli_overrides(&args.cli);

    let log_dir: Option<PathBuf> = config_dir.as_ref().map(|dir| dir.join("logs"));
    vista_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    if let Err(e) = run(&args, &config) {
        tracing::error!("Vista failed: {e}");
        std::process::exit(1);
    }
}

fn create_device(backend: Backend) -> Box<dyn RenderDevice> {
    match backend {
        Backend::Headless => Box::new(HeadlessDevice::new()),
        Backend::Wgpu => match WgpuDevice::new() {
            Ok(device) => Box::new(device),
            Err(e) => {
                tracing::warn!("No GPU device ({e}), falling back to headless");
                Box::new(HeadlessDevice::new())
            }
        },
    }
}

fn run(args: &Args, config: &Config) -> Result<(), vista_app::AppError> {
    let mut device = create_device(args.backend);
    let device = device.as_mut();

    let (sender, receiver) = terrain_channel();
    let topology = SharedTopology::new();
    let generator = spawn_checkerboard_generator(
        sender,
        topology.clone(),
        CheckerboardConfig {
            radius: args.chunk_radius.max(0),
            segments: config.render.terrain_segments,
            ..CheckerboardConfig::default()
        },
    )
    .map_err(vista_app::AppError::Generator)?;

    let mut world = WorldRenderer::new(device, config, receiver)?;
    let mut day = DayCycle::from_config(&config.day);
    let mut pointer = ScriptedPointer::new(config.window.width, config.window.height);

    for frame in 0..args.frames {
        day.tick(FIXED_DT);
        let progress = day.progress() as f32;

        let angle = frame as f32 * FIXED_DT as f32 * 0.2;
        let mut player = Vec3::new(angle.cos(), 0.0, angle.sin()) * PATH_RADIUS;
        player.y = topology.elevation_at(player.x, player.z).unwrap_or(0.0);

        let report = world.tick(
            device,
            &FrameInputs {
                player_position: player,
                pointer: pointer.frame(frame),
                day_progress: progress,
                sun_direction: day.sun_direction(),
            },
            &topology,
        );

        if report.frame % 60 == 0 {
            let stats = world.terrain().stats();
            tracing::info!(
                "Frame {}: day {:.3}, {} chunks ({} built), {} passes",
                report.frame,
                progress,
                stats.live_chunks,
                stats.built_chunks,
                device.stats().passes_rendered
            );
        }
    }

    match generator.join() {
        Ok(sent) => tracing::debug!("Generator finished after {sent} records"),
        Err(_) => tracing::error!("Generator thread panicked"),
    }

    let stats = world.terrain().stats();
    world.dispose(device);
    tracing::info!(
        "Done: {} rebuilds, {} rejected records, {} ignored events, {} invalid disposals",
        stats.total_rebuilds,
        stats.rejected_records,
        stats.ignored_events,
        device.stats().invalid_disposals
    );
    Ok(())
}
