//! Vista frame driver: wires the day clock, terrain generation, sky and the
//! orbit camera into one per-frame pipeline.

pub mod day_cycle;
pub mod error;
pub mod generator;
pub mod script;
pub mod topology;
pub mod world_renderer;

pub use day_cycle::{DayCycle, sun_direction};
pub use error::AppError;
pub use generator::{
    CheckerboardConfig, checkerboard_chunk, checkerboard_id, spawn_checkerboard_generator,
};
pub use script::ScriptedPointer;
pub use topology::SharedTopology;
pub use world_renderer::{
    FrameInputs, FrameReport, WorldRenderer, orbit_camera_config, sky_parameters,
};

/// Fixed simulation timestep: 60 Hz.
pub const FIXED_DT: f64 = 1.0 / 60.0;
