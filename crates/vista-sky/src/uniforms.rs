//! GPU layouts of the sky programs' uniform blocks.

use bytemuck::{Pod, Zeroable};

/// Dome uniforms. Each colour is padded by the scalar that follows it.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SkyUniforms {
    pub color_day_low: [f32; 3],
    pub atmosphere_elevation: f32,
    pub color_day_high: [f32; 3],
    pub atmosphere_power: f32,
    pub color_night_low: [f32; 3],
    pub dawn_angle_amplitude: f32,
    pub color_night_high: [f32; 3],
    pub dawn_elevation_amplitude: f32,
    pub color_sun: [f32; 3],
    pub sun_amplitude: f32,
    pub color_dawn: [f32; 3],
    pub sun_multiplier: f32,
    pub sun_position: [f32; 3],
    pub day_progress: f32,
}

static_assertions::const_assert_eq!(std::mem::size_of::<SkyUniforms>(), 112);

/// Flat colour used by the sun disc and the background quad.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ColorUniforms {
    pub color: [f32; 4],
}

static_assertions::const_assert_eq!(std::mem::size_of::<ColorUniforms>(), 16);
