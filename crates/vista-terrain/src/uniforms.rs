//! Shading parameters shared by every terrain chunk.

use std::ops::RangeInclusive;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// GPU layout of the terrain program's uniform block (group 1, binding 0).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TerrainUniforms {
    pub player_position: [f32; 3],
    pub grass_distance: f32,
    pub sun_position: [f32; 3],
    pub lightness_smoothness: f32,
    pub fresnel_offset: f32,
    pub fresnel_scale: f32,
    pub fresnel_power: f32,
    pub _padding: f32,
}

static_assertions::const_assert_eq!(std::mem::size_of::<TerrainUniforms>(), 48);

/// CPU-side terrain shading state. The chunk set is its only writer.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainShading {
    player_position: Vec3,
    sun_position: Vec3,
    grass_distance: f32,
    lightness_smoothness: f32,
    fresnel_offset: f32,
    fresnel_scale: f32,
    fresnel_power: f32,
}

impl TerrainShading {
    pub const LIGHTNESS_SMOOTHNESS_RANGE: RangeInclusive<f32> = 0.0..=1.0;
    pub const FRESNEL_OFFSET_RANGE: RangeInclusive<f32> = -1.0..=1.0;
    pub const FRESNEL_SCALE_RANGE: RangeInclusive<f32> = 0.0..=2.0;
    pub const FRESNEL_POWER_RANGE: RangeInclusive<f32> = 1.0..=10.0;

    pub fn new(grass_distance: f32) -> Self {
        Self {
            player_position: Vec3::ZERO,
            sun_position: Vec3::splat(-0.5),
            grass_distance,
            lightness_smoothness: 0.25,
            fresnel_offset: 0.0,
            fresnel_scale: 0.5,
            fresnel_power: 2.0,
        }
    }

    pub fn player_position(&self) -> Vec3 {
        self.player_position
    }

    pub fn sun_position(&self) -> Vec3 {
        self.sun_position
    }

    pub fn grass_distance(&self) -> f32 {
        self.grass_distance
    }

    pub fn lightness_smoothness(&self) -> f32 {
        self.lightness_smoothness
    }

    pub fn fresnel_offset(&self) -> f32 {
        self.fresnel_offset
    }

    pub fn fresnel_scale(&self) -> f32 {
        self.fresnel_scale
    }

    pub fn fresnel_power(&self) -> f32 {
        self.fresnel_power
    }

    pub(crate) fn set_frame_inputs(&mut self, player_position: Vec3, sun_position: Vec3) {
        self.player_position = player_position;
        self.sun_position = sun_position;
    }

    pub fn set_grass_distance(&mut self, distance: f32) {
        self.grass_distance = distance.max(0.0);
    }

    pub fn set_lightness_smoothness(&mut self, value: f32) {
        self.lightness_smoothness = clamp_to(value, &Self::LIGHTNESS_SMOOTHNESS_RANGE);
    }

    pub fn set_fresnel_offset(&mut self, value: f32) {
        self.fresnel_offset = clamp_to(value, &Self::FRESNEL_OFFSET_RANGE);
    }

    pub fn set_fresnel_scale(&mut self, value: f32) {
        self.fresnel_scale = clamp_to(value, &Self::FRESNEL_SCALE_RANGE);
    }

    /// The power is an integer exponent; fractional input is rounded.
    pub fn set_fresnel_power(&mut self, value: f32) {
        self.fresnel_power = clamp_to(value.round(), &Self::FRESNEL_POWER_RANGE);
    }

    pub fn to_uniforms(&self) -> TerrainUniforms {
        TerrainUniforms {
            player_position: self.player_position.to_array(),
            grass_distance: self.grass_distance,
            sun_position: self.sun_position.to_array(),
            lightness_smoothness: self.lightness_smoothness,
            fresnel_offset: self.fresnel_offset,
            fresnel_scale: self.fresnel_scale,
            fresnel_power: self.fresnel_power,
            _padding: 0.0,
        }
    }
}

fn clamp_to(value: f32, range: &RangeInclusive<f32>) -> f32 {
    value.clamp(*range.start(), *range.end())
}
