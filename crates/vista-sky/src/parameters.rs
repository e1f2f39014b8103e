//! Sky dome shading parameters: the serialisable form and the parsed,
//! range-checked form written into the dome program every frame.

use std::ops::RangeInclusive;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::SkyError;
use crate::uniforms::SkyUniforms;

/// Sky dome colours (as `#rrggbb`) and blend curve scalars.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SkyParameters {
    pub color_day_low: String,
    pub color_day_high: String,
    pub color_night_low: String,
    pub color_night_high: String,
    pub color_sun: String,
    pub color_dawn: String,
    pub atmosphere_elevation: f32,
    pub atmosphere_power: f32,
    pub dawn_angle_amplitude: f32,
    pub dawn_elevation_amplitude: f32,
    pub sun_amplitude: f32,
    pub sun_multiplier: f32,
}

impl Default for SkyParameters {
    fn default() -> Self {
        Self {
            color_day_low: "#f0fff9".into(),
            color_day_high: "#2e89ff".into(),
            color_night_low: "#004794".into(),
            color_night_high: "#001624".into(),
            color_sun: "#ff531a".into(),
            color_dawn: "#ff1900".into(),
            atmosphere_elevation: 0.5,
            atmosphere_power: 10.0,
            dawn_angle_amplitude: 1.0,
            dawn_elevation_amplitude: 0.2,
            sun_amplitude: 0.75,
            sun_multiplier: 1.0,
        }
    }
}

/// Parse `#rgb` or `#rrggbb` (leading `#` optional) into RGB in `[0, 1]`.
/// Channels are taken as-is, with no sRGB decoding.
pub fn parse_hex_color(field: &'static str, value: &str) -> Result<[f32; 3], SkyError> {
    let invalid = || SkyError::InvalidColor {
        field,
        value: value.to_string(),
    };
    let hex = value.trim().trim_start_matches('#');
    // `from_str_radix` alone would accept a sign.
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

    let [r, g, b] = match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, out) in rgb.iter_mut().enumerate() {
                let digit = channel(&hex[i..i + 1])?;
                *out = digit * 17;
            }
            rgb
        }
        6 => [
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        ],
        _ => return Err(invalid()),
    };
    Ok([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0])
}

/// Parsed sky shading state. Setters clamp to the same ranges the tuning
/// panel exposes.
#[derive(Clone, Debug, PartialEq)]
pub struct SkyShading {
    color_day_low: [f32; 3],
    color_day_high: [f32; 3],
    color_night_low: [f32; 3],
    color_night_high: [f32; 3],
    color_sun: [f32; 3],
    color_dawn: [f32; 3],
    atmosphere_elevation: f32,
    atmosphere_power: f32,
    dawn_angle_amplitude: f32,
    dawn_elevation_amplitude: f32,
    sun_amplitude: f32,
    sun_multiplier: f32,
}

impl SkyShading {
    pub const ATMOSPHERE_ELEVATION_RANGE: RangeInclusive<f32> = 0.0..=5.0;
    pub const ATMOSPHERE_POWER_RANGE: RangeInclusive<f32> = 0.0..=20.0;
    pub const DAWN_ANGLE_AMPLITUDE_RANGE: RangeInclusive<f32> = 0.0..=1.0;
    pub const DAWN_ELEVATION_AMPLITUDE_RANGE: RangeInclusive<f32> = 0.0..=1.0;
    pub const SUN_AMPLITUDE_RANGE: RangeInclusive<f32> = 0.0..=3.0;
    pub const SUN_MULTIPLIER_RANGE: RangeInclusive<f32> = 0.0..=1.0;

    pub fn from_parameters(params: &SkyParameters) -> Result<Self, SkyError> {
        let mut shading = Self {
            color_day_low: parse_hex_color("color_day_low", &params.color_day_low)?,
            color_day_high: parse_hex_color("color_day_high", &params.color_day_high)?,
            color_night_low: parse_hex_color("color_night_low", &params.color_night_low)?,
            color_night_high: parse_hex_color("color_night_high", &params.color_night_high)?,
            color_sun: parse_hex_color("color_sun", &params.color_sun)?,
            color_dawn: parse_hex_color("color_dawn", &params.color_dawn)?,
            atmosphere_elevation: 0.0,
            atmosphere_power: 0.0,
            dawn_angle_amplitude: 0.0,
            dawn_elevation_amplitude: 0.0,
            sun_amplitude: 0.0,
            sun_multiplier: 0.0,
        };
        shading.set_atmosphere_elevation(params.atmosphere_elevation);
        shading.set_atmosphere_power(params.atmosphere_power);
        shading.set_dawn_angle_amplitude(params.dawn_angle_amplitude);
        shading.set_dawn_elevation_amplitude(params.dawn_elevation_amplitude);
        shading.set_sun_amplitude(params.sun_amplitude);
        shading.set_sun_multiplier(params.sun_multiplier);
        Ok(shading)
    }

    pub fn atmosphere_elevation(&self) -> f32 {
        self.atmosphere_elevation
    }

    pub fn atmosphere_power(&self) -> f32 {
        self.atmosphere_power
    }

    pub fn dawn_angle_amplitude(&self) -> f32 {
        self.dawn_angle_amplitude
    }

    pub fn dawn_elevation_amplitude(&self) -> f32 {
        self.dawn_elevation_amplitude
    }

    pub fn sun_amplitude(&self) -> f32 {
        self.sun_amplitude
    }

    pub fn sun_multiplier(&self) -> f32 {
        self.sun_multiplier
    }

    pub fn color_day_low(&self) -> [f32; 3] {
        self.color_day_low
    }

    pub fn color_dawn(&self) -> [f32; 3] {
        self.color_dawn
    }

    pub fn set_atmosphere_elevation(&mut self, value: f32) {
        self.atmosphere_elevation = clamp_to(value, &Self::ATMOSPHERE_ELEVATION_RANGE);
    }

    /// Integer steps only.
    pub fn set_atmosphere_power(&mut self, value: f32) {
        self.atmosphere_power = clamp_to(value.round(), &Self::ATMOSPHERE_POWER_RANGE);
    }

    pub fn set_dawn_angle_amplitude(&mut self, value: f32) {
        self.dawn_angle_amplitude = clamp_to(value, &Self::DAWN_ANGLE_AMPLITUDE_RANGE);
    }

    pub fn set_dawn_elevation_amplitude(&mut self, value: f32) {
        self.dawn_elevation_amplitude = clamp_to(value, &Self::DAWN_ELEVATION_AMPLITUDE_RANGE);
    }

    pub fn set_sun_amplitude(&mut self, value: f32) {
        self.sun_amplitude = clamp_to(value, &Self::SUN_AMPLITUDE_RANGE);
    }

    pub fn set_sun_multiplier(&mut self, value: f32) {
        self.sun_multiplier = clamp_to(value, &Self::SUN_MULTIPLIER_RANGE);
    }

    /// Set one of the six colours from a hex string.
    pub fn set_color(&mut self, slot: SkyColor, hex: &str) -> Result<(), SkyError> {
        let rgb = parse_hex_color(slot.name(), hex)?;
        *match slot {
            SkyColor::DayLow => &mut self.color_day_low,
            SkyColor::DayHigh => &mut self.color_day_high,
            SkyColor::NightLow => &mut self.color_night_low,
            SkyColor::NightHigh => &mut self.color_night_high,
            SkyColor::Sun => &mut self.color_sun,
            SkyColor::Dawn => &mut self.color_dawn,
        } = rgb;
        Ok(())
    }

    /// Uniform block for this frame's day progress and sun direction.
    pub fn to_uniforms(&self, day_progress: f32, sun_position: Vec3) -> SkyUniforms {
        SkyUniforms {
            color_day_low: self.color_day_low,
            atmosphere_elevation: self.atmosphere_elevation,
            color_day_high: self.color_day_high,
            atmosphere_power: self.atmosphere_power,
            color_night_low: self.color_night_low,
            dawn_angle_amplitude: self.dawn_angle_amplitude,
            color_night_high: self.color_night_high,
            dawn_elevation_amplitude: self.dawn_elevation_amplitude,
            color_sun: self.color_sun,
            sun_amplitude: self.sun_amplitude,
            color_dawn: self.color_dawn,
            sun_multiplier: self.sun_multiplier,
            sun_position: sun_position.to_array(),
            day_progress,
        }
    }
}

/// Weight of the day gradient over the night gradient, in `[0, 1]`.
///
/// Day progress contributes a cosine cycle (0 at midnight, 1 at noon) and
/// the sun elevation a smooth step across the horizon. The dome shader
/// computes the same blend.
pub fn day_strength(day_progress: f32, sun_elevation: f32) -> f32 {
    let cycle = 0.5 - 0.5 * (day_progress * std::f32::consts::TAU).cos();
    let elevation = smoothstep(-0.25, 0.25, sun_elevation);
    smoothstep(0.0, 1.0, 0.5 * (cycle + elevation))
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// The six tunable sky colours.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkyColor {
    DayLow,
    DayHigh,
    NightLow,
    NightHigh,
    Sun,
    Dawn,
}

impl SkyColor {
    fn name(self) -> &'static str {
        match self {
            SkyColor::DayLow => "color_day_low",
            SkyColor::DayHigh => "color_day_high",
            SkyColor::NightLow => "color_night_low",
            SkyColor::NightHigh => "color_night_high",
            SkyColor::Sun => "color_sun",
            SkyColor::Dawn => "color_dawn",
        }
    }
}

fn clamp_to(value: f32, range: &RangeInclusive<f32>) -> f32 {
    value.clamp(*range.start(), *range.end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-6)
    }

    #[test]
    fn test_parse_six_digit_hex() {
        let rgb = parse_hex_color("c", "#ff531a").unwrap();
        assert!(approx(rgb, [1.0, 83.0 / 255.0, 26.0 / 255.0]));
        let upper = parse_hex_color("c", "2E89FF").unwrap();
        assert!(approx(upper, [46.0 / 255.0, 137.0 / 255.0, 1.0]));
    }

    #[test]
    fn test_parse_three_digit_hex() {
        assert!(approx(parse_hex_color("c", "#fff").unwrap(), [1.0, 1.0, 1.0]));
        assert!(approx(parse_hex_color("c", "#f00").unwrap(), [1.0, 0.0, 0.0]));
    }

    #[test]
    fn test_invalid_hex_names_the_field() {
        for bad in [
            "", "#12", "#12345", "#gg0000", "#ff00ff00", "#ééé", "#+f+f+f", "+ff", "#-1-1-1",
        ] {
            match parse_hex_color("color_sun", bad) {
                Err(SkyError::InvalidColor { field, value }) => {
                    assert_eq!(field, "color_sun");
                    assert_eq!(value, bad);
                }
                other => panic!("{bad:?} parsed as {other:?}"),
            }
        }
    }

    #[test]
    fn test_day_strength_extremes() {
        assert!((day_strength(0.5, 1.0) - 1.0).abs() < 1e-6);
        assert!(day_strength(0.0, -1.0).abs() < 1e-6);
    }

    #[test]
    fn test_day_progress_moves_the_blend() {
        // Same sun elevation, different point in the cycle.
        let dawn = day_strength(0.25, 0.0);
        let noon = day_strength(0.5, 0.0);
        let midnight = day_strength(0.0, 0.0);
        assert!(midnight < dawn && dawn < noon);
        assert!((dawn - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_dome_shader_blends_with_day_progress() {
        let source = crate::SKY_SPHERE_SHADER_SOURCE;
        let fragment = &source[source.find("fn fs_main").unwrap()..];
        assert!(fragment.contains("day_strength(sky.day_progress, sun.y)"));
        assert!(source.contains("fn day_strength(progress: f32, sun_elevation: f32)"));
    }

    #[test]
    fn test_defaults_parse() {
        let shading = SkyShading::from_parameters(&SkyParameters::default()).unwrap();
        assert!(approx(shading.color_day_low(), [240.0 / 255.0, 1.0, 249.0 / 255.0]));
        assert_eq!(shading.atmosphere_power(), 10.0);
        assert_eq!(shading.sun_amplitude(), 0.75);
    }

    #[test]
    fn test_bad_parameters_are_rejected() {
        let params = SkyParameters {
            color_night_high: "night".into(),
            ..SkyParameters::default()
        };
        assert!(matches!(
            SkyShading::from_parameters(&params),
            Err(SkyError::InvalidColor { field: "color_night_high", .. })
        ));
    }

    #[test]
    fn test_out_of_range_scalars_are_clamped() {
        let params = SkyParameters {
            atmosphere_elevation: 9.0,
            atmosphere_power: -3.0,
            sun_multiplier: 4.0,
            ..SkyParameters::default()
        };
        let shading = SkyShading::from_parameters(&params).unwrap();
        assert_eq!(shading.atmosphere_elevation(), 5.0);
        assert_eq!(shading.atmosphere_power(), 0.0);
        assert_eq!(shading.sun_multiplier(), 1.0);
    }

    #[test]
    fn test_set_color_keeps_old_value_on_error() {
        let mut shading = SkyShading::from_parameters(&SkyParameters::default()).unwrap();
        let before = shading.color_dawn();
        assert!(shading.set_color(SkyColor::Dawn, "#zz0000").is_err());
        assert_eq!(shading.color_dawn(), before);
        shading.set_color(SkyColor::Dawn, "#000000").unwrap();
        assert_eq!(shading.color_dawn(), [0.0; 3]);
    }

    #[test]
    fn test_uniforms_carry_frame_inputs() {
        let shading = SkyShading::from_parameters(&SkyParameters::default()).unwrap();
        let uniforms = shading.to_uniforms(0.75, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(uniforms.day_progress, 0.75);
        assert_eq!(uniforms.sun_position, [0.0, -1.0, 0.0]);
        assert_eq!(uniforms.atmosphere_elevation, 0.5);
    }

    #[test]
    fn test_parameters_ron_partial() {
        let params: SkyParameters = ron::from_str("(sun_amplitude: 2.0)").unwrap();
        assert_eq!(params.sun_amplitude, 2.0);
        assert_eq!(params.color_sun, "#ff531a");
    }
}
