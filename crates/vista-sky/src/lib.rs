//! Atmospheric sky: an offscreen dome pass whose image is both the visible
//! background and the fog input of other programs, plus a world-scale sun
//! disc in the main scene.

mod background;
mod compositor;
mod dome;
mod error;
mod parameters;
mod sun_disc;
mod uniforms;

pub use background::{SKY_TEXTURE_SLOT, SkyBackground};
pub use compositor::{SkyCompositor, SkyCompositorConfig, SkyFrame};
pub use dome::SkyDome;
pub use error::SkyError;
pub use parameters::{SkyColor, SkyParameters, SkyShading, day_strength, parse_hex_color};
pub use sun_disc::{SUN_DISC_SEGMENTS, SUN_RADIUS_FACTOR, SunDisc, sun_disc_placement};
pub use uniforms::{ColorUniforms, SkyUniforms};

pub const SKY_SPHERE_SHADER_SOURCE: &str = include_str!("shaders/sky_sphere.wgsl");
pub const SKY_BACKGROUND_SHADER_SOURCE: &str = include_str!("shaders/sky_background.wgsl");
pub const SUN_DISC_SHADER_SOURCE: &str = include_str!("shaders/sun_disc.wgsl");
