//! Player viewpoint: pointer input accumulation and the terrain-aware
//! third-person orbit camera.

mod orbit_camera;
mod pointer;

pub use orbit_camera::{
    OrbitCamera, OrbitCameraConfig, OrbitCameraPose, clamp_to_ground, spherical_offset,
};
pub use pointer::{PointerSnapshot, PointerState};
