//! Perspective camera with reverse-Z projection.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Quat, Vec3};

/// Per-pass camera block bound at group 0 of every program.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
}

static_assertions::const_assert_eq!(std::mem::size_of::<CameraUniform>(), 80);

/// A perspective camera looking down its local -Z axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Camera at the origin with the given projection.
    pub fn perspective(fov_y: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_y,
            aspect_ratio,
            near,
            far,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    /// Reverse-Z: the near plane maps to depth 1, the far plane to depth 0.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Update the aspect ratio from a viewport size. Zero heights are ignored.
    pub fn set_aspect_ratio(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection_matrix().to_cols_array_2d(),
            position: self.position.extend(1.0).to_array(),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(std::f32::consts::FRAC_PI_4, 16.0 / 9.0, 0.1, 10_000.0)
    }
}

/// Rotation that points a camera at `eye` toward `target` (its -Z axis
/// aimed at the target, +Y as close to `up` as possible).
///
/// Returns the identity when `eye == target`. When the view direction is
/// parallel to `up` the up vector is nudged so a valid basis still exists.
pub fn look_at_rotation(eye: Vec3, target: Vec3, up: Vec3) -> Quat {
    let Some(z) = (eye - target).try_normalize() else {
        return Quat::IDENTITY;
    };
    basis_rotation(z, up)
}

/// Rotation that turns an object's +Z axis toward `target`, as used for
/// billboards that must face a viewer.
pub fn face_towards_rotation(position: Vec3, target: Vec3, up: Vec3) -> Quat {
    let Some(z) = (target - position).try_normalize() else {
        return Quat::IDENTITY;
    };
    basis_rotation(z, up)
}

fn basis_rotation(z: Vec3, up: Vec3) -> Quat {
    let (z, x) = match up.cross(z).try_normalize() {
        Some(x) => (z, x),
        None => {
            // Looking straight along `up`: perturb the direction slightly.
            let mut nudged = z;
            if (up.z.abs() - 1.0).abs() < f32::EPSILON {
                nudged.x += 1e-4;
            } else {
                nudged.z += 1e-4;
            }
            let nudged = nudged.normalize();
            (nudged, up.cross(nudged).normalize())
        }
    };
    let y = z.cross(x);
    Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize()
}
