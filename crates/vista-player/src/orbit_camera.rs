//! Third-person orbit camera: pointer drag to spherical offset, look-at
//! orientation and ground clamping against the terrain topology.

use std::f32::consts::PI;

use glam::{Quat, Vec3};
use vista_render::{Camera, look_at_rotation};
use vista_terrain::TopologyQuery;

use crate::pointer::PointerSnapshot;

#[derive(Clone, Debug, PartialEq)]
pub struct OrbitCameraConfig {
    /// Distance between the look-at target and the camera.
    pub distance: f32,
    /// Initial polar angle from the vertical axis, in radians.
    pub phi: f32,
    /// Initial azimuth, in radians.
    pub theta: f32,
    /// Height of the look-at target above the player's feet.
    pub above_offset: f32,
    pub phi_min: f32,
    pub phi_max: f32,
    /// Radians per unit of normalised pointer motion.
    pub sensitivity: f32,
    /// Minimum height of the camera above the ground under it.
    pub ground_clearance: f32,
}

impl Default for OrbitCameraConfig {
    fn default() -> Self {
        Self {
            distance: 15.0,
            phi: PI * 0.45,
            theta: -PI * 0.25,
            above_offset: 2.0,
            phi_min: 0.1,
            phi_max: PI - 0.1,
            sensitivity: 2.0,
            ground_clearance: 1.0,
        }
    }
}

/// Resolved camera placement for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCameraPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl OrbitCameraPose {
    /// Copy position and rotation into a render camera, leaving its
    /// projection untouched.
    pub fn apply_to(&self, camera: &mut Camera) {
        camera.position = self.position;
        camera.rotation = self.rotation;
    }
}

impl Default for OrbitCameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Offset of the camera from the player for a polar angle `phi` (from +Y),
/// an azimuth `theta` (from +Z toward +X) and a distance.
pub fn spherical_offset(phi: f32, theta: f32, distance: f32) -> Vec3 {
    let radius = phi.sin() * distance;
    Vec3::new(radius * theta.sin(), phi.cos() * distance, radius * theta.cos())
}

/// Raise `position` to `elevation + clearance` when the ground under its
/// planar coordinates is known and too close. Positions above that height,
/// or over ungenerated terrain, are returned unchanged.
pub fn clamp_to_ground<Q: TopologyQuery + ?Sized>(
    position: Vec3,
    topology: &Q,
    clearance: f32,
) -> Vec3 {
    match topology.elevation_at(position.x, position.z) {
        Some(elevation) if position.y < elevation + clearance => {
            Vec3::new(position.x, elevation + clearance, position.z)
        }
        _ => position,
    }
}

/// Orbit camera state. Angles persist across activate/deactivate cycles.
///
/// A `distance` of zero puts the camera on the player; callers must not
/// configure that.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    config: OrbitCameraConfig,
    active: bool,
    phi: f32,
    theta: f32,
    pose: OrbitCameraPose,
}

impl OrbitCamera {
    /// Inverted phi limits are swapped. Non-finite limits fall back to the
    /// defaults.
    pub fn new(mut config: OrbitCameraConfig) -> Self {
        if !(config.phi_min.is_finite() && config.phi_max.is_finite()) {
            let defaults = OrbitCameraConfig::default();
            tracing::warn!(
                "Non-finite phi limits [{}, {}], using [{}, {}]",
                config.phi_min,
                config.phi_max,
                defaults.phi_min,
                defaults.phi_max
            );
            config.phi_min = defaults.phi_min;
            config.phi_max = defaults.phi_max;
        } else if config.phi_min > config.phi_max {
            tracing::warn!(
                "Inverted phi limits [{}, {}], swapping",
                config.phi_min,
                config.phi_max
            );
            std::mem::swap(&mut config.phi_min, &mut config.phi_max);
        }
        let phi = config.phi.clamp(config.phi_min, config.phi_max);
        let theta = config.theta;
        Self {
            config,
            active: false,
            phi,
            theta,
            pose: OrbitCameraPose::default(),
        }
    }

    pub fn activate(&mut self) {
        if !self.active {
            tracing::debug!("Orbit camera activated");
        }
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        if self.active {
            tracing::debug!("Orbit camera deactivated");
        }
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn phi(&self) -> f32 {
        self.phi
    }

    pub fn theta(&self) -> f32 {
        self.theta
    }

    pub fn config(&self) -> &OrbitCameraConfig {
        &self.config
    }

    /// Last resolved pose. Unchanged while inactive.
    pub fn pose(&self) -> OrbitCameraPose {
        self.pose
    }

    /// Advance one frame. No-op while inactive.
    pub fn update<Q: TopologyQuery + ?Sized>(
        &mut self,
        pointer: &PointerSnapshot,
        player_position: Vec3,
        topology: &Q,
    ) {
        if !self.active {
            return;
        }

        if pointer.is_dragging() && pointer.delta != glam::Vec2::ZERO {
            self.theta -= pointer.delta.x * self.config.sensitivity;
            self.phi -= pointer.delta.y * self.config.sensitivity;
            self.phi = self.phi.clamp(self.config.phi_min, self.config.phi_max);
        }

        let position =
            player_position + spherical_offset(self.phi, self.theta, self.config.distance);
        let target = player_position + Vec3::Y * self.config.above_offset;

        // Orientation is resolved from the unclamped position.
        let rotation = look_at_rotation(position, target, Vec3::Y);
        let position = clamp_to_ground(position, topology, self.config.ground_clearance);

        self.pose = OrbitCameraPose { position, rotation };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use vista_terrain::{HeightPatch, PatchTopology};

    struct Flat(Option<f32>);

    impl TopologyQuery for Flat {
        fn elevation_at(&self, _x: f32, _z: f32) -> Option<f32> {
            self.0
        }
    }

    fn drag(delta: Vec2) -> PointerSnapshot {
        PointerSnapshot {
            down: true,
            locked: false,
            delta,
        }
    }

    fn active_camera() -> OrbitCamera {
        let mut camera = OrbitCamera::new(OrbitCameraConfig::default());
        camera.activate();
        camera
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_spherical_offset_on_equator() {
        assert!(approx(spherical_offset(PI / 2.0, 0.0, 15.0), Vec3::new(0.0, 0.0, 15.0)));
    }

    #[test]
    fn test_spherical_offset_at_pole_ignores_theta() {
        for theta in [0.0, 1.0, -2.5, 7.0] {
            assert!(approx(spherical_offset(0.0, theta, 15.0), Vec3::new(0.0, 15.0, 0.0)));
        }
    }

    #[test]
    fn test_phi_clamps_on_overshoot_and_undershoot() {
        let config = OrbitCameraConfig::default();
        let mut camera = active_camera();
        // Dragging up lowers phi.
        camera.update(&drag(Vec2::new(0.0, 10.0)), Vec3::ZERO, &Flat(None));
        assert_eq!(camera.phi(), config.phi_min);
        camera.update(&drag(Vec2::new(0.0, -10.0)), Vec3::ZERO, &Flat(None));
        assert_eq!(camera.phi(), config.phi_max);

        for dy in [-3.0, -0.4, 0.05, 0.7, 2.0] {
            camera.update(&drag(Vec2::new(0.0, dy)), Vec3::ZERO, &Flat(None));
            assert!((config.phi_min..=config.phi_max).contains(&camera.phi()));
        }
    }

    #[test]
    fn test_inverted_phi_limits_are_swapped() {
        let mut camera = OrbitCamera::new(OrbitCameraConfig {
            phi_min: 2.0,
            phi_max: 0.5,
            ..OrbitCameraConfig::default()
        });
        assert_eq!(camera.config().phi_min, 0.5);
        assert_eq!(camera.config().phi_max, 2.0);
        assert!((0.5..=2.0).contains(&camera.phi()));

        camera.activate();
        camera.update(&drag(Vec2::new(0.0, -10.0)), Vec3::ZERO, &Flat(None));
        assert_eq!(camera.phi(), 2.0);
    }

    #[test]
    fn test_non_finite_phi_limits_use_defaults() {
        let camera = OrbitCamera::new(OrbitCameraConfig {
            phi_min: f32::NAN,
            ..OrbitCameraConfig::default()
        });
        let defaults = OrbitCameraConfig::default();
        assert_eq!(camera.config().phi_min, defaults.phi_min);
        assert_eq!(camera.config().phi_max, defaults.phi_max);
    }

    #[test]
    fn test_theta_is_never_clamped() {
        let mut camera = active_camera();
        let start = camera.theta();
        for _ in 0..10 {
            camera.update(&drag(Vec2::new(-1.0, 0.0)), Vec3::ZERO, &Flat(None));
        }
        assert!((camera.theta() - (start + 20.0)).abs() < 1e-4);
    }

    #[test]
    fn test_motion_without_drag_is_ignored() {
        let mut camera = active_camera();
        let (phi, theta) = (camera.phi(), camera.theta());
        let pointer = PointerSnapshot {
            delta: Vec2::new(0.3, 0.3),
            ..PointerSnapshot::default()
        };
        camera.update(&pointer, Vec3::ZERO, &Flat(None));
        assert_eq!((camera.phi(), camera.theta()), (phi, theta));

        let locked = PointerSnapshot {
            locked: true,
            ..pointer
        };
        camera.update(&locked, Vec3::ZERO, &Flat(None));
        assert!((camera.theta() - (theta - 0.6)).abs() < 1e-6);
    }

    #[test]
    fn test_inactive_update_is_noop() {
        let mut camera = OrbitCamera::new(OrbitCameraConfig::default());
        camera.update(&drag(Vec2::new(0.5, 0.5)), Vec3::new(5.0, 5.0, 5.0), &Flat(None));
        assert_eq!(camera.pose(), OrbitCameraPose::default());
        assert_eq!(camera.phi(), OrbitCameraConfig::default().phi);
    }

    #[test]
    fn test_angles_persist_across_activation_cycles() {
        let mut camera = active_camera();
        camera.update(&drag(Vec2::new(0.2, 0.1)), Vec3::ZERO, &Flat(None));
        let (phi, theta) = (camera.phi(), camera.theta());
        camera.deactivate();
        camera.activate();
        camera.update(&PointerSnapshot::default(), Vec3::ZERO, &Flat(None));
        assert_eq!((camera.phi(), camera.theta()), (phi, theta));
    }

    #[test]
    fn test_pose_follows_player_and_looks_at_head() {
        let mut camera = active_camera();
        let player = Vec3::new(10.0, 3.0, -7.0);
        camera.update(&PointerSnapshot::default(), player, &Flat(None));
        let pose = camera.pose();

        let config = OrbitCameraConfig::default();
        let expected = player + spherical_offset(config.phi, config.theta, config.distance);
        assert!(approx(pose.position, expected));

        let target = player + Vec3::new(0.0, config.above_offset, 0.0);
        let forward = pose.rotation * Vec3::NEG_Z;
        assert!(approx(forward, (target - pose.position).normalize()));
    }

    #[test]
    fn test_ground_clamp_raises_low_camera() {
        let mut camera = active_camera();
        camera.update(&PointerSnapshot::default(), Vec3::ZERO, &Flat(Some(50.0)));
        assert!((camera.pose().position.y - 51.0).abs() < 1e-5);
    }

    #[test]
    fn test_ground_clamp_keeps_high_camera() {
        let mut camera = active_camera();
        camera.update(&PointerSnapshot::default(), Vec3::ZERO, &Flat(None));
        let free = camera.pose().position;
        camera.update(&PointerSnapshot::default(), Vec3::ZERO, &Flat(Some(-100.0)));
        assert_eq!(camera.pose().position, free);
    }

    #[test]
    fn test_ground_clamp_monotonic() {
        for elevation in [-20.0f32, -1.0, 0.0, 0.5, 1.9, 3.0, 40.0] {
            for y in [-30.0f32, 0.0, 1.0, 2.0, 10.0, 60.0] {
                let position = Vec3::new(1.0, y, 2.0);
                let clamped = clamp_to_ground(position, &Flat(Some(elevation)), 1.0);
                assert!(clamped.y >= elevation + 1.0);
                if y > elevation + 1.0 {
                    assert_eq!(clamped, position);
                }
                assert_eq!((clamped.x, clamped.z), (position.x, position.z));
            }
        }
    }

    #[test]
    fn test_clamp_uses_patch_topology() {
        let mut topology = PatchTopology::new();
        topology.insert(
            0,
            HeightPatch {
                origin_x: -100.0,
                origin_z: -100.0,
                size: 200.0,
                resolution: 2,
                heights: vec![30.0; 4],
            },
        );
        let mut camera = active_camera();
        camera.update(&PointerSnapshot::default(), Vec3::ZERO, &topology);
        assert!((camera.pose().position.y - 31.0).abs() < 1e-4);

        // Outside every patch the camera passes through.
        camera.update(&PointerSnapshot::default(), Vec3::new(1000.0, 0.0, 0.0), &topology);
        assert!(camera.pose().position.y < 31.0);
    }

    #[test]
    fn test_apply_to_camera_keeps_projection() {
        let mut render_camera = Camera::default();
        let pose = OrbitCameraPose {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_y(0.5),
        };
        pose.apply_to(&mut render_camera);
        assert_eq!(render_camera.position, pose.position);
        assert_eq!(render_camera.rotation, pose.rotation);
        assert_eq!(render_camera.fov_y, Camera::default().fov_y);
    }
}
