//! The visible sun: a flat disc in the main scene that always faces the player.

use glam::{Quat, Vec3};
use vista_render::{
    AttributeKind, Geometry, GeometryHandle, Mesh, MeshId, ProgramDescriptor, ProgramHandle,
    RenderDevice, Scene, face_towards_rotation,
};

use crate::SUN_DISC_SHADER_SOURCE;
use crate::error::SkyError;
use crate::uniforms::ColorUniforms;

/// Disc radius as a fraction of its distance from the player.
pub const SUN_RADIUS_FACTOR: f32 = 0.02;
pub const SUN_DISC_SEGMENTS: u32 = 32;

/// Where the disc sits for a player position and sun direction, and the
/// rotation that turns its face toward the player.
pub fn sun_disc_placement(
    player_position: Vec3,
    sun_position: Vec3,
    distance: f32,
) -> (Vec3, Quat) {
    let position = player_position + sun_position * distance;
    let rotation = face_towards_rotation(position, player_position, Vec3::Y);
    (position, rotation)
}

#[derive(Debug)]
pub struct SunDisc {
    program: ProgramHandle,
    geometry: GeometryHandle,
    mesh: MeshId,
    distance: f32,
}

impl SunDisc {
    pub(crate) fn new(
        device: &mut dyn RenderDevice,
        scene: &mut Scene,
        distance: f32,
    ) -> Result<Self, SkyError> {
        let program = device.create_program(&ProgramDescriptor::new(
            "sun-disc",
            SUN_DISC_SHADER_SOURCE,
            &[AttributeKind::Position],
            std::mem::size_of::<ColorUniforms>() as u64,
        ))?;
        device.write_program_uniforms(
            program,
            bytemuck::bytes_of(&ColorUniforms { color: [1.0; 4] }),
        );

        let geometry = device.create_geometry(&Geometry::circle(
            SUN_RADIUS_FACTOR * distance,
            SUN_DISC_SEGMENTS,
        )?);
        let mesh = scene.add(Mesh::new(geometry, program));

        Ok(Self {
            program,
            geometry,
            mesh,
            distance,
        })
    }

    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub(crate) fn update(&self, scene: &mut Scene, player_position: Vec3, sun_position: Vec3) {
        let (position, rotation) = sun_disc_placement(player_position, sun_position, self.distance);
        if let Some(mesh) = scene.get_mut(self.mesh) {
            mesh.transform.position = position;
            mesh.transform.rotation = rotation;
        }
    }

    pub(crate) fn dispose(&mut self, device: &mut dyn RenderDevice, scene: &mut Scene) {
        scene.remove(self.mesh);
        device.dispose_geometry(self.geometry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sun_below_player() {
        let (position, rotation) =
            sun_disc_placement(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0), 1000.0);
        assert_eq!(position, Vec3::new(0.0, -1000.0, 0.0));
        assert!(rotation.is_finite());
        let facing = rotation * Vec3::Z;
        assert!((facing - Vec3::Y).length() < 1e-3, "disc faces {facing}");
    }

    #[test]
    fn test_placement_follows_player() {
        let player = Vec3::new(10.0, 2.0, -4.0);
        let sun = Vec3::new(0.6, 0.8, 0.0);
        let (position, rotation) = sun_disc_placement(player, sun, 1000.0);
        assert!((position - Vec3::new(610.0, 802.0, -4.0)).length() < 1e-3);
        let facing = rotation * Vec3::Z;
        assert!((facing - (player - position).normalize()).length() < 1e-4);
    }
}
