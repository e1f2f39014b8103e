//! The inverted sphere rendered by the compositor's private pass.

use std::ops::RangeInclusive;

use vista_render::{
    AttributeKind, FaceSide, Geometry, GeometryHandle, Mesh, MeshId, ProgramDescriptor,
    ProgramHandle, RenderDevice, Scene,
};

use crate::SKY_SPHERE_SHADER_SOURCE;
use crate::error::SkyError;
use crate::uniforms::SkyUniforms;

#[derive(Debug)]
pub struct SkyDome {
    program: ProgramHandle,
    geometry: GeometryHandle,
    mesh: MeshId,
    width_segments: u32,
    height_segments: u32,
}

impl SkyDome {
    pub const RADIUS: f32 = 10.0;
    /// Allowed range for both segment counts.
    pub const SEGMENTS_RANGE: RangeInclusive<u32> = 4..=512;

    pub(crate) fn new(
        device: &mut dyn RenderDevice,
        scene: &mut Scene,
        width_segments: u32,
        height_segments: u32,
    ) -> Result<Self, SkyError> {
        let program = device.create_program(&ProgramDescriptor {
            side: FaceSide::Back,
            ..ProgramDescriptor::new(
                "sky-sphere",
                SKY_SPHERE_SHADER_SOURCE,
                &[AttributeKind::Position],
                std::mem::size_of::<SkyUniforms>() as u64,
            )
        })?;

        let (width_segments, height_segments) = clamp_segments(width_segments, height_segments);
        let sphere = Geometry::sphere(Self::RADIUS, width_segments, height_segments)?;
        let geometry = device.create_geometry(&sphere);
        let mesh = scene.add(Mesh::new(geometry, program));

        Ok(Self {
            program,
            geometry,
            mesh,
            width_segments,
            height_segments,
        })
    }

    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    pub fn geometry(&self) -> GeometryHandle {
        self.geometry
    }

    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    /// `(width_segments, height_segments)` of the current sphere.
    pub fn segments(&self) -> (u32, u32) {
        (self.width_segments, self.height_segments)
    }

    pub(crate) fn write_uniforms(&self, device: &mut dyn RenderDevice, uniforms: &SkyUniforms) {
        device.write_program_uniforms(self.program, bytemuck::bytes_of(uniforms));
    }

    /// Replace the sphere with one of a new resolution. Segment counts are
    /// clamped to [`SEGMENTS_RANGE`](Self::SEGMENTS_RANGE).
    pub(crate) fn rebuild(
        &mut self,
        device: &mut dyn RenderDevice,
        scene: &mut Scene,
        width_segments: u32,
        height_segments: u32,
    ) -> Result<(), SkyError> {
        let (width_segments, height_segments) = clamp_segments(width_segments, height_segments);
        let sphere = Geometry::sphere(Self::RADIUS, width_segments, height_segments)?;

        device.dispose_geometry(self.geometry);
        self.geometry = device.create_geometry(&sphere);
        if let Some(mesh) = scene.get_mut(self.mesh) {
            mesh.geometry = self.geometry;
        }
        self.width_segments = width_segments;
        self.height_segments = height_segments;
        tracing::debug!("Rebuilt sky sphere at {width_segments}x{height_segments}");
        Ok(())
    }

    pub(crate) fn dispose(&mut self, device: &mut dyn RenderDevice, scene: &mut Scene) {
        scene.remove(self.mesh);
        device.dispose_geometry(self.geometry);
    }
}

fn clamp_segments(width: u32, height: u32) -> (u32, u32) {
    let range = SkyDome::SEGMENTS_RANGE;
    let clamped = (
        width.clamp(*range.start(), *range.end()),
        height.clamp(*range.start(), *range.end()),
    );
    if clamped != (width, height) {
        tracing::warn!(
            "Sky sphere segments {width}x{height} clamped to {}x{}",
            clamped.0,
            clamped.1
        );
    }
    clamped
}
