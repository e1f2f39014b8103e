//! Screen background quad sampling the compositor output.

use vista_render::{
    AttributeKind, Geometry, GeometryHandle, Mesh, MeshId, ProgramDescriptor, ProgramHandle,
    RenderDevice, Scene, TextureHandle,
};

use crate::SKY_BACKGROUND_SHADER_SOURCE;
use crate::error::SkyError;
use crate::uniforms::ColorUniforms;

/// Program texture slot holding the sky image.
pub const SKY_TEXTURE_SLOT: u32 = 0;

#[derive(Debug)]
pub struct SkyBackground {
    program: ProgramHandle,
    geometry: GeometryHandle,
    mesh: MeshId,
}

impl SkyBackground {
    /// Draws before anything else in the main scene.
    pub const RENDER_ORDER: i32 = i32::MIN;

    pub(crate) fn new(
        device: &mut dyn RenderDevice,
        scene: &mut Scene,
        sky_texture: TextureHandle,
    ) -> Result<Self, SkyError> {
        let program = device.create_program(&ProgramDescriptor {
            texture_slots: 1,
            depth_test: false,
            depth_write: false,
            ..ProgramDescriptor::new(
                "sky-background",
                SKY_BACKGROUND_SHADER_SOURCE,
                &[AttributeKind::Position],
                std::mem::size_of::<ColorUniforms>() as u64,
            )
        })?;
        device.write_program_uniforms(
            program,
            bytemuck::bytes_of(&ColorUniforms { color: [1.0; 4] }),
        );
        device.set_program_texture(program, SKY_TEXTURE_SLOT, sky_texture);

        let geometry = device.create_geometry(&Geometry::plane(2.0, 2.0)?);
        let mesh = scene.add(Mesh {
            frustum_culled: false,
            render_order: Self::RENDER_ORDER,
            ..Mesh::new(geometry, program)
        });

        Ok(Self {
            program,
            geometry,
            mesh,
        })
    }

    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    pub(crate) fn dispose(&mut self, device: &mut dyn RenderDevice, scene: &mut Scene) {
        scene.remove(self.mesh);
        device.dispose_geometry(self.geometry);
    }
}
