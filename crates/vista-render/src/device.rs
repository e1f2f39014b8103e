//! The [`RenderDevice`] seam between world logic and a GPU backend.

use crate::camera::Camera;
use crate::error::RenderError;
use crate::geometry::Geometry;
use crate::handle::{GeometryHandle, ProgramHandle, RenderTargetHandle, TextureHandle};
use crate::program::ProgramDescriptor;
use crate::scene::Scene;
use crate::target::{RenderTarget, RenderTargetDescriptor};
use crate::texture::DataTextureDescriptor;

/// Allocation counters kept by every device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceStats {
    pub geometries_created: u64,
    pub geometries_disposed: u64,
    pub textures_created: u64,
    pub textures_disposed: u64,
    pub targets_created: u64,
    pub programs_created: u64,
    /// Dispose calls that named an unknown or already-disposed handle.
    pub invalid_disposals: u64,
    pub passes_rendered: u64,
}

impl ResourceStats {
    pub fn live_geometries(&self) -> u64 {
        self.geometries_created - self.geometries_disposed
    }

    pub fn live_textures(&self) -> u64 {
        self.textures_created - self.textures_disposed
    }
}

/// Owner of GPU-side resources.
///
/// Creation validates its input and returns a handle. Disposal of a handle
/// the device does not know is never fatal: it is logged and counted in
/// [`ResourceStats::invalid_disposals`].
pub trait RenderDevice {
    fn create_geometry(&mut self, geometry: &Geometry) -> GeometryHandle;

    fn dispose_geometry(&mut self, handle: GeometryHandle);

    fn create_data_texture(
        &mut self,
        desc: &DataTextureDescriptor,
    ) -> Result<TextureHandle, RenderError>;

    fn dispose_texture(&mut self, handle: TextureHandle);

    fn create_render_target(&mut self, desc: &RenderTargetDescriptor) -> RenderTarget;

    /// Reissue the attachments at a new pixel size. The target's texture
    /// handle keeps referring to the colour output.
    fn resize_render_target(&mut self, target: RenderTargetHandle, width: u32, height: u32);

    fn render_target_size(&self, target: RenderTargetHandle) -> Option<(u32, u32)>;

    fn create_program(&mut self, desc: &ProgramDescriptor) -> Result<ProgramHandle, RenderError>;

    /// Replace the program's uniform block. `bytes` shorter than the block
    /// leaves the tail untouched; longer input is truncated.
    fn write_program_uniforms(&mut self, program: ProgramHandle, bytes: &[u8]);

    /// Bind a texture to one of the program's shared slots.
    fn set_program_texture(&mut self, program: ProgramHandle, slot: u32, texture: TextureHandle);

    /// Clear `target` and draw every visible mesh of `scene` in draw order.
    fn render(&mut self, scene: &Scene, camera: &Camera, target: RenderTargetHandle);

    fn stats(&self) -> ResourceStats;
}
