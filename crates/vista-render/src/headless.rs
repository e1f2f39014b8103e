//! Bookkeeping-only [`RenderDevice`] used for tests and GPU-less runs.
//!
//! Every call is validated exactly like the GPU backend would, and every
//! render pass is recorded as a [`PassRecord`] so that callers can assert on
//! draw order, bound textures and uniform contents.

use glam::{Mat4, Quat, Vec3};
use rustc_hash::FxHashMap;

use crate::camera::Camera;
use crate::device::{RenderDevice, ResourceStats};
use crate::error::RenderError;
use crate::geometry::Geometry;
use crate::handle::{
    GeometryHandle, IdAllocator, MeshId, ProgramHandle, RenderTargetHandle, TextureHandle,
};
use crate::program::ProgramDescriptor;
use crate::scene::Scene;
use crate::target::{RenderTarget, RenderTargetDescriptor};
use crate::texture::DataTextureDescriptor;

/// One recorded draw call.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawRecord {
    pub mesh: MeshId,
    pub geometry: GeometryHandle,
    pub program: ProgramHandle,
    /// Texture bound to the per-mesh slot for this draw.
    pub mesh_texture: Option<TextureHandle>,
    /// Shared program textures at draw time.
    pub program_textures: Vec<Option<TextureHandle>>,
    /// Program uniform block at draw time.
    pub uniforms: Vec<u8>,
    pub model: Mat4,
    pub index_count: usize,
}

/// The most recent pass rendered into a target.
#[derive(Clone, Debug, PartialEq)]
pub struct PassRecord {
    pub width: u32,
    pub height: u32,
    pub camera_position: Vec3,
    pub camera_rotation: Quat,
    pub draws: Vec<DrawRecord>,
}

#[derive(Debug)]
struct TextureRecord {
    width: u32,
    height: u32,
    /// Set for the colour output of a render target.
    owner: Option<RenderTargetHandle>,
}

#[derive(Debug)]
struct TargetRecord {
    width: u32,
    height: u32,
    texture: TextureHandle,
}

#[derive(Debug)]
struct ProgramRecord {
    desc: ProgramDescriptor,
    uniforms: Vec<u8>,
    textures: Vec<Option<TextureHandle>>,
}

#[derive(Debug, Default)]
pub struct HeadlessDevice {
    ids: IdAllocator,
    geometries: FxHashMap<GeometryHandle, Geometry>,
    textures: FxHashMap<TextureHandle, TextureRecord>,
    targets: FxHashMap<RenderTargetHandle, TargetRecord>,
    programs: FxHashMap<ProgramHandle, ProgramRecord>,
    passes: FxHashMap<RenderTargetHandle, PassRecord>,
    stats: ResourceStats,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// CPU copy of a live geometry.
    pub fn geometry(&self, handle: GeometryHandle) -> Option<&Geometry> {
        self.geometries.get(&handle)
    }

    pub fn has_texture(&self, handle: TextureHandle) -> bool {
        self.textures.contains_key(&handle)
    }

    pub fn texture_size(&self, handle: TextureHandle) -> Option<(u32, u32)> {
        self.textures.get(&handle).map(|t| (t.width, t.height))
    }

    pub fn program_descriptor(&self, program: ProgramHandle) -> Option<&ProgramDescriptor> {
        self.programs.get(&program).map(|p| &p.desc)
    }

    pub fn program_uniforms(&self, program: ProgramHandle) -> Option<&[u8]> {
        self.programs.get(&program).map(|p| p.uniforms.as_slice())
    }

    pub fn program_textures(&self, program: ProgramHandle) -> Option<&[Option<TextureHandle>]> {
        self.programs.get(&program).map(|p| p.textures.as_slice())
    }

    /// The last pass rendered into `target`.
    pub fn last_pass(&self, target: RenderTargetHandle) -> Option<&PassRecord> {
        self.passes.get(&target)
    }
}

impl RenderDevice for HeadlessDevice {
    fn create_geometry(&mut self, geometry: &Geometry) -> GeometryHandle {
        let handle = GeometryHandle(self.ids.next());
        self.geometries.insert(handle, geometry.clone());
        self.stats.geometries_created += 1;
        handle
    }

    fn dispose_geometry(&mut self, handle: GeometryHandle) {
        if self.geometries.remove(&handle).is_some() {
            self.stats.geometries_disposed += 1;
        } else {
            log::warn!("Dispose of unknown geometry {handle}");
            self.stats.invalid_disposals += 1;
        }
    }

    fn create_data_texture(
        &mut self,
        desc: &DataTextureDescriptor,
    ) -> Result<TextureHandle, RenderError> {
        desc.validate()?;
        let handle = TextureHandle(self.ids.next());
        self.textures.insert(
            handle,
            TextureRecord {
                width: desc.width,
                height: desc.height,
                owner: None,
            },
        );
        self.stats.textures_created += 1;
        Ok(handle)
    }

    fn dispose_texture(&mut self, handle: TextureHandle) {
        match self.textures.get(&handle) {
            Some(TextureRecord {
                owner: Some(target),
                ..
            }) => {
                log::warn!("Texture {handle} belongs to {target} and cannot be disposed alone");
                self.stats.invalid_disposals += 1;
            }
            Some(_) => {
                self.textures.remove(&handle);
                self.stats.textures_disposed += 1;
            }
            None => {
                log::warn!("Dispose of unknown texture {handle}");
                self.stats.invalid_disposals += 1;
            }
        }
    }

    fn create_render_target(&mut self, desc: &RenderTargetDescriptor) -> RenderTarget {
        let handle = RenderTargetHandle(self.ids.next());
        let texture = TextureHandle(self.ids.next());
        self.textures.insert(
            texture,
            TextureRecord {
                width: desc.width,
                height: desc.height,
                owner: Some(handle),
            },
        );
        self.targets.insert(
            handle,
            TargetRecord {
                width: desc.width,
                height: desc.height,
                texture,
            },
        );
        self.stats.targets_created += 1;
        log::debug!(
            "Created render target '{}' ({}x{})",
            desc.label,
            desc.width,
            desc.height
        );
        RenderTarget { handle, texture }
    }

    fn resize_render_target(&mut self, target: RenderTargetHandle, width: u32, height: u32) {
        let Some(record) = self.targets.get_mut(&target) else {
            log::warn!("Resize of unknown render target {target}");
            return;
        };
        record.width = width;
        record.height = height;
        if let Some(texture) = self.textures.get_mut(&record.texture) {
            texture.width = width;
            texture.height = height;
        }
    }

    fn render_target_size(&self, target: RenderTargetHandle) -> Option<(u32, u32)> {
        self.targets.get(&target).map(|t| (t.width, t.height))
    }

    fn create_program(&mut self, desc: &ProgramDescriptor) -> Result<ProgramHandle, RenderError> {
        desc.validate()?;
        let handle = ProgramHandle(self.ids.next());
        self.programs.insert(
            handle,
            ProgramRecord {
                desc: desc.clone(),
                uniforms: vec![0; desc.uniform_size as usize],
                textures: vec![None; desc.texture_slots as usize],
            },
        );
        self.stats.programs_created += 1;
        Ok(handle)
    }

    fn write_program_uniforms(&mut self, program: ProgramHandle, bytes: &[u8]) {
        let Some(record) = self.programs.get_mut(&program) else {
            log::warn!("Uniform write to unknown program {program}");
            return;
        };
        let len = bytes.len().min(record.uniforms.len());
        record.uniforms[..len].copy_from_slice(&bytes[..len]);
    }

    fn set_program_texture(&mut self, program: ProgramHandle, slot: u32, texture: TextureHandle) {
        let Some(record) = self.programs.get_mut(&program) else {
            log::warn!("Texture bind on unknown program {program}");
            return;
        };
        match record.textures.get_mut(slot as usize) {
            Some(entry) => *entry = Some(texture),
            None => log::warn!(
                "Program '{}' has no texture slot {slot}",
                record.desc.label
            ),
        }
    }

    fn render(&mut self, scene: &Scene, camera: &Camera, target: RenderTargetHandle) {
        let Some(target_record) = self.targets.get(&target) else {
            log::warn!("Render into unknown target {target}");
            return;
        };

        let geometries = &self.geometries;
        let draws = scene
            .visible_draws(camera, |handle| geometries.get(&handle).map(Geometry::bounds))
            .into_iter()
            .filter_map(|(id, mesh)| {
                let Some(program) = self.programs.get(&mesh.program) else {
                    log::warn!("Mesh {id} references unknown program {}", mesh.program);
                    return None;
                };
                let index_count = geometries.get(&mesh.geometry)?.index_count();
                Some(DrawRecord {
                    mesh: id,
                    geometry: mesh.geometry,
                    program: mesh.program,
                    mesh_texture: if program.desc.mesh_texture {
                        mesh.texture
                    } else {
                        None
                    },
                    program_textures: program.textures.clone(),
                    uniforms: program.uniforms.clone(),
                    model: mesh.transform.matrix(),
                    index_count,
                })
            })
            .collect();

        let pass = PassRecord {
            width: target_record.width,
            height: target_record.height,
            camera_position: camera.position,
            camera_rotation: camera.rotation,
            draws,
        };
        self.passes.insert(target, pass);
        self.stats.passes_rendered += 1;
    }

    fn stats(&self) -> ResourceStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::AttributeKind;
    use crate::scene::Mesh;

    const ATTRS: &[AttributeKind] = &[AttributeKind::Position, AttributeKind::Uv];

    fn program_desc() -> ProgramDescriptor {
        ProgramDescriptor {
            texture_slots: 1,
            mesh_texture: true,
            ..ProgramDescriptor::new("test", "", ATTRS, 16)
        }
    }

    fn texture(device: &mut HeadlessDevice) -> TextureHandle {
        device
            .create_data_texture(&DataTextureDescriptor::new(
                "t",
                1,
                1,
                vec![1.0; 4].into(),
            ))
            .unwrap()
    }

    #[test]
    fn test_double_dispose_is_counted_not_fatal() {
        let mut device = HeadlessDevice::new();
        let handle = device.create_geometry(&Geometry::plane(2.0, 2.0).unwrap());
        device.dispose_geometry(handle);
        device.dispose_geometry(handle);
        let stats = device.stats();
        assert_eq!(stats.geometries_disposed, 1);
        assert_eq!(stats.invalid_disposals, 1);
        assert_eq!(stats.live_geometries(), 0);
    }

    #[test]
    fn test_target_texture_cannot_be_disposed_alone() {
        let mut device = HeadlessDevice::new();
        let target = device.create_render_target(&RenderTargetDescriptor::new("rt", 4, 4));
        device.dispose_texture(target.texture);
        assert!(device.has_texture(target.texture));
        assert_eq!(device.stats().invalid_disposals, 1);
    }

    #[test]
    fn test_resize_keeps_texture_handle() {
        let mut device = HeadlessDevice::new();
        let target = device.create_render_target(&RenderTargetDescriptor::new("rt", 4, 4));
        device.resize_render_target(target.handle, 128, 72);
        assert_eq!(device.render_target_size(target.handle), Some((128, 72)));
        assert_eq!(device.texture_size(target.texture), Some((128, 72)));
    }

    #[test]
    fn test_uniform_write_is_truncated_to_block() {
        let mut device = HeadlessDevice::new();
        let program = device.create_program(&program_desc()).unwrap();
        device.write_program_uniforms(program, &[7u8; 32]);
        assert_eq!(device.program_uniforms(program).unwrap(), &[7u8; 16]);
    }

    #[test]
    fn test_render_records_per_mesh_texture_swap() {
        let mut device = HeadlessDevice::new();
        let program = device.create_program(&program_desc()).unwrap();
        let shared = texture(&mut device);
        device.set_program_texture(program, 0, shared);
        device.set_program_texture(program, 5, shared);

        let geometry = device.create_geometry(&Geometry::plane(2.0, 2.0).unwrap());
        let (t1, t2) = (texture(&mut device), texture(&mut device));

        let mut scene = Scene::new();
        let mut placed = |texture| {
            let mut mesh = Mesh::new(geometry, program).with_texture(texture);
            mesh.transform.position = Vec3::new(0.0, 0.0, -5.0);
            scene.add(mesh)
        };
        let m1 = placed(t1);
        let m2 = placed(t2);

        let target = device.create_render_target(&RenderTargetDescriptor::new("rt", 8, 8));
        device.render(&scene, &Camera::default(), target.handle);

        let pass = device.last_pass(target.handle).unwrap();
        assert_eq!(pass.draws.len(), 2);
        assert_eq!((pass.draws[0].mesh, pass.draws[0].mesh_texture), (m1, Some(t1)));
        assert_eq!((pass.draws[1].mesh, pass.draws[1].mesh_texture), (m2, Some(t2)));
        assert_eq!(pass.draws[0].program_textures, vec![Some(shared)]);
        assert_eq!(pass.draws[0].index_count, 6);
        assert_eq!(device.stats().passes_rendered, 1);
    }

    #[test]
    fn test_render_skips_disposed_geometry() {
        let mut device = HeadlessDevice::new();
        let program = device.create_program(&program_desc()).unwrap();
        let geometry = device.create_geometry(&Geometry::plane(2.0, 2.0).unwrap());
        device.dispose_geometry(geometry);

        let mut scene = Scene::new();
        scene.add(Mesh {
            frustum_culled: false,
            ..Mesh::new(geometry, program)
        });
        let target = device.create_render_target(&RenderTargetDescriptor::new("rt", 8, 8));
        device.render(&scene, &Camera::default(), target.handle);
        assert!(device.last_pass(target.handle).unwrap().draws.is_empty());
    }

    #[test]
    fn test_invalid_texture_is_rejected() {
        let mut device = HeadlessDevice::new();
        let result =
            device.create_data_texture(&DataTextureDescriptor::new("t", 2, 2, vec![0.0; 3].into()));
        assert!(result.is_err());
        assert_eq!(device.stats().textures_created, 0);
    }
}
