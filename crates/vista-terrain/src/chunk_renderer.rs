//! GPU binding of a single chunk record.

use std::sync::Arc;

use vista_render::{
    DataTextureDescriptor, Geometry, GeometryHandle, Mesh, MeshId, ProgramHandle, RenderDevice,
    Scene, TextureFilter, TextureHandle, TextureWrap,
};

use crate::chunk_record::{ChunkId, ChunkRecord};
use crate::error::TerrainError;

/// Lifecycle of a [`TerrainChunk`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkState {
    /// Waiting for the first `Ready`; nothing is allocated.
    Pending,
    /// Geometry, texture and mesh are live.
    Built,
    /// Retired. Further events are ignored.
    Disposed,
}

/// Resources the chunk needs from its owning set while handling an event.
pub(crate) struct ChunkContext<'a> {
    pub device: &'a mut dyn RenderDevice,
    pub scene: &'a mut Scene,
    pub program: ProgramHandle,
    pub segments: u32,
}

/// One chunk's geometry, texture and mesh.
///
/// The first build fixes the chunk's `uv` attribute, index buffer and
/// texture. Rebuilds replace positions and normals only, and share the
/// first build's `uv` and index arrays.
#[derive(Debug)]
pub struct TerrainChunk {
    id: ChunkId,
    state: ChunkState,
    geometry: Option<GeometryHandle>,
    texture: Option<TextureHandle>,
    mesh: Option<MeshId>,
    uv: Option<Arc<[f32]>>,
    indices: Option<Arc<[u32]>>,
    rebuilds: u32,
}

impl TerrainChunk {
    pub fn new(id: ChunkId) -> Self {
        Self {
            id,
            state: ChunkState::Pending,
            geometry: None,
            texture: None,
            mesh: None,
            uv: None,
            indices: None,
            rebuilds: 0,
        }
    }

    pub fn id(&self) -> ChunkId {
        self.id
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    pub fn is_created(&self) -> bool {
        self.state == ChunkState::Built
    }

    pub fn geometry(&self) -> Option<GeometryHandle> {
        self.geometry
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    pub fn mesh(&self) -> Option<MeshId> {
        self.mesh
    }

    /// `uv` array fixed by the first build.
    pub fn uv(&self) -> Option<&Arc<[f32]>> {
        self.uv.as_ref()
    }

    /// Index array fixed by the first build.
    pub fn indices(&self) -> Option<&Arc<[u32]>> {
        self.indices.as_ref()
    }

    pub fn rebuild_count(&self) -> u32 {
        self.rebuilds
    }

    /// Build on the first call, rebuild the surface afterwards. A rejected
    /// record leaves the chunk exactly as it was.
    pub(crate) fn ready(
        &mut self,
        record: &ChunkRecord,
        ctx: &mut ChunkContext<'_>,
    ) -> Result<(), TerrainError> {
        match self.state {
            ChunkState::Pending => self.build(record, ctx),
            ChunkState::Built => self.rebuild(record, ctx),
            ChunkState::Disposed => {
                tracing::debug!("Ignoring ready for disposed {}", self.id);
                Ok(())
            }
        }
    }

    fn build(
        &mut self,
        record: &ChunkRecord,
        ctx: &mut ChunkContext<'_>,
    ) -> Result<(), TerrainError> {
        record.validate(ctx.segments)?;

        let uv = Arc::clone(&record.uv);
        let indices = Arc::clone(&record.indices);
        let geometry = Geometry::new(Arc::clone(&record.positions), Arc::clone(&indices))?
            .with_normals(Arc::clone(&record.normals))?
            .with_uvs(Arc::clone(&uv))?;

        let texture_desc = DataTextureDescriptor::new(
            "terrain-chunk",
            ctx.segments,
            ctx.segments,
            Arc::clone(&record.texture),
        )
        .with_flip_y(false)
        .with_filter(TextureFilter::Linear)
        .with_wrap(TextureWrap::ClampToEdge);
        let texture = ctx.device.create_data_texture(&texture_desc)?;
        let geometry = ctx.device.create_geometry(&geometry);

        let mesh = ctx
            .scene
            .add(Mesh::new(geometry, ctx.program).with_texture(texture));

        self.geometry = Some(geometry);
        self.texture = Some(texture);
        self.mesh = Some(mesh);
        self.uv = Some(uv);
        self.indices = Some(indices);
        self.state = ChunkState::Built;
        tracing::debug!(
            "Built {} ({} vertices, {} triangles)",
            self.id,
            record.vertex_count(),
            record.indices.len() / 3
        );
        Ok(())
    }

    fn rebuild(
        &mut self,
        record: &ChunkRecord,
        ctx: &mut ChunkContext<'_>,
    ) -> Result<(), TerrainError> {
        let (Some(uv), Some(indices), Some(mesh)) = (&self.uv, &self.indices, self.mesh) else {
            return Ok(());
        };
        record.validate_surface()?;
        let expected = uv.len() / 2;
        if record.vertex_count() != expected {
            return Err(TerrainError::TopologyChanged {
                actual: record.vertex_count(),
                expected,
            });
        }
        let replacement = Geometry::new(Arc::clone(&record.positions), Arc::clone(indices))?
            .with_normals(Arc::clone(&record.normals))?
            .with_uvs(Arc::clone(uv))?;

        // Dispose the old buffers before allocating the replacement.
        if let Some(old) = self.geometry.take() {
            ctx.device.dispose_geometry(old);
        }
        let geometry = ctx.device.create_geometry(&replacement);
        if let Some(entry) = ctx.scene.get_mut(mesh) {
            entry.geometry = geometry;
        }
        self.geometry = Some(geometry);
        self.rebuilds += 1;
        tracing::trace!("Rebuilt {} (rebuild #{})", self.id, self.rebuilds);
        Ok(())
    }

    /// Free everything this chunk owns. Safe to call in any state and any
    /// number of times.
    pub fn destroy(&mut self, device: &mut dyn RenderDevice, scene: &mut Scene) {
        if self.state == ChunkState::Built {
            if let Some(mesh) = self.mesh.take() {
                scene.remove(mesh);
            }
            if let Some(geometry) = self.geometry.take() {
                device.dispose_geometry(geometry);
            }
            if let Some(texture) = self.texture.take() {
                device.dispose_texture(texture);
            }
            tracing::debug!("Disposed {}", self.id);
        }
        self.state = ChunkState::Disposed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk_record::tests::grid_record;
    use vista_render::{AttributeKind, HeadlessDevice, ProgramDescriptor};

    const SEGMENTS: u32 = 4;

    struct Fixture {
        device: HeadlessDevice,
        scene: Scene,
        program: ProgramHandle,
    }

    impl Fixture {
        fn new() -> Self {
            let mut device = HeadlessDevice::new();
            let program = device
                .create_program(&ProgramDescriptor {
                    mesh_texture: true,
                    ..ProgramDescriptor::new(
                        "terrain",
                        "",
                        &[AttributeKind::Position, AttributeKind::Normal, AttributeKind::Uv],
                        48,
                    )
                })
                .unwrap();
            Self {
                device,
                scene: Scene::new(),
                program,
            }
        }

        fn ready(
            &mut self,
            chunk: &mut TerrainChunk,
            record: &ChunkRecord,
        ) -> Result<(), TerrainError> {
            let mut ctx = ChunkContext {
                device: &mut self.device,
                scene: &mut self.scene,
                program: self.program,
                segments: SEGMENTS,
            };
            chunk.ready(record, &mut ctx)
        }
    }

    #[test]
    fn test_first_ready_builds_everything() {
        let mut fx = Fixture::new();
        let mut chunk = TerrainChunk::new(ChunkId(1));
        fx.ready(&mut chunk, &grid_record(3, SEGMENTS, 0.0)).unwrap();

        assert_eq!(chunk.state(), ChunkState::Built);
        let mesh = fx.scene.get(chunk.mesh().unwrap()).unwrap();
        assert_eq!(mesh.texture, chunk.texture());
        assert_eq!(mesh.program, fx.program);
        assert_eq!(fx.device.texture_size(chunk.texture().unwrap()), Some((4, 4)));
        let geometry = fx.device.geometry(chunk.geometry().unwrap()).unwrap();
        assert!(geometry.normals().is_some() && geometry.uvs().is_some());
    }

    #[test]
    fn test_destroy_twice_is_noop() {
        let mut fx = Fixture::new();
        let mut chunk = TerrainChunk::new(ChunkId(1));
        fx.ready(&mut chunk, &grid_record(3, SEGMENTS, 0.0)).unwrap();

        chunk.destroy(&mut fx.device, &mut fx.scene);
        chunk.destroy(&mut fx.device, &mut fx.scene);

        let stats = fx.device.stats();
        assert_eq!(stats.geometries_disposed, 1);
        assert_eq!(stats.textures_disposed, 1);
        assert_eq!(stats.invalid_disposals, 0);
        assert!(fx.scene.is_empty());
        assert_eq!(chunk.state(), ChunkState::Disposed);
    }

    #[test]
    fn test_destroy_before_ready_frees_nothing() {
        let mut fx = Fixture::new();
        let mut chunk = TerrainChunk::new(ChunkId(1));
        chunk.destroy(&mut fx.device, &mut fx.scene);
        chunk.destroy(&mut fx.device, &mut fx.scene);
        assert_eq!(fx.device.stats(), Default::default());

        // A late ready after retirement allocates nothing either.
        fx.ready(&mut chunk, &grid_record(3, SEGMENTS, 0.0)).unwrap();
        assert_eq!(fx.device.stats().geometries_created, 0);
    }

    #[test]
    fn test_rebuilds_keep_first_uv_and_indices() {
        let mut fx = Fixture::new();
        let mut chunk = TerrainChunk::new(ChunkId(1));
        let first = grid_record(3, SEGMENTS, 0.0);
        fx.ready(&mut chunk, &first).unwrap();

        for i in 1..=5 {
            // Each regeneration hands over fresh arrays for every buffer.
            let next = grid_record(3, SEGMENTS, i as f32);
            fx.ready(&mut chunk, &next).unwrap();

            let geometry = fx.device.geometry(chunk.geometry().unwrap()).unwrap();
            assert!(Arc::ptr_eq(geometry.uvs().unwrap(), &first.uv));
            assert!(Arc::ptr_eq(geometry.indices(), &first.indices));
            assert_eq!(geometry.uvs().unwrap().as_ref(), first.uv.as_ref());
            assert!(Arc::ptr_eq(geometry.positions(), &next.positions));
            assert_eq!(geometry.positions()[1], i as f32);
        }

        assert_eq!(chunk.rebuild_count(), 5);
        let stats = fx.device.stats();
        assert_eq!(stats.geometries_created, 6);
        assert_eq!(stats.live_geometries(), 1);
        assert_eq!(stats.textures_created, 1);
        let mesh = fx.scene.get(chunk.mesh().unwrap()).unwrap();
        assert_eq!(Some(mesh.geometry), chunk.geometry());
    }

    #[test]
    fn test_rejected_first_record_allocates_nothing() {
        let mut fx = Fixture::new();
        let mut chunk = TerrainChunk::new(ChunkId(1));
        let mut record = grid_record(3, SEGMENTS, 0.0);
        record.texture = vec![0.0; 3].into();
        assert!(fx.ready(&mut chunk, &record).is_err());
        assert_eq!(chunk.state(), ChunkState::Pending);
        assert_eq!(fx.device.stats().geometries_created, 0);
        assert_eq!(fx.device.stats().textures_created, 0);
        assert!(fx.scene.is_empty());
    }

    #[test]
    fn test_rebuild_with_different_vertex_count_is_rejected() {
        let mut fx = Fixture::new();
        let mut chunk = TerrainChunk::new(ChunkId(1));
        fx.ready(&mut chunk, &grid_record(3, SEGMENTS, 0.0)).unwrap();
        let before = chunk.geometry();

        let result = fx.ready(&mut chunk, &grid_record(4, SEGMENTS, 1.0));
        assert!(matches!(
            result,
            Err(TerrainError::TopologyChanged {
                actual: 16,
                expected: 9
            })
        ));
        assert_eq!(chunk.geometry(), before);
        assert_eq!(chunk.rebuild_count(), 0);
    }
}
