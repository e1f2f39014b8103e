//! The set of live terrain chunks and their shared shading program.

use glam::Vec3;
use rustc_hash::FxHashMap;
use vista_render::{
    AttributeKind, ProgramDescriptor, ProgramHandle, RenderDevice, Scene, TextureHandle,
};

use crate::TERRAIN_SHADER_SOURCE;
use crate::chunk_record::ChunkId;
use crate::chunk_renderer::{ChunkContext, ChunkState, TerrainChunk};
use crate::error::TerrainError;
use crate::events::{TerrainEvent, TerrainEventReceiver};
use crate::gradient::TerrainGradient;
use crate::uniforms::{TerrainShading, TerrainUniforms};

/// Program texture slot of the gradient lookup.
pub const GRADIENT_TEXTURE_SLOT: u32 = 0;
/// Program texture slot of the sky/fog image.
pub const FOG_TEXTURE_SLOT: u32 = 1;

const TERRAIN_ATTRIBUTES: &[AttributeKind] = &[
    AttributeKind::Position,
    AttributeKind::Normal,
    AttributeKind::Uv,
];

#[derive(Clone, Debug, PartialEq)]
pub struct TerrainSetConfig {
    /// Side length of every chunk texture.
    pub segments: u32,
    /// Streaming distance threshold passed to the shader.
    pub grass_distance: f32,
    pub wireframe: bool,
    pub gradient: TerrainGradient,
}

impl Default for TerrainSetConfig {
    fn default() -> Self {
        Self {
            segments: 41,
            grass_distance: 64.0,
            wireframe: false,
            gradient: TerrainGradient::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerrainStats {
    pub live_chunks: usize,
    pub built_chunks: usize,
    pub total_rebuilds: u64,
    pub rejected_records: u64,
    pub ignored_events: u64,
}

/// Owns every [`TerrainChunk`] and the single program they share.
///
/// Chunks differ only in geometry and in their own texture, which the device
/// binds right before each chunk's draw. Everything else lives in one
/// uniform block written once per frame by [`TerrainChunkSet::update`].
pub struct TerrainChunkSet {
    receiver: TerrainEventReceiver,
    chunks: FxHashMap<ChunkId, TerrainChunk>,
    program: ProgramHandle,
    gradient_texture: TextureHandle,
    shading: TerrainShading,
    segments: u32,
    total_rebuilds: u64,
    rejected_records: u64,
    ignored_events: u64,
}

impl TerrainChunkSet {
    pub fn new(
        device: &mut dyn RenderDevice,
        receiver: TerrainEventReceiver,
        config: &TerrainSetConfig,
        fog_texture: TextureHandle,
    ) -> Result<Self, TerrainError> {
        let program = device.create_program(&ProgramDescriptor {
            texture_slots: 2,
            mesh_texture: true,
            wireframe: config.wireframe,
            ..ProgramDescriptor::new(
                "terrain",
                TERRAIN_SHADER_SOURCE,
                TERRAIN_ATTRIBUTES,
                std::mem::size_of::<TerrainUniforms>() as u64,
            )
        })?;

        let gradient_texture = device
            .create_data_texture(&config.gradient.descriptor(TerrainGradient::DEFAULT_WIDTH))?;
        device.set_program_texture(program, GRADIENT_TEXTURE_SLOT, gradient_texture);
        device.set_program_texture(program, FOG_TEXTURE_SLOT, fog_texture);

        let shading = TerrainShading::new(config.grass_distance);
        device.write_program_uniforms(program, bytemuck::bytes_of(&shading.to_uniforms()));

        tracing::info!(
            "Terrain chunk set ready ({}x{} chunk textures)",
            config.segments,
            config.segments
        );
        Ok(Self {
            receiver,
            chunks: FxHashMap::default(),
            program,
            gradient_texture,
            shading,
            segments: config.segments,
            total_rebuilds: 0,
            rejected_records: 0,
            ignored_events: 0,
        })
    }

    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    pub fn gradient_texture(&self) -> TextureHandle {
        self.gradient_texture
    }

    pub fn shading(&self) -> &TerrainShading {
        &self.shading
    }

    /// Tunable shading parameters; changes reach the GPU on the next
    /// [`update`](Self::update).
    pub fn shading_mut(&mut self) -> &mut TerrainShading {
        &mut self.shading
    }

    /// Renderer bound to a chunk id, if the chunk is live.
    pub fn chunk(&self, id: ChunkId) -> Option<&TerrainChunk> {
        self.chunks.get(&id)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn stats(&self) -> TerrainStats {
        TerrainStats {
            live_chunks: self.chunks.len(),
            built_chunks: self
                .chunks
                .values()
                .filter(|c| c.state() == ChunkState::Built)
                .count(),
            total_rebuilds: self.total_rebuilds,
            rejected_records: self.rejected_records,
            ignored_events: self.ignored_events,
        }
    }

    /// Replace the fog image, e.g. after the sky compositor was recreated.
    pub fn set_fog_texture(&mut self, device: &mut dyn RenderDevice, texture: TextureHandle) {
        device.set_program_texture(self.program, FOG_TEXTURE_SLOT, texture);
    }

    /// Apply every queued generation event. Must run between frames.
    /// Returns the number of events handled.
    pub fn drain_events(&mut self, device: &mut dyn RenderDevice, scene: &mut Scene) -> usize {
        let events: Vec<TerrainEvent> = self.receiver.try_iter().collect();
        let count = events.len();
        for event in events {
            self.handle_event(device, scene, event);
        }
        count
    }

    pub fn handle_event(
        &mut self,
        device: &mut dyn RenderDevice,
        scene: &mut Scene,
        event: TerrainEvent,
    ) {
        match event {
            TerrainEvent::Created(id) => {
                if self.chunks.contains_key(&id) {
                    tracing::warn!("Duplicate create for live {id}, ignoring");
                    self.ignored_events += 1;
                    return;
                }
                self.chunks.insert(id, TerrainChunk::new(id));
            }
            TerrainEvent::Ready(id, record) => {
                let Some(chunk) = self.chunks.get_mut(&id) else {
                    tracing::warn!("Ready for unknown {id}, ignoring");
                    self.ignored_events += 1;
                    return;
                };
                let was_built = chunk.is_created();
                let mut ctx = ChunkContext {
                    device,
                    scene,
                    program: self.program,
                    segments: self.segments,
                };
                match chunk.ready(&record, &mut ctx) {
                    Ok(()) if was_built => self.total_rebuilds += 1,
                    Ok(()) => {}
                    Err(err) => {
                        tracing::warn!("Rejected record for {id}: {err}");
                        self.rejected_records += 1;
                    }
                }
            }
            TerrainEvent::Destroyed(id) => match self.chunks.remove(&id) {
                Some(mut chunk) => chunk.destroy(device, scene),
                None => {
                    tracing::warn!("Destroy for unknown {id}, ignoring");
                    self.ignored_events += 1;
                }
            },
        }
    }

    /// Push this frame's player and sun positions into the shared uniforms.
    pub fn update(
        &mut self,
        device: &mut dyn RenderDevice,
        player_position: Vec3,
        sun_position: Vec3,
    ) {
        self.shading.set_frame_inputs(player_position, sun_position);
        let uniforms = self.shading.to_uniforms();
        device.write_program_uniforms(self.program, bytemuck::bytes_of(&uniforms));
    }

    /// Destroy every chunk and the gradient texture.
    pub fn dispose(&mut self, device: &mut dyn RenderDevice, scene: &mut Scene) {
        for (_, mut chunk) in self.chunks.drain() {
            chunk.destroy(device, scene);
        }
        device.dispose_texture(self.gradient_texture);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk_record::tests::grid_record;
    use crate::events::{TerrainEventSender, terrain_channel};
    use std::sync::Arc;
    use vista_render::{
        Camera, DataTextureDescriptor, HeadlessDevice, RenderTargetDescriptor,
    };

    struct Fixture {
        device: HeadlessDevice,
        scene: Scene,
        sender: TerrainEventSender,
        set: TerrainChunkSet,
        fog: TextureHandle,
    }

    fn fixture() -> Fixture {
        let mut device = HeadlessDevice::new();
        let fog = device
            .create_data_texture(&DataTextureDescriptor::new("fog", 1, 1, vec![0.0f32; 4].into()))
            .unwrap();
        let (sender, receiver) = terrain_channel();
        let config = TerrainSetConfig {
            segments: 4,
            ..TerrainSetConfig::default()
        };
        let set = TerrainChunkSet::new(&mut device, receiver, &config, fog).unwrap();
        Fixture {
            device,
            scene: Scene::new(),
            sender,
            set,
            fog,
        }
    }

    impl Fixture {
        fn drain(&mut self) -> usize {
            self.set.drain_events(&mut self.device, &mut self.scene)
        }
    }

    #[test]
    fn test_program_binds_gradient_and_fog() {
        let fx = fixture();
        let textures = fx.device.program_textures(fx.set.program()).unwrap();
        assert_eq!(textures[GRADIENT_TEXTURE_SLOT as usize], Some(fx.set.gradient_texture()));
        assert_eq!(textures[FOG_TEXTURE_SLOT as usize], Some(fx.fog));
        let desc = fx.device.program_descriptor(fx.set.program()).unwrap();
        assert!(desc.mesh_texture);
    }

    #[test]
    fn test_lifecycle_through_channel() {
        let mut fx = fixture();
        let id = ChunkId(10);
        fx.sender.created(id);
        assert_eq!(fx.drain(), 1);
        assert_eq!(fx.set.chunk(id).unwrap().state(), ChunkState::Pending);
        assert!(fx.scene.is_empty());

        fx.sender.ready(id, Arc::new(grid_record(3, 4, 0.0)));
        fx.sender.ready(id, Arc::new(grid_record(3, 4, 2.0)));
        fx.drain();
        let stats = fx.set.stats();
        assert_eq!((stats.live_chunks, stats.built_chunks, stats.total_rebuilds), (1, 1, 1));
        assert_eq!(fx.scene.len(), 1);

        fx.sender.destroyed(id);
        fx.drain();
        assert!(fx.set.chunk(id).is_none());
        assert!(fx.scene.is_empty());
        assert_eq!(fx.device.stats().live_geometries(), 0);
        assert_eq!(fx.device.stats().invalid_disposals, 0);
    }

    #[test]
    fn test_destroy_before_ready_is_noop() {
        let mut fx = fixture();
        let id = ChunkId(3);
        fx.sender.created(id);
        fx.sender.destroyed(id);
        fx.drain();
        assert!(fx.set.is_empty());
        assert_eq!(fx.device.stats().geometries_disposed, 0);
        assert_eq!(fx.device.stats().invalid_disposals, 0);
    }

    #[test]
    fn test_unknown_and_duplicate_events_are_ignored() {
        let mut fx = fixture();
        fx.sender.ready(ChunkId(1), Arc::new(grid_record(3, 4, 0.0)));
        fx.sender.destroyed(ChunkId(2));
        fx.sender.created(ChunkId(3));
        fx.sender.created(ChunkId(3));
        fx.drain();
        assert_eq!(fx.set.len(), 1);
        assert_eq!(fx.set.stats().ignored_events, 3);
        assert_eq!(fx.device.stats().geometries_created, 0);
    }

    #[test]
    fn test_invalid_record_is_rejected_and_chunk_stays_pending() {
        let mut fx = fixture();
        let mut bad = grid_record(3, 4, 0.0);
        bad.uv = vec![0.0f32; 2].into();
        fx.sender.created(ChunkId(1));
        fx.sender.ready(ChunkId(1), Arc::new(bad));
        fx.drain();
        assert_eq!(fx.set.chunk(ChunkId(1)).unwrap().state(), ChunkState::Pending);
        assert_eq!(fx.set.stats().rejected_records, 1);
    }

    #[test]
    fn test_update_writes_shared_uniforms() {
        let mut fx = fixture();
        fx.set.shading_mut().set_fresnel_scale(1.5);
        fx.set.update(
            &mut fx.device,
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let bytes = fx.device.program_uniforms(fx.set.program()).unwrap();
        let uniforms: TerrainUniforms = bytemuck::pod_read_unaligned(bytes);
        assert_eq!(uniforms.player_position, [4.0, 5.0, 6.0]);
        assert_eq!(uniforms.sun_position, [0.0, 1.0, 0.0]);
        assert_eq!(uniforms.fresnel_scale, 1.5);
        assert_eq!(uniforms.grass_distance, 64.0);
    }

    #[test]
    fn test_each_draw_binds_its_own_chunk_texture() {
        let mut fx = fixture();
        for (i, x) in [(1, -1.0f32), (2, 1.0)] {
            let mut record = grid_record(3, 4, 0.0);
            record.positions = record
                .positions
                .chunks_exact(3)
                .flat_map(|p| [p[0] + x, p[1], p[2] - 10.0])
                .collect::<Vec<_>>()
                .into();
            fx.sender.created(ChunkId(i));
            fx.sender.ready(ChunkId(i), Arc::new(record));
        }
        fx.drain();

        let target = fx
            .device
            .create_render_target(&RenderTargetDescriptor::new("main", 8, 8));
        fx.device.render(&fx.scene, &Camera::default(), target.handle);
        let pass = fx.device.last_pass(target.handle).unwrap();
        assert_eq!(pass.draws.len(), 2);

        let program = fx.set.program();
        for draw in &pass.draws {
            assert_eq!(draw.program, program);
        }
        let mut bound: Vec<_> = pass.draws.iter().map(|d| d.mesh_texture).collect();
        let mut expected = vec![
            fx.set.chunk(ChunkId(1)).unwrap().texture(),
            fx.set.chunk(ChunkId(2)).unwrap().texture(),
        ];
        bound.sort();
        expected.sort();
        assert_eq!(bound, expected);
    }

    #[test]
    fn test_dispose_frees_everything() {
        let mut fx = fixture();
        fx.sender.created(ChunkId(1));
        fx.sender.ready(ChunkId(1), Arc::new(grid_record(3, 4, 0.0)));
        fx.drain();
        fx.set.dispose(&mut fx.device, &mut fx.scene);
        let stats = fx.device.stats();
        assert_eq!(stats.live_geometries(), 0);
        // Only the fog texture created by the fixture remains.
        assert_eq!(stats.live_textures(), 1);
    }

    #[test]
    fn test_terrain_program_builds_on_gpu() {
        let Ok(mut device) = vista_render::WgpuDevice::new() else {
            return;
        };
        let fog = device
            .create_data_texture(&DataTextureDescriptor::new("fog", 1, 1, vec![0.0f32; 4].into()))
            .unwrap();
        let (sender, receiver) = terrain_channel();
        let config = TerrainSetConfig {
            segments: 4,
            ..TerrainSetConfig::default()
        };
        let mut set = TerrainChunkSet::new(&mut device, receiver, &config, fog).unwrap();
        let mut scene = Scene::new();
        sender.created(ChunkId(1));
        sender.ready(ChunkId(1), Arc::new(grid_record(3, 4, 0.0)));
        set.drain_events(&mut device, &mut scene);
        set.update(&mut device, Vec3::ZERO, Vec3::Y);

        let target = device.create_render_target(&RenderTargetDescriptor::new("main", 16, 16));
        device.render(&scene, &Camera::default(), target.handle);
        assert_eq!(device.stats().passes_rendered, 1);
    }
}
