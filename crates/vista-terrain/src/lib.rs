//! Terrain chunk lifecycle: generation events in, GPU-resident meshes out.
//!
//! The generation layer owns [`ChunkRecord`]s and announces them through a
//! [`TerrainEvent`] channel. A [`TerrainChunkSet`] drains that channel between
//! frames, creating, rebuilding and disposing one [`TerrainChunk`] per chunk
//! id, and owns the single shading program all chunks share.

mod chunk_record;
mod chunk_renderer;
mod chunk_set;
mod error;
mod events;
mod gradient;
mod topology;
mod uniforms;

pub use chunk_record::{ChunkId, ChunkRecord};
pub use chunk_renderer::{ChunkState, TerrainChunk};
pub use chunk_set::{
    FOG_TEXTURE_SLOT, GRADIENT_TEXTURE_SLOT, TerrainChunkSet, TerrainSetConfig, TerrainStats,
};
pub use error::TerrainError;
pub use events::{TerrainEvent, TerrainEventReceiver, TerrainEventSender, terrain_channel};
pub use gradient::{GradientStop, TerrainGradient};
pub use topology::{HeightPatch, PatchTopology, TopologyQuery};
pub use uniforms::{TerrainShading, TerrainUniforms};

/// WGSL source of the shared terrain program.
pub const TERRAIN_SHADER_SOURCE: &str = include_str!("shaders/terrain.wgsl");
