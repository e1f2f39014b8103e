//! Chunk records produced by the generation layer.

use std::sync::Arc;

use vista_render::TEXEL_COMPONENTS;

use crate::error::TerrainError;

/// Identity of one chunk-state object in the generation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(pub u64);

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "chunk#{}", self.0)
    }
}

/// Vertex, index and colour data of one terrain patch.
///
/// `positions` and `normals` hold three floats per vertex, `uv` two.
/// `texture` is a `segments × segments` RGBA float image.
#[derive(Clone, Debug)]
pub struct ChunkRecord {
    pub positions: Arc<[f32]>,
    pub normals: Arc<[f32]>,
    pub uv: Arc<[f32]>,
    pub indices: Arc<[u32]>,
    pub texture: Arc<[f32]>,
}

impl ChunkRecord {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Check every buffer against the others and against the shared grid
    /// resolution.
    pub fn validate(&self, segments: u32) -> Result<(), TerrainError> {
        self.validate_surface()?;

        let vertex_count = self.vertex_count();
        if self.uv.len() != vertex_count * 2 {
            return Err(TerrainError::AttributeLength {
                attribute: "uv",
                actual: self.uv.len(),
                expected: vertex_count * 2,
            });
        }
        if self.indices.len() % 3 != 0 {
            return Err(TerrainError::IndexCount(self.indices.len()));
        }
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(TerrainError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }

        let expected = segments as usize * segments as usize * TEXEL_COMPONENTS;
        if self.texture.len() != expected {
            return Err(TerrainError::TextureSize {
                actual: self.texture.len(),
                expected,
                segments,
            });
        }
        Ok(())
    }

    /// Positions and normals only: all a rebuild replaces.
    pub(crate) fn validate_surface(&self) -> Result<(), TerrainError> {
        if self.positions.is_empty() {
            return Err(TerrainError::EmptyChunk);
        }
        if self.positions.len() % 3 != 0 {
            return Err(TerrainError::AttributeLength {
                attribute: "positions",
                actual: self.positions.len(),
                expected: self.positions.len() - self.positions.len() % 3,
            });
        }
        if self.normals.len() != self.positions.len() {
            return Err(TerrainError::AttributeLength {
                attribute: "normals",
                actual: self.normals.len(),
                expected: self.positions.len(),
            });
        }
        Ok(())
    }
}
