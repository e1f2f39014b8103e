//! Synthetic background chunk generator: flat patches laid out as a
//! checkerboard, published through the terrain event channel.

use std::sync::Arc;
use std::thread::JoinHandle;

use vista_terrain::{ChunkId, ChunkRecord, HeightPatch, TerrainEventSender};

use crate::topology::SharedTopology;

#[derive(Clone, Debug, PartialEq)]
pub struct CheckerboardConfig {
    /// Chunks generated on each side of the origin along X and Z.
    pub radius: i32,
    pub chunk_size: f32,
    /// Vertices per side, also the chunk texture resolution.
    pub segments: u32,
    /// Elevation of the raised squares.
    pub step_height: f32,
    /// Publish every chunk a second time with new heights.
    pub regenerate: bool,
}

impl Default for CheckerboardConfig {
    fn default() -> Self {
        Self {
            radius: 2,
            chunk_size: 64.0,
            segments: 41,
            step_height: 1.0,
            regenerate: true,
        }
    }
}

/// Chunk id of the chunk at grid cell `(cx, cz)`.
pub fn checkerboard_id(cx: i32, cz: i32) -> ChunkId {
    ChunkId(((cx as u32 as u64) << 32) | cz as u32 as u64)
}

/// Record and matching height patch of one flat checkerboard chunk.
pub fn checkerboard_chunk(
    cx: i32,
    cz: i32,
    lift: f32,
    config: &CheckerboardConfig,
) -> (ChunkRecord, HeightPatch) {
    let n = config.segments.max(2) as usize;
    let raised = (cx + cz).rem_euclid(2) == 1;
    let base = if raised { config.step_height } else { 0.0 };
    let elevation = base + lift;
    let origin_x = cx as f32 * config.chunk_size;
    let origin_z = cz as f32 * config.chunk_size;
    let step = config.chunk_size / (n - 1) as f32;

    let mut positions = Vec::with_capacity(n * n * 3);
    let mut uv = Vec::with_capacity(n * n * 2);
    for z in 0..n {
        for x in 0..n {
            positions.extend_from_slice(&[
                origin_x + x as f32 * step,
                elevation,
                origin_z + z as f32 * step,
            ]);
            uv.extend_from_slice(&[x as f32 / (n - 1) as f32, z as f32 / (n - 1) as f32]);
        }
    }
    let normals = [0.0, 1.0, 0.0].repeat(n * n);

    let mut indices = Vec::with_capacity((n - 1) * (n - 1) * 6);
    for z in 0..n - 1 {
        for x in 0..n - 1 {
            let a = (z * n + x) as u32;
            let b = a + n as u32;
            indices.extend_from_slice(&[a, b, a + 1, b, b + 1, a + 1]);
        }
    }

    let segments = config.segments as usize;
    let normalized = (elevation / config.step_height.max(f32::EPSILON)).clamp(0.0, 1.0);
    let mut texture = Vec::with_capacity(segments * segments * 4);
    for y in 0..segments {
        for x in 0..segments {
            let cell = (x / 4 + y / 4) % 2 == 0;
            texture.extend_from_slice(&[if cell { 0.35 } else { 0.55 }, normalized, 0.0, 1.0]);
        }
    }

    let record = ChunkRecord {
        positions: positions.into(),
        normals: normals.into(),
        uv: uv.into(),
        indices: indices.into(),
        texture: texture.into(),
    };
    let patch = HeightPatch {
        origin_x,
        origin_z,
        size: config.chunk_size,
        resolution: 2,
        heights: vec![elevation; 4],
    };
    (record, patch)
}

/// Generate every chunk on a background thread. The thread ends once all
/// chunks are published or the receiving side is gone, and yields the
/// number of records sent.
pub fn spawn_checkerboard_generator(
    sender: TerrainEventSender,
    topology: SharedTopology,
    config: CheckerboardConfig,
) -> std::io::Result<JoinHandle<usize>> {
    std::thread::Builder::new()
        .name("terrain-gen".into())
        .spawn(move || {
            let cells: Vec<(i32, i32)> = (-config.radius..=config.radius)
                .flat_map(|cx| (-config.radius..=config.radius).map(move |cz| (cx, cz)))
                .collect();
            let passes: &[f32] = if config.regenerate { &[0.0, 0.5] } else { &[0.0] };

            let mut sent = 0;
            for (pass, &lift) in passes.iter().enumerate() {
                for &(cx, cz) in &cells {
                    let id = checkerboard_id(cx, cz);
                    if pass == 0 && !sender.created(id) {
                        return sent;
                    }
                    let (record, patch) = checkerboard_chunk(cx, cz, lift, &config);
                    topology.insert(id.0, patch);
                    if !sender.ready(id, Arc::new(record)) {
                        return sent;
                    }
                    sent += 1;
                }
            }
            tracing::info!("Generated {} chunks ({sent} records)", cells.len());
            sent
        })
}
