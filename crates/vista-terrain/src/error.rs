use vista_render::RenderError;

/// Reasons a chunk record is refused at ingestion.
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    #[error("chunk has no vertices")]
    EmptyChunk,

    #[error("{attribute} has {actual} floats, expected {expected}")]
    AttributeLength {
        attribute: &'static str,
        actual: usize,
        expected: usize,
    },

    #[error("index count {0} is not a multiple of 3")]
    IndexCount(usize),

    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("texture has {actual} floats, expected {expected} for {segments}x{segments} RGBA")]
    TextureSize {
        actual: usize,
        expected: usize,
        segments: u32,
    },

    /// A rebuild changed the vertex count the first build fixed.
    #[error("rebuild has {actual} vertices but the chunk was built with {expected}")]
    TopologyChanged { actual: usize, expected: usize },

    #[error(transparent)]
    Render(#[from] RenderError),
}
