//! Errors raised while creating render resources.

use crate::geometry::AttributeKind;

/// Errors that can occur while validating or creating render resources.
///
/// Per-frame operations never return these; they are raised at resource
/// creation time so that bad data is rejected before any GPU allocation.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A geometry was built without any vertices.
    #[error("geometry has no vertices")]
    EmptyGeometry,

    /// An attribute's float count is not a multiple of its component count
    /// or does not match the vertex count.
    #[error("{kind:?} attribute has {actual} floats, expected {expected}")]
    AttributeLength {
        kind: AttributeKind,
        actual: usize,
        expected: usize,
    },

    /// The index buffer does not describe whole triangles.
    #[error("index count {0} is not a multiple of 3")]
    IndexCount(usize),

    /// An index points past the last vertex.
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    /// Texel data length doesn't match the descriptor.
    #[error("texture data has {actual} floats, expected {expected} for {width}x{height} RGBA")]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },

    /// Width or height is zero.
    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    /// A program's uniform block is empty or not 16-byte aligned.
    #[error("uniform block of program '{label}' is {size} bytes, expected a multiple of 16")]
    UniformSize { label: &'static str, size: u64 },

    /// A program needs at least the position attribute.
    #[error("program '{0}' does not consume the position attribute")]
    MissingPosition(&'static str),

    /// No GPU adapter could be found for the wgpu device.
    #[error("no compatible GPU adapter found")]
    NoAdapter,

    /// Failed to request a GPU device.
    #[error("failed to request GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),
}
