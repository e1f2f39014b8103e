//! CPU-side geometry: named vertex attributes plus a `u32` index buffer.
//!
//! Attributes are stored as `Arc<[f32]>` so a replacement geometry can carry
//! an attribute (or the index buffer) over from its predecessor without
//! copying. Identity is observable through [`Arc::ptr_eq`].

use std::f32::consts::PI;
use std::sync::Arc;

use glam::Vec3;

use crate::error::RenderError;
use crate::frustum::Aabb;

/// A named vertex attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Position,
    Normal,
    Uv,
}

impl AttributeKind {
    /// Floats per vertex.
    pub const fn components(self) -> usize {
        match self {
            Self::Position | Self::Normal => 3,
            Self::Uv => 2,
        }
    }

    /// `@location` the attribute is bound to in every program.
    pub const fn shader_location(self) -> u32 {
        match self {
            Self::Position => 0,
            Self::Normal => 1,
            Self::Uv => 2,
        }
    }

    pub(crate) const fn vertex_format(self) -> wgpu::VertexFormat {
        match self {
            Self::Position | Self::Normal => wgpu::VertexFormat::Float32x3,
            Self::Uv => wgpu::VertexFormat::Float32x2,
        }
    }
}

/// Indexed triangle geometry.
#[derive(Clone, Debug)]
pub struct Geometry {
    positions: Arc<[f32]>,
    normals: Option<Arc<[f32]>>,
    uvs: Option<Arc<[f32]>>,
    indices: Arc<[u32]>,
}

impl Geometry {
    /// Create geometry from positions and indices.
    ///
    /// Every index must address an existing vertex and the index count must
    /// describe whole triangles.
    pub fn new(positions: Arc<[f32]>, indices: Arc<[u32]>) -> Result<Self, RenderError> {
        if positions.is_empty() {
            return Err(RenderError::EmptyGeometry);
        }
        if positions.len() % 3 != 0 {
            return Err(RenderError::AttributeLength {
                kind: AttributeKind::Position,
                actual: positions.len(),
                expected: positions.len() - positions.len() % 3,
            });
        }
        if indices.len() % 3 != 0 {
            return Err(RenderError::IndexCount(indices.len()));
        }
        let vertex_count = positions.len() / 3;
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(RenderError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }
        Ok(Self {
            positions,
            normals: None,
            uvs: None,
            indices,
        })
    }

    /// Attach per-vertex normals.
    pub fn with_normals(mut self, normals: Arc<[f32]>) -> Result<Self, RenderError> {
        self.check_len(AttributeKind::Normal, &normals)?;
        self.normals = Some(normals);
        Ok(self)
    }

    /// Attach per-vertex texture coordinates.
    pub fn with_uvs(mut self, uvs: Arc<[f32]>) -> Result<Self, RenderError> {
        self.check_len(AttributeKind::Uv, &uvs)?;
        self.uvs = Some(uvs);
        Ok(self)
    }

    fn check_len(&self, kind: AttributeKind, data: &[f32]) -> Result<(), RenderError> {
        let expected = self.vertex_count() * kind.components();
        if data.len() != expected {
            return Err(RenderError::AttributeLength {
                kind,
                actual: data.len(),
                expected,
            });
        }
        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn positions(&self) -> &Arc<[f32]> {
        &self.positions
    }

    pub fn normals(&self) -> Option<&Arc<[f32]>> {
        self.normals.as_ref()
    }

    pub fn uvs(&self) -> Option<&Arc<[f32]>> {
        self.uvs.as_ref()
    }

    pub fn indices(&self) -> &Arc<[u32]> {
        &self.indices
    }

    /// Attribute data by kind, if present.
    pub fn attribute(&self, kind: AttributeKind) -> Option<&Arc<[f32]>> {
        match kind {
            AttributeKind::Position => Some(&self.positions),
            AttributeKind::Normal => self.normals.as_ref(),
            AttributeKind::Uv => self.uvs.as_ref(),
        }
    }

    /// Object-space bounds of all vertices.
    pub fn bounds(&self) -> Aabb {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for p in self.positions.chunks_exact(3) {
            let v = Vec3::new(p[0], p[1], p[2]);
            min = min.min(v);
            max = max.max(v);
        }
        Aabb::new(min, max)
    }

    /// UV sphere centred on the origin.
    ///
    /// Rings run from the +Y pole (v = 0) to the -Y pole (v = 1); the pole
    /// rows contribute one triangle per quad. Triangles wind counter-clockwise
    /// seen from outside, so a program drawn with
    /// [`FaceSide::Back`](crate::FaceSide::Back) shows the inside.
    pub fn sphere(
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    ) -> Result<Self, RenderError> {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let row = width_segments as usize + 1;
        let vertex_count = row * (height_segments as usize + 1);

        let mut positions = Vec::with_capacity(vertex_count * 3);
        let mut normals = Vec::with_capacity(vertex_count * 3);
        let mut uvs = Vec::with_capacity(vertex_count * 2);

        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            // Pole vertices sit half a segment over so the seam triangles
            // sample the middle of their texel column.
            let u_offset = if iy == 0 {
                0.5 / width_segments as f32
            } else if iy == height_segments {
                -0.5 / width_segments as f32
            } else {
                0.0
            };

            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let (sin_theta, cos_theta) = (v * PI).sin_cos();
                let (sin_phi, cos_phi) = (u * 2.0 * PI).sin_cos();

                let vertex = Vec3::new(
                    -radius * cos_phi * sin_theta,
                    radius * cos_theta,
                    radius * sin_phi * sin_theta,
                );
                let normal = vertex.normalize_or_zero();

                positions.extend_from_slice(&vertex.to_array());
                normals.extend_from_slice(&normal.to_array());
                uvs.extend_from_slice(&[u + u_offset, 1.0 - v]);
            }
        }

        let mut indices = Vec::new();
        for iy in 0..height_segments as usize {
            for ix in 0..width_segments as usize {
                let a = (iy * row + ix + 1) as u32;
                let b = (iy * row + ix) as u32;
                let c = ((iy + 1) * row + ix) as u32;
                let d = ((iy + 1) * row + ix + 1) as u32;

                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments as usize - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self::new(positions.into(), indices.into())?
            .with_normals(normals.into())?
            .with_uvs(uvs.into())
    }

    /// Axis-aligned quad in the XY plane facing +Z.
    pub fn plane(width: f32, height: f32) -> Result<Self, RenderError> {
        let (hw, hh) = (width * 0.5, height * 0.5);
        let positions: Vec<f32> = vec![
            -hw, hh, 0.0, //
            hw, hh, 0.0, //
            -hw, -hh, 0.0, //
            hw, -hh, 0.0,
        ];
        let normals: Vec<f32> = [0.0, 0.0, 1.0].repeat(4);
        let uvs: Vec<f32> = vec![0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0];
        let indices: Vec<u32> = vec![0, 2, 1, 2, 3, 1];

        Self::new(positions.into(), indices.into())?
            .with_normals(normals.into())?
            .with_uvs(uvs.into())
    }

    /// Filled disc in the XY plane facing +Z, built as a triangle fan around
    /// a centre vertex.
    pub fn circle(radius: f32, segments: u32) -> Result<Self, RenderError> {
        let segments = segments.max(3);

        let mut positions = vec![0.0, 0.0, 0.0];
        let mut uvs = vec![0.5, 0.5];
        for s in 0..=segments {
            let angle = s as f32 / segments as f32 * 2.0 * PI;
            let (sin, cos) = angle.sin_cos();
            positions.extend_from_slice(&[radius * cos, radius * sin, 0.0]);
            uvs.extend_from_slice(&[(cos + 1.0) * 0.5, (sin + 1.0) * 0.5]);
        }
        let vertex_count = positions.len() / 3;
        let normals: Vec<f32> = [0.0, 0.0, 1.0].repeat(vertex_count);

        let mut indices = Vec::with_capacity(segments as usize * 3);
        for i in 1..=segments {
            indices.extend_from_slice(&[i, i + 1, 0]);
        }

        Self::new(positions.into(), indices.into())?
            .with_normals(normals.into())?
            .with_uvs(uvs.into())
    }
}
