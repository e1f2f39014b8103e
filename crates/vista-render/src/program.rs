//! Shading programs shared by many meshes.
//!
//! Every program follows the same binding convention:
//!
//! | group | binding | contents |
//! |-------|---------|----------|
//! | 0 | 0 | [`CameraUniform`](crate::CameraUniform) |
//! | 1 | 0 | program uniform block (`uniform_size` bytes) |
//! | 1 | 1 + 2i, 2 + 2i | shared texture slot `i` and its sampler |
//! | 2 | 0 | per-object model matrix (`mat4x4<f32>`) |
//! | 3 | 0, 1 | per-mesh texture and sampler, when `mesh_texture` is set |
//!
//! Vertex attributes use the locations from
//! [`AttributeKind::shader_location`]; entry points are `vs_main` and
//! `fs_main`.

use crate::error::RenderError;
use crate::geometry::AttributeKind;

/// Which triangle faces are rasterised.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FaceSide {
    /// Counter-clockwise faces only.
    #[default]
    Front,
    /// Clockwise faces only: the inside of a closed mesh.
    Back,
    Double,
}

impl FaceSide {
    pub(crate) fn cull_mode(self) -> Option<wgpu::Face> {
        match self {
            Self::Front => Some(wgpu::Face::Back),
            Self::Back => Some(wgpu::Face::Front),
            Self::Double => None,
        }
    }
}

/// Everything needed to build a program's pipeline.
#[derive(Clone, Debug)]
pub struct ProgramDescriptor {
    pub label: &'static str,
    /// WGSL source.
    pub source: &'static str,
    /// Attributes consumed by `vs_main`, each at its fixed location.
    pub attributes: &'static [AttributeKind],
    /// Size of the group 1 uniform block in bytes.
    pub uniform_size: u64,
    /// Number of shared texture slots in group 1.
    pub texture_slots: u32,
    /// Whether group 3 (per-mesh texture) exists.
    pub mesh_texture: bool,
    pub side: FaceSide,
    pub depth_test: bool,
    pub depth_write: bool,
    pub wireframe: bool,
}

impl ProgramDescriptor {
    /// Descriptor with front-face culling, depth test and write enabled.
    pub fn new(
        label: &'static str,
        source: &'static str,
        attributes: &'static [AttributeKind],
        uniform_size: u64,
    ) -> Self {
        Self {
            label,
            source,
            attributes,
            uniform_size,
            texture_slots: 0,
            mesh_texture: false,
            side: FaceSide::Front,
            depth_test: true,
            depth_write: true,
            wireframe: false,
        }
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if self.uniform_size == 0 || self.uniform_size % 16 != 0 {
            return Err(RenderError::UniformSize {
                label: self.label,
                size: self.uniform_size,
            });
        }
        if !self.attributes.contains(&AttributeKind::Position) {
            return Err(RenderError::MissingPosition(self.label));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POS: &[AttributeKind] = &[AttributeKind::Position];

    #[test]
    fn test_defaults() {
        let desc = ProgramDescriptor::new("p", "", POS, 16);
        assert_eq!(desc.side, FaceSide::Front);
        assert!(desc.depth_test && desc.depth_write);
        assert!(desc.validate().is_ok());
    }

    #[test]
    fn test_rejects_unaligned_uniform_block() {
        let desc = ProgramDescriptor::new("p", "", POS, 20);
        assert!(matches!(
            desc.validate(),
            Err(RenderError::UniformSize { size: 20, .. })
        ));
        let empty = ProgramDescriptor::new("p", "", POS, 0);
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_rejects_missing_position() {
        let desc = ProgramDescriptor::new("p", "", &[AttributeKind::Uv], 16);
        assert!(matches!(desc.validate(), Err(RenderError::MissingPosition("p"))));
    }

    #[test]
    fn test_back_side_culls_front_faces() {
        assert_eq!(FaceSide::Back.cull_mode(), Some(wgpu::Face::Front));
        assert_eq!(FaceSide::Double.cull_mode(), None);
    }
}
