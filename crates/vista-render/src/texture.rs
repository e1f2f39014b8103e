//! Float data textures uploaded from CPU buffers.

use std::sync::Arc;

use crate::error::RenderError;

/// Floats per texel (RGBA).
pub const TEXEL_COMPONENTS: usize = 4;

/// Sampling filter for magnification and minification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextureFilter {
    #[default]
    Linear,
    Nearest,
}

/// Addressing mode outside `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextureWrap {
    #[default]
    ClampToEdge,
    Repeat,
}

/// An `Rgba32Float` texture described by its texels, row-major from the
/// first row of `data`.
#[derive(Clone, Debug)]
pub struct DataTextureDescriptor {
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
    pub data: Arc<[f32]>,
    /// Upload rows bottom-up instead of top-down.
    pub flip_y: bool,
    pub filter: TextureFilter,
    pub wrap: TextureWrap,
}

impl DataTextureDescriptor {
    /// Descriptor with linear filtering, edge clamping and no flip.
    pub fn new(label: &'static str, width: u32, height: u32, data: Arc<[f32]>) -> Self {
        Self {
            label,
            width,
            height,
            data,
            flip_y: false,
            filter: TextureFilter::default(),
            wrap: TextureWrap::default(),
        }
    }

    pub fn with_flip_y(mut self, flip_y: bool) -> Self {
        self.flip_y = flip_y;
        self
    }

    pub fn with_filter(mut self, filter: TextureFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_wrap(mut self, wrap: TextureWrap) -> Self {
        self.wrap = wrap;
        self
    }

    /// Reject zero dimensions and texel data of the wrong length.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::ZeroDimensions {
                width: self.width,
                height: self.height,
            });
        }
        let expected = self.width as usize * self.height as usize * TEXEL_COMPONENTS;
        if self.data.len() != expected {
            return Err(RenderError::DataSizeMismatch {
                actual: self.data.len(),
                expected,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Texel bytes in upload order, honouring `flip_y`.
    pub(crate) fn upload_bytes(&self) -> Vec<u8> {
        let row = self.width as usize * TEXEL_COMPONENTS;
        let mut out = Vec::with_capacity(self.data.len() * 4);
        let rows = self.data.chunks_exact(row);
        if self.flip_y {
            for r in rows.rev() {
                out.extend_from_slice(bytemuck::cast_slice(r));
            }
        } else {
            for r in rows {
                out.extend_from_slice(bytemuck::cast_slice(r));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_exact_size() {
        let desc = DataTextureDescriptor::new("t", 2, 3, vec![0.0; 24].into());
        assert!(desc.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_wrong_size() {
        let desc = DataTextureDescriptor::new("t", 2, 2, vec![0.0; 15].into());
        assert!(matches!(
            desc.validate(),
            Err(RenderError::DataSizeMismatch {
                actual: 15,
                expected: 16,
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_dimensions() {
        let desc = DataTextureDescriptor::new("t", 0, 4, Vec::new().into());
        assert!(matches!(
            desc.validate(),
            Err(RenderError::ZeroDimensions { width: 0, height: 4 })
        ));
    }

    #[test]
    fn test_flip_y_reverses_rows() {
        let data: Vec<f32> = (0..8).map(|i| i as f32).collect();
        let desc = DataTextureDescriptor::new("t", 1, 2, data.into()).with_flip_y(true);
        let bytes = desc.upload_bytes();
        let texels: &[f32] = bytemuck::cast_slice(&bytes);
        assert_eq!(texels, &[4.0, 5.0, 6.0, 7.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_defaults() {
        let desc = DataTextureDescriptor::new("t", 1, 1, vec![0.0; 4].into());
        assert!(!desc.flip_y);
        assert_eq!(desc.filter, TextureFilter::Linear);
        assert_eq!(desc.wrap, TextureWrap::ClampToEdge);
    }
}
