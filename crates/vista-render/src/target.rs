//! Offscreen render targets.

use crate::handle::{RenderTargetHandle, TextureHandle};

/// Colour attachment clear value and pixel size of a new target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderTargetDescriptor {
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
    /// Linear RGBA clear colour.
    pub clear_color: [f64; 4],
}

impl RenderTargetDescriptor {
    pub fn new(label: &'static str, width: u32, height: u32) -> Self {
        Self {
            label,
            width,
            height,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// A colour + depth target. `texture` samples the colour output and stays
/// valid across resizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderTarget {
    pub handle: RenderTargetHandle,
    pub texture: TextureHandle,
}

/// Pixel size of a target covering `ratio` of a viewport: the `f32`
/// product truncated toward zero. Negative products become zero.
pub fn scaled_extent(width: u32, height: u32, ratio: f32) -> (u32, u32) {
    (
        (width as f32 * ratio).max(0.0) as u32,
        (height as f32 * ratio).max(0.0) as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_extent_tenth() {
        assert_eq!(scaled_extent(1280, 720, 0.1), (128, 72));
    }

    #[test]
    fn test_scaled_extent_truncates() {
        assert_eq!(scaled_extent(1279, 719, 0.1), (127, 71));
    }

    #[test]
    fn test_scaled_extent_decimal_ratio_is_exact() {
        assert_eq!(scaled_extent(1000, 10, 0.7), (700, 7));
    }

    #[test]
    fn test_scaled_extent_zero_viewport() {
        assert_eq!(scaled_extent(0, 720, 0.1), (0, 72));
    }
}
