//! One-dimensional colour ramp sampled by the terrain shader.

use vista_render::{DataTextureDescriptor, TextureWrap};

/// A colour at a normalised ramp position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub position: f32,
    pub color: [f32; 3],
}

impl GradientStop {
    pub const fn new(position: f32, color: [f32; 3]) -> Self {
        Self { position, color }
    }
}

/// Piecewise-linear colour ramp, baked into an `N × 1` texture.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainGradient {
    stops: Vec<GradientStop>,
}

impl TerrainGradient {
    pub const DEFAULT_WIDTH: u32 = 256;

    /// Stops are sorted by position; an empty list yields black.
    pub fn new(mut stops: Vec<GradientStop>) -> Self {
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        Self { stops }
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Linear interpolation between the two stops around `t`.
    pub fn sample(&self, t: f32) -> [f32; 3] {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return [0.0; 3];
        };
        if t <= first.position {
            return first.color;
        }
        if t >= last.position {
            return last.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.position {
                let span = b.position - a.position;
                let f = if span > 0.0 { (t - a.position) / span } else { 1.0 };
                return std::array::from_fn(|i| a.color[i] + (b.color[i] - a.color[i]) * f);
            }
        }
        last.color
    }

    /// RGBA texels of a `width × 1` bake, sampled at texel centres.
    pub fn texels(&self, width: u32) -> Vec<f32> {
        (0..width)
            .flat_map(|x| {
                let [r, g, b] = self.sample((x as f32 + 0.5) / width as f32);
                [r, g, b, 1.0]
            })
            .collect()
    }

    pub fn descriptor(&self, width: u32) -> DataTextureDescriptor {
        DataTextureDescriptor::new("terrain-gradient", width, 1, self.texels(width).into())
            .with_wrap(TextureWrap::ClampToEdge)
    }
}

impl Default for TerrainGradient {
    /// Water, sand, grass, rock and snow bands.
    fn default() -> Self {
        Self::new(vec![
            GradientStop::new(0.0, [0.05, 0.16, 0.32]),
            GradientStop::new(0.18, [0.11, 0.36, 0.52]),
            GradientStop::new(0.22, [0.76, 0.70, 0.50]),
            GradientStop::new(0.30, [0.30, 0.52, 0.18]),
            GradientStop::new(0.60, [0.20, 0.38, 0.12]),
            GradientStop::new(0.75, [0.42, 0.38, 0.34]),
            GradientStop::new(0.90, [0.92, 0.93, 0.95]),
            GradientStop::new(1.0, [1.0, 1.0, 1.0]),
        ])
    }
}
