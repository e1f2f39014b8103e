//! Ground elevation lookup consumed by the orbit camera.

/// Elevation at a planar coordinate, or `None` where no patch exists yet.
pub trait TopologyQuery {
    fn elevation_at(&self, x: f32, z: f32) -> Option<f32>;
}

impl<T: TopologyQuery + ?Sized> TopologyQuery for &T {
    fn elevation_at(&self, x: f32, z: f32) -> Option<f32> {
        (**self).elevation_at(x, z)
    }
}

/// A square heightfield patch: `resolution × resolution` samples evenly
/// spread over `[origin, origin + size]` on X and Z.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightPatch {
    pub origin_x: f32,
    pub origin_z: f32,
    pub size: f32,
    pub resolution: u32,
    /// Row-major along X, rows stepping along Z.
    pub heights: Vec<f32>,
}

impl HeightPatch {
    pub fn contains(&self, x: f32, z: f32) -> bool {
        x >= self.origin_x
            && z >= self.origin_z
            && x <= self.origin_x + self.size
            && z <= self.origin_z + self.size
    }

    /// Bilinear sample, or `None` outside the patch or for malformed data.
    pub fn sample(&self, x: f32, z: f32) -> Option<f32> {
        let n = self.resolution as usize;
        if n < 2 || self.heights.len() != n * n || !self.contains(x, z) {
            return None;
        }
        let cells = (n - 1) as f32;
        let fx = (x - self.origin_x) / self.size * cells;
        let fz = (z - self.origin_z) / self.size * cells;
        let (x0, z0) = ((fx.floor() as usize).min(n - 2), (fz.floor() as usize).min(n - 2));
        let (tx, tz) = (fx - x0 as f32, fz - z0 as f32);

        let h = |ix: usize, iz: usize| self.heights[iz * n + ix];
        let top = h(x0, z0) + (h(x0 + 1, z0) - h(x0, z0)) * tx;
        let bottom = h(x0, z0 + 1) + (h(x0 + 1, z0 + 1) - h(x0, z0 + 1)) * tx;
        Some(top + (bottom - top) * tz)
    }
}

/// Topology backed by a list of patches; the most recently inserted patch
/// covering a point wins.
#[derive(Clone, Debug, Default)]
pub struct PatchTopology {
    patches: Vec<(u64, HeightPatch)>,
}

impl PatchTopology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the patch registered under `key`.
    pub fn insert(&mut self, key: u64, patch: HeightPatch) {
        self.remove(key);
        self.patches.push((key, patch));
    }

    pub fn remove(&mut self, key: u64) -> Option<HeightPatch> {
        let index = self.patches.iter().position(|(k, _)| *k == key)?;
        Some(self.patches.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }
}

impl TopologyQuery for PatchTopology {
    fn elevation_at(&self, x: f32, z: f32) -> Option<f32> {
        self.patches
            .iter()
            .rev()
            .find_map(|(_, patch)| patch.sample(x, z))
    }
}
