//! Topology shared between the generator thread and the frame loop.

use std::sync::{Arc, RwLock};

use vista_terrain::{HeightPatch, PatchTopology, TopologyQuery};

/// Cloneable handle to a [`PatchTopology`] behind a lock.
#[derive(Clone, Debug, Default)]
pub struct SharedTopology(Arc<RwLock<PatchTopology>>);

impl SharedTopology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: u64, patch: HeightPatch) {
        match self.0.write() {
            Ok(mut topology) => topology.insert(key, patch),
            Err(_) => tracing::warn!("Topology lock poisoned, dropping patch {key}"),
        }
    }

    pub fn remove(&self, key: u64) {
        if let Ok(mut topology) = self.0.write() {
            topology.remove(key);
        }
    }

    pub fn len(&self) -> usize {
        self.0.read().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TopologyQuery for SharedTopology {
    /// A poisoned lock reads as "no patch".
    fn elevation_at(&self, x: f32, z: f32) -> Option<f32> {
        self.0.read().ok()?.elevation_at(x, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(height: f32) -> HeightPatch {
        HeightPatch {
            origin_x: 0.0,
            origin_z: 0.0,
            size: 10.0,
            resolution: 2,
            heights: vec![height; 4],
        }
    }

    #[test]
    fn test_clones_share_patches() {
        let topology = SharedTopology::new();
        let writer = topology.clone();
        writer.insert(1, patch(4.0));
        assert_eq!(topology.elevation_at(5.0, 5.0), Some(4.0));
        assert_eq!(topology.elevation_at(50.0, 5.0), None);
        writer.remove(1);
        assert!(topology.is_empty());
    }
}
