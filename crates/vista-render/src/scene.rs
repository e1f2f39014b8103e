//! Flat mesh lists rendered by a [`RenderDevice`](crate::RenderDevice).

use glam::{Mat4, Quat, Vec3};
use rustc_hash::FxHashMap;

use crate::camera::Camera;
use crate::frustum::{Aabb, Frustum};
use crate::handle::{GeometryHandle, IdAllocator, MeshId, ProgramHandle, TextureHandle};

/// Translation, rotation and scale of a mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// One draw: geometry shaded by a program, optionally with its own texture.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub geometry: GeometryHandle,
    pub program: ProgramHandle,
    /// Bound to the program's per-mesh slot right before this mesh is drawn.
    pub texture: Option<TextureHandle>,
    pub transform: Transform,
    pub visible: bool,
    /// Skip the draw when the geometry bounds fall outside the view.
    pub frustum_culled: bool,
    /// Lower orders draw first; ties break by insertion order.
    pub render_order: i32,
}

impl Mesh {
    pub fn new(geometry: GeometryHandle, program: ProgramHandle) -> Self {
        Self {
            geometry,
            program,
            texture: None,
            transform: Transform::default(),
            visible: true,
            frustum_culled: true,
            render_order: 0,
        }
    }

    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.texture = Some(texture);
        self
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    meshes: FxHashMap<MeshId, Mesh>,
    ids: IdAllocator,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mesh: Mesh) -> MeshId {
        let id = MeshId(self.ids.next());
        self.meshes.insert(id, mesh);
        id
    }

    pub fn remove(&mut self, id: MeshId) -> Option<Mesh> {
        self.meshes.remove(&id)
    }

    pub fn get(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(&id)
    }

    pub fn get_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes.get_mut(&id)
    }

    pub fn contains(&self, id: MeshId) -> bool {
        self.meshes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// All meshes sorted by `(render_order, id)`.
    pub fn iter_draw_order(&self) -> impl Iterator<Item = (MeshId, &Mesh)> {
        let mut entries: Vec<_> = self.meshes.iter().map(|(&id, mesh)| (id, mesh)).collect();
        entries.sort_by_key(|(id, mesh)| (mesh.render_order, *id));
        entries.into_iter()
    }

    /// Meshes that should be drawn this pass, in draw order. `bounds` looks
    /// up object-space bounds for a geometry; meshes whose geometry is
    /// unknown to the device are skipped.
    pub(crate) fn visible_draws<F>(&self, camera: &Camera, bounds: F) -> Vec<(MeshId, &Mesh)>
    where
        F: Fn(GeometryHandle) -> Option<Aabb>,
    {
        let frustum = Frustum::from_view_projection(&camera.view_projection_matrix());
        self.iter_draw_order()
            .filter(|(_, mesh)| mesh.visible)
            .filter(|(id, mesh)| match bounds(mesh.geometry) {
                Some(aabb) => {
                    !mesh.frustum_culled
                        || frustum.is_visible(&aabb.transformed(&mesh.transform.matrix()))
                }
                None => {
                    log::warn!("Mesh {id} references unknown geometry {}", mesh.geometry);
                    false
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh(order: i32) -> Mesh {
        Mesh {
            render_order: order,
            ..Mesh::new(GeometryHandle(1), ProgramHandle(1))
        }
    }

    #[test]
    fn test_add_get_remove() {
        let mut scene = Scene::new();
        let id = scene.add(mesh(0));
        assert!(scene.contains(id));
        assert_eq!(scene.len(), 1);
        scene.get_mut(id).unwrap().visible = false;
        assert!(!scene.get(id).unwrap().visible);
        assert!(scene.remove(id).is_some());
        assert!(scene.remove(id).is_none());
        assert!(scene.is_empty());
    }

    #[test]
    fn test_draw_order_by_render_order_then_insertion() {
        let mut scene = Scene::new();
        let a = scene.add(mesh(0));
        let b = scene.add(mesh(-1));
        let c = scene.add(mesh(0));
        let order: Vec<_> = scene.iter_draw_order().map(|(id, _)| id).collect();
        assert_eq!(order, vec![b, a, c]);
    }

    #[test]
    fn test_visible_draws_respects_culling_flag() {
        let mut scene = Scene::new();
        let behind = Aabb::new(Vec3::new(-1.0, -1.0, 9.0), Vec3::new(1.0, 1.0, 11.0));
        let culled = scene.add(mesh(0));
        let forced = scene.add(Mesh {
            frustum_culled: false,
            ..mesh(0)
        });
        let hidden = scene.add(Mesh {
            visible: false,
            frustum_culled: false,
            ..mesh(0)
        });

        let draws: Vec<_> = scene
            .visible_draws(&Camera::default(), |_| Some(behind))
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert!(!draws.contains(&culled));
        assert!(draws.contains(&forced));
        assert!(!draws.contains(&hidden));
    }

    #[test]
    fn test_visible_draws_skips_unknown_geometry() {
        let mut scene = Scene::new();
        scene.add(mesh(0));
        assert!(scene.visible_draws(&Camera::default(), |_| None).is_empty());
    }
}
