//! Scene graph: an arena of objects addressed by stable [`ObjectId`]
//! handles, shared material storage, and the material swap cache used by
//! the bloom pass.
//!
//! Objects form a forest. Every traversal is pre-order starting from the
//! root-level objects in insertion order, visiting children in insertion
//! order, so bloom-eligibility checks and picking are deterministic.

mod material;
pub mod material_swap;
mod object;
pub mod populate;

use glam::Mat4;
pub use material::{srgb_hex_to_linear, Material, MaterialId, MaterialLibrary};
pub use material_swap::MaterialSwapCache;
pub use object::{Layers, ObjectId, ObjectKind, SceneObject, Transform};
pub use populate::{populate, PopulatedScene};

use crate::geometry::GeometryId;

/// A mesh resolved to world space, as seen by the renderer and picker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldMesh {
    /// Owning object.
    pub id: ObjectId,
    /// Shared geometry.
    pub geometry: GeometryId,
    /// Material assigned at the time of the walk.
    pub material: MaterialId,
    /// Local-to-world matrix.
    pub world: Mat4,
    /// Layer membership.
    pub layers: Layers,
}

/// A directional light resolved to world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldLight {
    /// Unit vector pointing from the surface toward the light.
    pub direction: glam::Vec3,
    /// Linear RGB color premultiplied by intensity.
    pub radiance: [f32; 3],
}

/// Arena-backed scene graph.
#[derive(Debug, Default)]
pub struct SceneGraph {
    objects: Vec<Option<SceneObject>>,
    roots: Vec<ObjectId>,
    live: usize,
}

impl SceneGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root-level object.
    pub fn add(&mut self, kind: ObjectKind, transform: Transform) -> ObjectId {
        let id = self.insert(kind, transform, None);
        self.roots.push(id);
        id
    }

    /// Add an object under `parent`. Returns `None` if the parent does not
    /// exist.
    pub fn add_child(
        &mut self,
        parent: ObjectId,
        kind: ObjectKind,
        transform: Transform,
    ) -> Option<ObjectId> {
        if self.get(parent).is_none() {
            return None;
        }
        let id = self.insert(kind, transform, Some(parent));
        if let Some(p) = self.get_mut(parent) {
            p.children.push(id);
        }
        Some(id)
    }

    fn insert(
        &mut self,
        kind: ObjectKind,
        transform: Transform,
        parent: Option<ObjectId>,
    ) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(Some(SceneObject {
            id,
            name: None,
            transform,
            kind,
            layers: Layers::new(),
            parent,
            children: Vec::new(),
        }));
        self.live += 1;
        id
    }

    /// Remove an object and its whole subtree. Returns the removed root
    /// object, or `None` if `id` was not live.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let removed = self.objects.get_mut(id.index())?.take()?;
        self.live -= 1;

        match removed.parent {
            Some(parent) => {
                if let Some(p) = self.get_mut(parent) {
                    p.children.retain(|&c| c != id);
                }
            }
            None => self.roots.retain(|&r| r != id),
        }

        let mut stack = removed.children.clone();
        while let Some(child) = stack.pop() {
            if let Some(obj) =
                self.objects.get_mut(child.index()).and_then(Option::take)
            {
                self.live -= 1;
                stack.extend(obj.children);
            }
        }
        Some(removed)
    }

    /// Look up a live object.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id.index()).and_then(Option::as_ref)
    }

    /// Mutable lookup of a live object.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Number of live objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether the graph holds no live objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Root-level objects in insertion order.
    #[must_use]
    pub fn roots(&self) -> &[ObjectId] {
        &self.roots
    }

    /// Every live object handle in stable pre-order.
    #[must_use]
    pub fn pre_order(&self) -> Vec<ObjectId> {
        let mut order = Vec::with_capacity(self.live);
        self.walk(|obj, _| order.push(obj.id));
        order
    }

    /// Visit every live object in pre-order together with its
    /// local-to-world matrix.
    pub fn walk(&self, mut visit: impl FnMut(&SceneObject, Mat4)) {
        let mut stack: Vec<(ObjectId, Mat4)> = self
            .roots
            .iter()
            .rev()
            .map(|&id| (id, Mat4::IDENTITY))
            .collect();
        while let Some((id, parent_world)) = stack.pop() {
            let Some(obj) = self.get(id) else { continue };
            let world = parent_world * obj.transform.matrix();
            visit(obj, world);
            stack.extend(obj.children.iter().rev().map(|&c| (c, world)));
        }
    }

    /// All meshes resolved to world space, in pre-order.
    #[must_use]
    pub fn world_meshes(&self) -> Vec<WorldMesh> {
        let mut meshes = Vec::new();
        self.walk(|obj, world| {
            if let ObjectKind::Mesh { geometry, material } = obj.kind {
                meshes.push(WorldMesh {
                    id: obj.id,
                    geometry,
                    material,
                    world,
                    layers: obj.layers,
                });
            }
        });
        meshes
    }

    /// The first directional light in pre-order, if any.
    #[must_use]
    pub fn primary_light(&self) -> Option<WorldLight> {
        let mut light = None;
        self.walk(|obj, world| {
            if light.is_some() {
                return;
            }
            if let ObjectKind::DirectionalLight {
                color,
                intensity,
                target,
            } = obj.kind
            {
                let from = world.transform_point3(glam::Vec3::ZERO);
                let direction = (from - target).normalize_or(glam::Vec3::Y);
                light = Some(WorldLight {
                    direction,
                    radiance: color.map(|c| c * intensity),
                });
            }
        });
        light
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::geometry::{icosphere, GeometryLibrary};

    fn mesh_kind(
        geometries: &mut GeometryLibrary,
        materials: &mut MaterialLibrary,
    ) -> ObjectKind {
        let geometry = geometries.add(icosphere(1.0, 0));
        let material = materials.add(Material::BLACK);
        ObjectKind::Mesh { geometry, material }
    }

    #[test]
    fn pre_order_visits_parents_before_children_in_insertion_order() {
        let mut g = SceneGraph::new();
        let a = g.add(ObjectKind::Group, Transform::IDENTITY);
        let b = g.add(ObjectKind::Group, Transform::IDENTITY);
        let a1 = g
            .add_child(a, ObjectKind::Group, Transform::IDENTITY)
            .unwrap();
        let a2 = g
            .add_child(a, ObjectKind::Group, Transform::IDENTITY)
            .unwrap();
        let a1x = g
            .add_child(a1, ObjectKind::Group, Transform::IDENTITY)
            .unwrap();

        assert_eq!(g.pre_order(), vec![a, a1, a1x, a2, b]);
        assert_eq!(g.pre_order(), g.pre_order());
    }

    #[test]
    fn world_matrices_compose_down_the_tree() {
        let mut geos = GeometryLibrary::new();
        let mut mats = MaterialLibrary::new();
        let mut g = SceneGraph::new();
        let parent = g.add(
            ObjectKind::Group,
            Transform::from_position(Vec3::X * 10.0).with_uniform_scale(2.0),
        );
        let child = g
            .add_child(
                parent,
                mesh_kind(&mut geos, &mut mats),
                Transform::from_position(Vec3::Y),
            )
            .unwrap();

        let meshes = g.world_meshes();
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].id, child);
        let origin = meshes[0].world.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(10.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn remove_drops_subtree_and_never_reuses_ids() {
        let mut g = SceneGraph::new();
        let a = g.add(ObjectKind::Group, Transform::IDENTITY);
        let child = g
            .add_child(a, ObjectKind::Group, Transform::IDENTITY)
            .unwrap();
        let b = g.add(ObjectKind::Group, Transform::IDENTITY);
        assert_eq!(g.len(), 3);

        assert!(g.remove(a).is_some());
        assert_eq!(g.len(), 1);
        assert!(g.get(child).is_none());
        assert_eq!(g.pre_order(), vec![b]);
        assert!(g.remove(a).is_none());

        let c = g.add(ObjectKind::Group, Transform::IDENTITY);
        assert_ne!(c, a);
        assert_ne!(c, child);
    }

    #[test]
    fn add_child_to_missing_parent_fails() {
        let mut g = SceneGraph::new();
        let a = g.add(ObjectKind::Group, Transform::IDENTITY);
        let _ = g.remove(a);
        assert!(g
            .add_child(a, ObjectKind::Group, Transform::IDENTITY)
            .is_none());
        assert!(g.is_empty());
    }

    #[test]
    fn primary_light_points_from_target_to_light() {
        let mut g = SceneGraph::new();
        let _ = g.add(
            ObjectKind::DirectionalLight {
                color: [1.0, 1.0, 1.0],
                intensity: 0.5,
                target: Vec3::ZERO,
            },
            Transform::from_position(Vec3::new(0.0, 20.0, 0.0)),
        );
        let light = g.primary_light().unwrap();
        assert!((light.direction - Vec3::Y).length() < 1e-6);
        assert_eq!(light.radiance, [0.5, 0.5, 0.5]);
    }
}
