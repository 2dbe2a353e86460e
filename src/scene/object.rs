use glam::{Mat4, Quat, Vec3};

use super::material::MaterialId;
use crate::geometry::GeometryId;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Stable handle to an object in a [`SceneGraph`](super::SceneGraph).
///
/// Handles are arena indices and are never reused, so a handle that
/// outlives its object simply fails to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(super) u32);

impl ObjectId {
    /// Raw arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ---------------------------------------------------------------------------
// Layers
// ---------------------------------------------------------------------------

/// Per-object layer membership bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layers(u32);

impl Layers {
    /// Layer every object starts on.
    pub const DEFAULT: u32 = 0;
    /// Layer marking bloom-eligible objects.
    pub const BLOOM: u32 = 1;

    /// Membership in the default layer only.
    #[must_use]
    pub fn new() -> Self {
        Self(1 << Self::DEFAULT)
    }

    /// Bit for `layer`; empty for layers past 31.
    fn mask(layer: u32) -> u32 {
        1u32.checked_shl(layer).unwrap_or(0)
    }

    /// Whether `layer` is set. Always `false` for layers past 31.
    #[must_use]
    pub fn contains(self, layer: u32) -> bool {
        self.0 & Self::mask(layer) != 0
    }

    /// Set `layer`. No-op for layers past 31.
    pub fn enable(&mut self, layer: u32) {
        self.0 |= Self::mask(layer);
    }

    /// Clear `layer`. No-op for layers past 31.
    pub fn disable(&mut self, layer: u32) {
        self.0 &= !Self::mask(layer);
    }

    /// Flip `layer`. No-op for layers past 31.
    pub fn toggle(&mut self, layer: u32) {
        self.0 ^= Self::mask(layer);
    }

    /// Raw bitmask.
    #[must_use]
    pub fn bits(self) -> u32 {
        self.0
    }
}

impl Default for Layers {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// Local translation, rotation and scale relative to the parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation.
    pub position: Vec3,
    /// Rotation.
    pub rotation: Quat,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Pure translation.
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Builder-style uniform scale.
    #[must_use]
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Local-to-parent matrix.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            self.rotation,
            self.position,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ---------------------------------------------------------------------------
// SceneObject
// ---------------------------------------------------------------------------

/// What an object contributes to the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectKind {
    /// Renderable triangle mesh.
    Mesh {
        /// Shared geometry.
        geometry: GeometryId,
        /// Currently assigned material.
        material: MaterialId,
    },
    /// Directional light shining from the object's world position toward
    /// `target`.
    DirectionalLight {
        /// Linear RGB color.
        color: [f32; 3],
        /// Scalar multiplier on `color`.
        intensity: f32,
        /// World-space point the light aims at.
        target: Vec3,
    },
    /// Transform-only grouping node.
    Group,
}

/// A node in the scene graph.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub(super) id: ObjectId,
    /// Optional human-readable name.
    pub name: Option<String>,
    /// Local transform.
    pub transform: Transform,
    /// Node payload.
    pub kind: ObjectKind,
    /// Layer membership.
    pub layers: Layers,
    pub(super) parent: Option<ObjectId>,
    pub(super) children: Vec<ObjectId>,
}

impl SceneObject {
    /// Stable handle of this object.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Parent node, or `None` for a root-level object.
    #[must_use]
    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    /// Direct children in insertion order.
    #[must_use]
    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }

    /// Whether this node is a renderable mesh.
    #[must_use]
    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, ObjectKind::Mesh { .. })
    }

    /// Whether this object participates in the glow layer.
    #[must_use]
    pub fn is_bloom_eligible(&self) -> bool {
        self.layers.contains(Layers::BLOOM)
    }

    /// Set or clear bloom eligibility.
    pub fn set_bloom_eligible(&mut self, eligible: bool) {
        if eligible {
            self.layers.enable(Layers::BLOOM);
        } else {
            self.layers.disable(Layers::BLOOM);
        }
    }

    /// Flip bloom eligibility and return the new value.
    pub fn toggle_bloom(&mut self) -> bool {
        self.layers.toggle(Layers::BLOOM);
        self.is_bloom_eligible()
    }

    /// Assigned material, for meshes.
    #[must_use]
    pub fn material(&self) -> Option<MaterialId> {
        match self.kind {
            ObjectKind::Mesh { material, .. } => Some(material),
            _ => None,
        }
    }

    /// Reassign the material of a mesh, returning the previous one.
    /// Non-mesh objects are left untouched and yield `None`.
    pub fn replace_material(
        &mut self,
        new: MaterialId,
    ) -> Option<MaterialId> {
        match &mut self.kind {
            ObjectKind::Mesh { material, .. } => {
                Some(std::mem::replace(material, new))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_start_on_default_only() {
        let layers = Layers::new();
        assert!(layers.contains(Layers::DEFAULT));
        assert!(!layers.contains(Layers::BLOOM));
        assert_eq!(layers.bits(), 0b01);
    }

    #[test]
    fn toggle_flips_a_single_bit() {
        let mut layers = Layers::new();
        layers.toggle(Layers::BLOOM);
        assert_eq!(layers.bits(), 0b11);
        layers.toggle(Layers::BLOOM);
        assert_eq!(layers.bits(), 0b01);
    }

    #[test]
    fn out_of_range_layers_are_ignored() {
        let mut layers = Layers::new();
        for layer in [32, 40, u32::MAX] {
            assert!(!layers.contains(layer));
            layers.enable(layer);
            layers.toggle(layer);
            layers.disable(layer);
        }
        assert_eq!(layers.bits(), 0b01);
        layers.enable(31);
        assert!(layers.contains(31));
    }

    #[test]
    fn transform_matrix_applies_scale_then_translation() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0))
            .with_uniform_scale(2.0);
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(3.0, 2.0, 3.0)).length() < 1e-6);
    }
}
