//! CPU ray casting against scene meshes.
//!
//! Each mesh is tested in its own object space: the ray is pulled back
//! through the inverse world matrix, rejected early against the mesh's
//! bounding sphere, then tested triangle by triangle. Only front faces
//! (counter-clockwise as seen by the ray) can be hit.

use glam::{Mat4, Vec3};

use super::ray::Ray;
use crate::geometry::{GeometryLibrary, MeshData};
use crate::scene::{ObjectId, SceneGraph};

const EPS: f32 = 1e-7;

/// Barycentric slack, relative to the determinant, so a ray through an
/// edge shared by two triangles is caught by at least one of them.
const EDGE_EPS: f32 = 1e-5;

/// A ray hitting a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// The mesh that was hit.
    pub object: ObjectId,
    /// World-space distance from the ray origin.
    pub distance: f32,
    /// World-space hit point.
    pub point: Vec3,
}

/// Ray parameter of the nearest front-facing triangle hit, if any.
/// Möller–Trumbore with back-face culling and a small edge tolerance.
fn intersect_triangle(
    origin: Vec3,
    dir: Vec3,
    [a, b, c]: [Vec3; 3],
) -> Option<f32> {
    let e1 = b - a;
    let e2 = c - a;
    let p = dir.cross(e2);
    let det = e1.dot(p);
    if det < EPS {
        return None;
    }
    let tol = EDGE_EPS * det;
    let s = origin - a;
    let u = s.dot(p);
    if u < -tol || u > det + tol {
        return None;
    }
    let q = s.cross(e1);
    let v = dir.dot(q);
    if v < -tol || u + v > det + tol {
        return None;
    }
    let t = e2.dot(q) / det;
    (t > EPS).then_some(t)
}

/// Whether the ray can reach the origin-centered sphere of `radius`.
fn reaches_sphere(origin: Vec3, dir: Vec3, radius: f32) -> bool {
    let a = dir.length_squared();
    if a <= EPS {
        return false;
    }
    let b = origin.dot(dir);
    let c = origin.length_squared() - radius * radius;
    if c <= 0.0 {
        return true;
    }
    // Outside: needs to be heading towards the center and close enough.
    b < 0.0 && b * b - a * c >= 0.0
}

/// Nearest hit of `ray` against one mesh placed by `world`.
#[must_use]
pub fn intersect_mesh(
    ray: &Ray,
    mesh: &MeshData,
    world: Mat4,
) -> Option<(f32, Vec3)> {
    let inverse = world.inverse();
    if !inverse.is_finite() {
        return None;
    }
    let origin = inverse.transform_point3(ray.origin);
    let dir = inverse.transform_vector3(ray.direction);
    if !reaches_sphere(origin, dir, mesh.bounding_radius) {
        return None;
    }

    let t = mesh
        .triangles()
        .filter_map(|tri| intersect_triangle(origin, dir, tri))
        .min_by(f32::total_cmp)?;
    let point = world.transform_point3(origin + dir * t);
    Some((point.distance(ray.origin), point))
}

/// Every mesh hit by `ray`, nearest first. Meshes at exactly the same
/// distance keep their pre-order traversal order.
#[must_use]
pub fn intersect_scene(
    ray: &Ray,
    scene: &SceneGraph,
    geometries: &GeometryLibrary,
) -> Vec<Hit> {
    let mut hits: Vec<Hit> = scene
        .world_meshes()
        .into_iter()
        .filter_map(|m| {
            let mesh = geometries.get(m.geometry)?;
            let (distance, point) = intersect_mesh(ray, mesh, m.world)?;
            Some(Hit {
                object: m.id,
                distance,
                point,
            })
        })
        .collect();
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::icosphere;
    use crate::scene::{Material, MaterialLibrary, ObjectKind, Transform};

    fn unit_triangle() -> [Vec3; 3] {
        [
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn front_face_is_hit() {
        let t = intersect_triangle(Vec3::Z * 5.0, -Vec3::Z, unit_triangle());
        assert!((t.unwrap() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn back_face_is_culled() {
        let t = intersect_triangle(-Vec3::Z * 5.0, Vec3::Z, unit_triangle());
        assert!(t.is_none());
    }

    #[test]
    fn miss_outside_edges() {
        let t = intersect_triangle(
            Vec3::new(3.0, 0.0, 5.0),
            -Vec3::Z,
            unit_triangle(),
        );
        assert!(t.is_none());
    }

    #[test]
    fn sphere_broad_phase() {
        assert!(reaches_sphere(Vec3::Z * 10.0, -Vec3::Z, 1.0));
        assert!(!reaches_sphere(Vec3::Z * 10.0, Vec3::Z, 1.0));
        assert!(!reaches_sphere(Vec3::new(2.0, 0.0, 10.0), -Vec3::Z, 1.0));
        assert!(reaches_sphere(Vec3::ZERO, Vec3::X, 1.0));
    }

    fn scene_with(
        placements: &[Transform],
    ) -> (SceneGraph, GeometryLibrary, Vec<ObjectId>) {
        let mut geos = GeometryLibrary::new();
        let mut mats = MaterialLibrary::new();
        let geometry = geos.add(icosphere(1.0, 2));
        let material = mats.add(Material::BLACK);
        let mut scene = SceneGraph::new();
        let ids = placements
            .iter()
            .map(|&t| scene.add(ObjectKind::Mesh { geometry, material }, t))
            .collect();
        (scene, geos, ids)
    }

    fn axis_ray() -> Ray {
        Ray::new(Vec3::ZERO, -Vec3::Z)
    }

    #[test]
    fn shared_edge_is_hit() {
        // Two triangles meeting along the Y axis.
        let left = [
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let right = [
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let origin = Vec3::new(0.0, 0.3, 5.0);
        let hits = [left, right]
            .into_iter()
            .filter_map(|tri| intersect_triangle(origin, -Vec3::Z, tri))
            .count();
        assert!(hits >= 1);
    }

    #[test]
    fn ray_through_sphere_center_hits_from_default_eye() {
        let mesh = icosphere(4.0, 4);
        let eye = Vec3::new(0.0, 10.0, 18.0);
        let ray = Ray::new(eye, -eye);
        let (distance, point) =
            intersect_mesh(&ray, &mesh, Mat4::IDENTITY).unwrap();
        assert!((distance - (eye.length() - 4.0)).abs() < 0.1);
        assert!((point.length() - 4.0).abs() < 0.1);
    }

    #[test]
    fn hits_are_sorted_nearest_first() {
        let (scene, geos, ids) = scene_with(&[
            Transform::from_position(Vec3::new(0.0, 0.0, -20.0)),
            Transform::from_position(Vec3::new(0.0, 0.0, -5.0)),
            Transform::from_position(Vec3::new(0.0, 0.0, -10.0)),
            Transform::from_position(Vec3::new(50.0, 0.0, -10.0)),
        ]);
        let hits = intersect_scene(&axis_ray(), &scene, &geos);
        let order: Vec<_> = hits.iter().map(|h| h.object).collect();
        assert_eq!(order, vec![ids[1], ids[2], ids[0]]);
        assert!(hits[0].distance < hits[1].distance);
        // Hub of radius ~1 at z=-5: front surface at z≈-4.
        assert!((hits[0].distance - 4.0).abs() < 0.1);
    }

    #[test]
    fn scale_is_respected_in_world_distance() {
        let (scene, geos, _) = scene_with(&[Transform::from_position(
            Vec3::new(0.0, 0.0, -10.0),
        )
        .with_uniform_scale(3.0)]);
        let hits = intersect_scene(&axis_ray(), &scene, &geos);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].distance - 7.0).abs() < 0.2);
        assert!((hits[0].point.z + 7.0).abs() < 0.2);
    }

    #[test]
    fn equal_distances_keep_traversal_order() {
        let place = Transform::from_position(Vec3::new(0.0, 0.0, -10.0));
        let (scene, geos, ids) = scene_with(&[place, place, place]);
        let hits = intersect_scene(&axis_ray(), &scene, &geos);
        let order: Vec<_> = hits.iter().map(|h| h.object).collect();
        assert_eq!(order, ids);
    }

    #[test]
    fn ray_from_inside_sees_only_back_faces() {
        let (scene, geos, _) = scene_with(&[Transform::IDENTITY]);
        let hits =
            intersect_scene(&Ray::new(Vec3::ZERO, Vec3::X), &scene, &geos);
        assert!(hits.is_empty());
    }
}
