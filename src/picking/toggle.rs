use glam::Vec2;

use super::ray::{Ray, ViewportRect};
use super::raycaster::{intersect_scene, Hit};
use crate::camera::Camera;
use crate::geometry::GeometryLibrary;
use crate::scene::{ObjectId, SceneGraph};

/// Outcome of a successful click-to-toggle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Toggled {
    /// The object whose bloom eligibility flipped.
    pub object: ObjectId,
    /// Its eligibility after the flip.
    pub eligible: bool,
    /// Camera distance of the hit.
    pub distance: f32,
}

/// Front-most mesh under `pointer`, or `None` if the pointer ray misses
/// everything.
#[must_use]
pub fn pick(
    camera: &Camera,
    scene: &SceneGraph,
    geometries: &GeometryLibrary,
    viewport: ViewportRect,
    pointer: Vec2,
) -> Option<Hit> {
    let ndc = viewport.to_ndc(pointer)?;
    let ray = Ray::from_camera(camera, ndc);
    intersect_scene(&ray, scene, geometries).into_iter().next()
}

/// Flip the bloom eligibility of the front-most mesh under `pointer`.
/// Leaves the scene untouched when nothing is hit.
pub fn toggle_bloom_at(
    camera: &Camera,
    scene: &mut SceneGraph,
    geometries: &GeometryLibrary,
    viewport: ViewportRect,
    pointer: Vec2,
) -> Option<Toggled> {
    let hit = pick(camera, scene, geometries, viewport, pointer)?;
    let eligible = scene.get_mut(hit.object)?.toggle_bloom();
    log::debug!(
        "toggled bloom on {:?} -> {eligible} (distance {:.2})",
        hit.object,
        hit.distance
    );
    Some(Toggled {
        object: hit.object,
        eligible,
        distance: hit.distance,
    })
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::geometry::icosphere;
    use crate::options::CameraOptions;
    use crate::scene::{Material, MaterialLibrary, ObjectKind, Transform};

    struct World {
        camera: Camera,
        scene: SceneGraph,
        geos: GeometryLibrary,
        hub: ObjectId,
        behind: ObjectId,
        side: ObjectId,
    }

    fn world() -> World {
        let camera = Camera::from_options(&CameraOptions::default(), 1.0);
        let mut geos = GeometryLibrary::new();
        let mut mats = MaterialLibrary::new();
        let geometry = geos.add(icosphere(4.0, 3));
        let material = mats.add(Material::BLACK);
        let mut scene = SceneGraph::new();
        let mesh = ObjectKind::Mesh { geometry, material };
        // Directly behind the hub along the view line.
        let behind_pos = camera.target + (camera.target - camera.eye) * 2.0;
        let behind = scene.add(mesh, Transform::from_position(behind_pos));
        let hub = scene.add(mesh, Transform::IDENTITY);
        let side = scene.add(
            mesh,
            Transform::from_position(Vec3::new(200.0, 0.0, 0.0)),
        );
        World {
            camera,
            scene,
            geos,
            hub,
            behind,
            side,
        }
    }

    fn flags(scene: &SceneGraph) -> Vec<bool> {
        scene
            .pre_order()
            .into_iter()
            .map(|id| scene.get(id).unwrap().is_bloom_eligible())
            .collect()
    }

    const VIEWPORT: ViewportRect = ViewportRect {
        left: 20.0,
        top: 10.0,
        width: 600.0,
        height: 600.0,
    };

    /// Center of the viewport: the ray runs straight down the view axis.
    const CENTER: Vec2 = Vec2::new(320.0, 310.0);

    #[test]
    fn click_on_hub_toggles_only_the_nearest() {
        let mut w = world();
        let toggled = toggle_bloom_at(
            &w.camera,
            &mut w.scene,
            &w.geos,
            VIEWPORT,
            CENTER,
        )
        .unwrap();
        assert_eq!(toggled.object, w.hub);
        assert!(toggled.eligible);
        assert!(w.scene.get(w.hub).unwrap().is_bloom_eligible());
        assert!(!w.scene.get(w.behind).unwrap().is_bloom_eligible());
        assert!(!w.scene.get(w.side).unwrap().is_bloom_eligible());
    }

    #[test]
    fn second_click_negates_again() {
        let mut w = world();
        for expected in [true, false, true] {
            let t = toggle_bloom_at(
                &w.camera,
                &mut w.scene,
                &w.geos,
                VIEWPORT,
                CENTER,
            )
            .unwrap();
            assert_eq!(t.eligible, expected);
        }
    }

    #[test]
    fn click_on_empty_background_changes_nothing() {
        let mut w = world();
        let before = flags(&w.scene);
        let corner = Vec2::new(VIEWPORT.left + 2.0, VIEWPORT.top + 2.0);
        assert!(toggle_bloom_at(
            &w.camera,
            &mut w.scene,
            &w.geos,
            VIEWPORT,
            corner,
        )
        .is_none());
        assert_eq!(flags(&w.scene), before);
    }

    #[test]
    fn viewport_offset_is_honored() {
        let w = world();
        // Same client point, but the surface starts far to the right: the
        // pointer is now at the surface's left edge, away from the hub.
        let shifted = ViewportRect {
            left: CENTER.x,
            ..VIEWPORT
        };
        assert!(pick(&w.camera, &w.scene, &w.geos, shifted, CENTER).is_none());
        assert!(pick(&w.camera, &w.scene, &w.geos, VIEWPORT, CENTER).is_some());
    }
}
