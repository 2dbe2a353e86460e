//! Procedural scene construction: a hub sphere at the origin, randomly
//! scattered satellites sharing its geometry, and one directional light.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    srgb_hex_to_linear, Material, MaterialLibrary, ObjectId, ObjectKind,
    SceneGraph, Transform,
};
use crate::geometry::{icosphere, GeometryId, GeometryLibrary};
use crate::options::{LightingOptions, SceneOptions};

/// Handles to everything [`populate`] created.
#[derive(Debug, Clone)]
pub struct PopulatedScene {
    /// The origin-centered hub mesh.
    pub hub: ObjectId,
    /// Satellites in creation order.
    pub satellites: Vec<ObjectId>,
    /// The directional light.
    pub light: ObjectId,
    /// Icosphere shared by hub and satellites.
    pub geometry: GeometryId,
    /// Seed the scene was generated from.
    pub seed: u64,
}

impl PopulatedScene {
    /// Move and recolor the light to match `lighting`. Material tuning
    /// only applies when a scene is populated.
    pub fn apply_lighting(
        &self,
        scene: &mut SceneGraph,
        lighting: &LightingOptions,
    ) {
        let Some(light) = scene.get_mut(self.light) else {
            log::warn!("light {:?} missing from scene", self.light);
            return;
        };
        if let ObjectKind::DirectionalLight {
            color, intensity, ..
        } = &mut light.kind
        {
            *color = lighting.color;
            *intensity = lighting.intensity;
        }
        light.transform.position = Vec3::from(lighting.position);
    }
}

/// Uniform sample in `[lo, hi)`, collapsing to `lo` for empty ranges.
fn uniform(rng: &mut impl Rng, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        lo + rng.random::<f32>() * (hi - lo)
    } else {
        lo
    }
}

fn random_phong(
    rng: &mut impl Rng,
    lighting: &LightingOptions,
) -> Material {
    Material::Phong {
        color: srgb_hex_to_linear(rng.random_range(0..0x00FF_FFFF)),
        specular: lighting.specular,
        shininess: lighting.shininess,
    }
}

/// Fill `scene` with the hub, the satellites and the light.
///
/// Uses `options.seed` when set; otherwise draws a fresh seed and logs it
/// so an interesting layout can be reproduced.
pub fn populate(
    scene: &mut SceneGraph,
    materials: &mut MaterialLibrary,
    geometries: &mut GeometryLibrary,
    options: &SceneOptions,
    lighting: &LightingOptions,
) -> PopulatedScene {
    let seed = options.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);

    let geometry = geometries.add(icosphere(options.radius, options.detail));

    let light = scene.add(
        ObjectKind::DirectionalLight {
            color: lighting.color,
            intensity: lighting.intensity,
            target: Vec3::ZERO,
        },
        Transform::from_position(Vec3::from(lighting.position)),
    );

    let hub_material = materials.add(random_phong(&mut rng, lighting));
    let hub = scene.add(
        ObjectKind::Mesh {
            geometry,
            material: hub_material,
        },
        Transform::IDENTITY,
    );
    if let Some(obj) = scene.get_mut(hub) {
        obj.name = Some("hub".to_owned());
    }

    let half = options.spread * 0.5;
    let satellites = (0..options.satellite_count)
        .map(|_| {
            let material = materials.add(random_phong(&mut rng, lighting));
            let position = Vec3::new(
                uniform(&mut rng, -half, half),
                uniform(&mut rng, -half, half),
                uniform(&mut rng, -half, half),
            );
            let scale =
                uniform(&mut rng, options.min_scale, options.max_scale);
            scene.add(
                ObjectKind::Mesh { geometry, material },
                Transform::from_position(position).with_uniform_scale(scale),
            )
        })
        .collect::<Vec<_>>();

    log::info!(
        "populated scene: hub + {} satellites (seed {seed})",
        satellites.len()
    );

    PopulatedScene {
        hub,
        satellites,
        light,
        geometry,
        seed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_options(seed: u64) -> SceneOptions {
        SceneOptions {
            satellite_count: 25,
            detail: 1,
            seed: Some(seed),
            ..SceneOptions::default()
        }
    }

    fn build(
        opts: &SceneOptions,
    ) -> (SceneGraph, MaterialLibrary, PopulatedScene) {
        let mut scene = SceneGraph::new();
        let mut mats = MaterialLibrary::new();
        let mut geos = GeometryLibrary::new();
        let populated = populate(
            &mut scene,
            &mut mats,
            &mut geos,
            opts,
            &LightingOptions::default(),
        );
        (scene, mats, populated)
    }

    #[test]
    fn creates_hub_satellites_and_light() {
        let (scene, _, p) = build(&small_options(1));
        assert_eq!(p.satellites.len(), 25);
        assert_eq!(scene.len(), 27);
        assert_eq!(scene.world_meshes().len(), 26);

        let hub = scene.get(p.hub).unwrap();
        assert_eq!(hub.transform, Transform::IDENTITY);
        assert!(!hub.is_bloom_eligible());
        assert!(scene.primary_light().is_some());
    }

    #[test]
    fn satellites_respect_spread_and_scale_bounds() {
        let opts = small_options(9);
        let (scene, _, p) = build(&opts);
        for id in p.satellites {
            let t = scene.get(id).unwrap().transform;
            assert!(t.position.abs().max_element() <= opts.spread * 0.5);
            assert!(t.scale.x >= opts.min_scale && t.scale.x < opts.max_scale);
            assert_eq!(t.scale.x, t.scale.y);
            assert_eq!(t.scale.y, t.scale.z);
        }
    }

    #[test]
    fn same_seed_reproduces_layout_and_colors() {
        let (a, ma, pa) = build(&small_options(77));
        let (b, mb, pb) = build(&small_options(77));
        assert_eq!(pa.seed, pb.seed);
        for (x, y) in a.world_meshes().iter().zip(b.world_meshes().iter()) {
            assert_eq!(x.world, y.world);
            assert_eq!(ma.get(x.material), mb.get(y.material));
        }
    }

    #[test]
    fn every_mesh_gets_its_own_lit_material() {
        let (scene, mats, _) = build(&small_options(3));
        let meshes = scene.world_meshes();
        let mut ids: Vec<_> = meshes.iter().map(|m| m.material).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), meshes.len());
        for m in meshes {
            let material = mats.get(m.material);
            assert!(matches!(material, Some(Material::Phong { .. })));
        }
    }

    #[test]
    fn lighting_changes_reach_the_light() {
        let (mut scene, _, p) = build(&small_options(5));
        let lighting = LightingOptions {
            intensity: 2.5,
            color: [1.0, 0.5, 0.25],
            position: [3.0, 4.0, 5.0],
            ..LightingOptions::default()
        };
        p.apply_lighting(&mut scene, &lighting);

        let light = scene.get(p.light).unwrap();
        assert_eq!(light.transform.position, Vec3::new(3.0, 4.0, 5.0));
        assert_eq!(
            light.kind,
            ObjectKind::DirectionalLight {
                color: [1.0, 0.5, 0.25],
                intensity: 2.5,
                target: Vec3::ZERO,
            }
        );
    }
}
