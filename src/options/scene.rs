use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Procedural scene layout: one hub sphere plus randomly scattered
/// satellites sharing its geometry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Scene", inline)]
#[serde(default)]
pub struct SceneOptions {
    /// Number of satellites scattered around the hub.
    #[schemars(title = "Satellites", range(min = 0, max = 5000))]
    pub satellite_count: u32,
    /// Edge length of the cube satellites are scattered in, centered on
    /// the origin.
    #[schemars(title = "Spread", range(min = 10.0, max = 2000.0), extend("step" = 10.0))]
    pub spread: f32,
    /// Lower bound (inclusive) of the uniform satellite scale.
    #[schemars(skip)]
    pub min_scale: f32,
    /// Upper bound (exclusive) of the uniform satellite scale.
    #[schemars(skip)]
    pub max_scale: f32,
    /// Radius of the shared icosphere geometry.
    #[schemars(skip)]
    pub radius: f32,
    /// Icosphere subdivision level (0 = plain icosahedron).
    #[schemars(title = "Detail", range(min = 0, max = 64))]
    pub detail: u32,
    /// Fixed RNG seed. A fresh seed is drawn (and logged) when unset.
    #[schemars(skip)]
    pub seed: Option<u64>,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            satellite_count: 500,
            spread: 1000.0,
            min_scale: 1.0,
            max_scale: 4.0,
            radius: 4.0,
            detail: 30,
            seed: None,
        }
    }
}
