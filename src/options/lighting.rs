use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Lighting", inline)]
#[serde(default)]
/// Scene light and default Phong material parameters.
pub struct LightingOptions {
    /// Directional light intensity.
    #[schemars(title = "Key Light", range(min = 0.0, max = 3.5), extend("step" = 0.05))]
    pub intensity: f32,
    /// Directional light position; the light aims at the origin.
    #[schemars(skip)]
    pub position: [f32; 3],
    /// Linear RGB light color.
    #[schemars(skip)]
    pub color: [f32; 3],
    /// Uniform ambient term added to lit materials.
    #[schemars(title = "Ambient", range(min = 0.0, max = 0.7), extend("step" = 0.01))]
    pub ambient: f32,
    /// Specular strength of generated Phong materials.
    #[schemars(skip)]
    pub specular: f32,
    /// Specular exponent of generated Phong materials.
    #[schemars(skip)]
    pub shininess: f32,
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            position: [0.0, 20.0, 0.0],
            color: [1.0, 1.0, 1.0],
            ambient: 0.0,
            specular: 0.067,
            shininess: 30.0,
        }
    }
}
