use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Selective bloom parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Bloom", inline)]
#[serde(default)]
pub struct BloomOptions {
    /// Luminance below which pixels do not contribute to the glow.
    #[schemars(title = "Threshold", range(min = 0.0, max = 2.0), extend("step" = 0.05))]
    pub threshold: f32,
    /// Width of the smooth ramp above the threshold.
    #[schemars(skip)]
    pub smooth_width: f32,
    /// Overall glow multiplier.
    #[schemars(title = "Strength", range(min = 0.0, max = 3.0), extend("step" = 0.05))]
    pub strength: f32,
    /// Blend between tight (0) and wide (1) glow.
    #[schemars(title = "Radius", range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub radius: f32,
}

impl Default for BloomOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            smooth_width: 0.01,
            strength: 1.0,
            radius: 0.5,
        }
    }
}
