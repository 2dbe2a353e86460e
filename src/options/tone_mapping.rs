use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output stage: filmic tone mapping and display encoding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Tone Mapping", inline)]
#[serde(default)]
pub struct ToneMappingOptions {
    /// Exposure multiplier applied before the ACES filmic curve.
    #[schemars(title = "Exposure", range(min = 0.1, max = 4.0), extend("step" = 0.05))]
    pub exposure: f32,
}

impl Default for ToneMappingOptions {
    fn default() -> Self {
        Self { exposure: 1.5 }
    }
}
