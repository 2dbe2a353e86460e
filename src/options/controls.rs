use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Orbit (rotate) and zoom control tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Controls", inline)]
#[serde(default)]
pub struct ControlOptions {
    /// Smooth orbit motion with exponential damping.
    #[schemars(title = "Damping")]
    pub enable_damping: bool,
    /// Fraction of the remaining orbit motion applied per frame.
    #[schemars(title = "Damping Factor", range(min = 0.01, max = 1.0), extend("step" = 0.01))]
    pub damping_factor: f32,
    /// Orbit rotation sensitivity multiplier.
    #[schemars(title = "Rotate Speed", range(min = 0.1, max = 3.0), extend("step" = 0.05))]
    pub rotate_speed: f32,
    /// Zoom sensitivity multiplier.
    #[schemars(title = "Zoom Speed", range(min = 0.1, max = 5.0), extend("step" = 0.1))]
    pub zoom_speed: f32,
    /// Fraction of pending zoom applied per frame.
    #[schemars(skip)]
    pub zoom_damping_factor: f32,
    /// Pointer travel (physical pixels) beyond which a press/release pair
    /// counts as an orbit drag instead of a click.
    #[schemars(skip)]
    pub click_drag_threshold: f32,
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.12,
            rotate_speed: 1.0,
            zoom_speed: 1.5,
            zoom_damping_factor: 0.2,
            click_drag_threshold: 4.0,
        }
    }
}
