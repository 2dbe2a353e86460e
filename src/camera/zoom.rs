//! Zoom-only trackball control: scroll moves the eye along the line to the
//! target, with the remaining zoom easing out over the following frames.

use glam::Vec3;

use super::core::Camera;
use crate::options::ControlOptions;

/// Trackball units per scroll line.
const LINE_SCALE: f32 = 0.01;

/// Dolly-style zoom towards a shared target.
#[derive(Debug, Clone)]
pub struct ZoomControls {
    /// Point zoomed towards. Kept in sync with the orbit target.
    pub target: Vec3,
    /// Zoom sensitivity multiplier.
    pub zoom_speed: f32,
    /// Fraction of pending zoom consumed per update.
    pub dynamic_damping_factor: f32,
    /// Closest allowed eye distance.
    pub min_distance: f32,
    /// Farthest allowed eye distance.
    pub max_distance: f32,
    zoom_start: f32,
    zoom_end: f32,
}

impl ZoomControls {
    /// Controls zooming towards `target` with tuning from `options`.
    #[must_use]
    pub fn new(target: Vec3, options: &ControlOptions) -> Self {
        let mut controls = Self {
            target,
            zoom_speed: 1.0,
            dynamic_damping_factor: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            zoom_start: 0.0,
            zoom_end: 0.0,
        };
        controls.apply_options(options);
        controls
    }

    /// Retune speed and damping. Pending zoom is kept.
    pub fn apply_options(&mut self, options: &ControlOptions) {
        self.zoom_speed = options.zoom_speed;
        self.dynamic_damping_factor =
            options.zoom_damping_factor.clamp(0.0, 1.0);
    }

    /// Queue a zoom of `lines` scroll lines; positive zooms in.
    pub fn scroll(&mut self, lines: f32) {
        self.zoom_start += lines * LINE_SCALE;
    }

    /// Whether zoom is still pending.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        (self.zoom_end - self.zoom_start).abs() > 1e-6
    }

    /// Apply pending zoom to `camera`. Returns whether the eye moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let offset = camera.eye - self.target;
        let factor = 1.0 + (self.zoom_end - self.zoom_start) * self.zoom_speed;
        let mut moved = false;

        if factor != 1.0 && factor > 0.0 {
            let scaled = offset * factor;
            let distance = scaled
                .length()
                .clamp(self.min_distance, self.max_distance);
            let new_offset = scaled.normalize_or_zero() * distance;
            if new_offset != Vec3::ZERO {
                camera.eye = self.target + new_offset;
                moved = true;
            }
        }
        camera.target = self.target;
        self.zoom_start += (self.zoom_end - self.zoom_start)
            * self.dynamic_damping_factor;
        moved
    }
}
